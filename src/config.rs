use serde::{Deserialize, Serialize};

use crate::error::{MatrixArrayError, Result};

/// Numeric settings for the batched linear-algebra routines.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LinalgConfig {
    /// Relative pivot threshold for LU inversion. When positive, a pivot whose
    /// magnitude is at most `pivot_tolerance * max|a_ij|` of its slice marks the
    /// slice singular. At `0.0` only zero or non-finite pivots do.
    pub pivot_tolerance: f64,
}

impl LinalgConfig {
    pub fn new(pivot_tolerance: f64) -> Result<Self> {
        let config = Self { pivot_tolerance };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pivot_tolerance.is_finite() || self.pivot_tolerance < 0.0 {
            return Err(MatrixArrayError::InvalidConfig(format!(
                "pivot_tolerance must be finite and non-negative, got {}",
                self.pivot_tolerance
            )));
        }
        Ok(())
    }
}

impl Default for LinalgConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: 0.0,
        }
    }
}
