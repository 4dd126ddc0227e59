use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coordinate space a `MatrixArray` lives in.
///
/// Only used as a compatibility token: arrays from different spaces may not
/// be combined. Transforming between spaces is done elsewhere.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    #[default]
    Real,
    Fourier,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Space::Real => write!(f, "Real"),
            Space::Fourier => write!(f, "Fourier"),
        }
    }
}

impl FromStr for Space {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "real" => Ok(Space::Real),
            "fourier" => Ok(Space::Fourier),
            _ => Err(format!(
                "Unknown space: {}. Expected one of `real` or `fourier`",
                s
            )),
        }
    }
}
