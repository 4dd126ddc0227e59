use std::error::Error;
use std::fmt;

use crate::space::Space;

/// Failures surfaced by `MatrixArray` construction and arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixArrayError {
    /// Binary operation between arrays tagged with different spaces.
    SpaceMismatch { left: Space, right: Space },
    /// Operand or buffer shape disagrees with the `(length, rank, rank)` layout.
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    /// Slice `index` of the batch could not be inverted.
    SingularMatrix { index: usize },
    /// Column key outside `[0, rank)`.
    IndexOutOfBounds { row: usize, col: usize, rank: usize },
    /// Matrices must have at least one row.
    InvalidRank,
    InvalidConfig(String),
}

impl fmt::Display for MatrixArrayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatrixArrayError::SpaceMismatch { left, right } => write!(
                f,
                "Attempting MatrixArray math in non-matching spaces ({} vs {})",
                left, right
            ),
            MatrixArrayError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            MatrixArrayError::SingularMatrix { index } => {
                write!(f, "matrix {} of the array is singular", index)
            }
            MatrixArrayError::IndexOutOfBounds { row, col, rank } => write!(
                f,
                "column ({}, {}) out of bounds for rank {}",
                row, col, rank
            ),
            MatrixArrayError::InvalidRank => write!(f, "rank must be positive"),
            MatrixArrayError::InvalidConfig(reason) => {
                write!(f, "invalid linalg config: {}", reason)
            }
        }
    }
}

impl Error for MatrixArrayError {}

pub type Result<T> = std::result::Result<T, MatrixArrayError>;
