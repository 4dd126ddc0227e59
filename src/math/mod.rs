//! Batched square-matrix container and the kernels behind it.
//!
//! `MatrixArray` is the public container; `Operand` is the right-hand side
//! accepted by its elementwise arithmetic.
mod linalg;
pub mod matrix_array;
pub mod operand;

pub use matrix_array::{Columns, MatrixArray};
pub use operand::Operand;
