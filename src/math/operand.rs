use ndarray::{ArrayBase, ArrayView, ArrayViewD, Data, Dimension};

use crate::math::matrix_array::MatrixArray;

/// Right-hand side of an elementwise `MatrixArray` operation.
///
/// Only the `Matrices` variant is subject to the space check; plain numbers
/// carry no space and are broadcast over the whole `(length, rank, rank)` buffer.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Matrices(&'a MatrixArray),
    Scalar(f64),
    /// Any array broadcastable to `(length, rank, rank)`.
    Array(ArrayViewD<'a, f64>),
}

impl<'a> From<&'a MatrixArray> for Operand<'a> {
    fn from(value: &'a MatrixArray) -> Self {
        Operand::Matrices(value)
    }
}

impl From<f64> for Operand<'static> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl<'a, S, D> From<&'a ArrayBase<S, D>> for Operand<'a>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    fn from(value: &'a ArrayBase<S, D>) -> Self {
        Operand::Array(value.view().into_dyn())
    }
}

impl<'a, D: Dimension> From<ArrayView<'a, f64, D>> for Operand<'a> {
    fn from(value: ArrayView<'a, f64, D>) -> Self {
        Operand::Array(value.into_dyn())
    }
}
