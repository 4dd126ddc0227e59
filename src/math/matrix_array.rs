//! Ordered stack of same-shaped square matrices.
//!
//! The buffer is a 3-D array of shape `(length, rank, rank)`: the first axis
//! selects a matrix, the last two are its row and column. The set of values
//! at one `(row, col)` position across every matrix is called a *column*:
//!
//! ```text
//! column_11 = data[:, 1, 1]
//! column_12 = data[:, 1, 2]
//! ```
//!
//! Every array carries a [`Space`] tag. Arithmetic between two arrays is only
//! allowed when their tags match.
use std::fmt;
use std::iter::FusedIterator;

use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2, ArrayViewMut3, Axis, Zip};

use crate::config::LinalgConfig;
use crate::error::{MatrixArrayError, Result};
use crate::math::linalg;
use crate::math::operand::Operand;
use crate::space::Space;
use crate::utils::logging::trace_matrix_array;

#[derive(Clone, Debug, PartialEq)]
pub struct MatrixArray {
    data: Array3<f64>,
    space: Space,
}

impl MatrixArray {
    /// Zero-filled array of `length` matrices of size `rank x rank` in real space.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is zero.
    pub fn new(length: usize, rank: usize) -> Self {
        Self::with_space(length, rank, Space::Real)
    }

    /// Zero-filled array tagged with `space`.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is zero.
    pub fn with_space(length: usize, rank: usize, space: Space) -> Self {
        assert!(rank > 0, "MatrixArray rank must be positive");
        Self {
            data: Array3::zeros((length, rank, rank)),
            space,
        }
    }

    /// Every matrix set to the `rank x rank` identity.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is zero.
    pub fn identity(length: usize, rank: usize, space: Space) -> Self {
        let mut array = Self::with_space(length, rank, space);
        for mut matrix in array.data.outer_iter_mut() {
            matrix.diag_mut().fill(1.0);
        }
        array
    }

    /// Adopt an owned `(length, rank, rank)` buffer.
    pub fn from_data(data: Array3<f64>, space: Space) -> Result<Self> {
        let (length, rows, cols) = data.dim();
        if rows != cols {
            return Err(MatrixArrayError::ShapeMismatch {
                expected: vec![length, rows, rows],
                got: data.shape().to_vec(),
            });
        }
        if rows == 0 {
            return Err(MatrixArrayError::InvalidRank);
        }
        Ok(Self { data, space })
    }

    /// Build from a row-major flat buffer of `length * rank * rank` values.
    pub fn from_shape_vec(
        length: usize,
        rank: usize,
        values: Vec<f64>,
        space: Space,
    ) -> Result<Self> {
        if rank == 0 {
            return Err(MatrixArrayError::InvalidRank);
        }
        let len = values.len();
        let data = Array3::from_shape_vec((length, rank, rank), values).map_err(|_| {
            MatrixArrayError::ShapeMismatch {
                expected: vec![length, rank, rank],
                got: vec![len],
            }
        })?;
        Ok(Self { data, space })
    }

    /// Number of matrices in the array.
    pub fn length(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Number of rows (and columns) of each matrix.
    pub fn rank(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Mutable access to the raw buffer. The view cannot change the shape, and
    /// writes through it bypass the symmetric mirroring of [`set_column`](Self::set_column).
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, f64> {
        self.data.view_mut()
    }

    pub fn into_data(self) -> Array3<f64> {
        self.data
    }

    /// The `index`-th matrix of the array.
    pub fn matrix(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        if index < self.length() {
            Some(self.data.index_axis(Axis(0), index))
        } else {
            None
        }
    }

    /// True when every matrix satisfies `|a_ij - a_ji| <= tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let rank = self.rank();
        self.data.outer_iter().all(|matrix| {
            (0..rank).all(|i| {
                ((i + 1)..rank).all(|j| (matrix[[i, j]] - matrix[[j, i]]).abs() <= tol)
            })
        })
    }

    fn check_key(&self, row: usize, col: usize) -> Result<()> {
        let rank = self.rank();
        if row >= rank || col >= rank {
            return Err(MatrixArrayError::IndexOutOfBounds { row, col, rank });
        }
        Ok(())
    }

    /// Read-only view of `data[:, row, col]`.
    ///
    /// The view borrows the array; to write a column back use
    /// [`set_column`](Self::set_column) so symmetry is preserved.
    pub fn column(&self, row: usize, col: usize) -> Result<ArrayView1<'_, f64>> {
        self.check_key(row, col)?;
        Ok(self.data.slice(s![.., row, col]))
    }

    /// Write `values` into `data[:, row, col]` and mirror it into
    /// `data[:, col, row]`, keeping every matrix symmetric.
    ///
    /// `values` must hold `length` entries, or a single entry that is
    /// broadcast to every matrix.
    pub fn set_column<'v, V>(&mut self, row: usize, col: usize, values: V) -> Result<()>
    where
        V: Into<ArrayView1<'v, f64>>,
    {
        self.check_key(row, col)?;
        let values = values.into();
        let length = self.length();
        let values = values
            .broadcast(length)
            .ok_or_else(|| MatrixArrayError::ShapeMismatch {
                expected: vec![length],
                got: values.shape().to_vec(),
            })?;

        self.data.slice_mut(s![.., row, col]).assign(&values);
        if row != col {
            self.data.slice_mut(s![.., col, row]).assign(&values);
        }
        Ok(())
    }

    /// Set `data[:, row, col]` and its mirror to a single value.
    pub fn fill_column(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_key(row, col)?;
        self.data.slice_mut(s![.., row, col]).fill(value);
        if row != col {
            self.data.slice_mut(s![.., col, row]).fill(value);
        }
        Ok(())
    }

    /// Iterate the independent columns of a symmetric family: every `(i, j)`
    /// with `i <= j`, in row-major order.
    pub fn iter_columns(&self) -> Columns<'_> {
        Columns {
            array: self,
            row: 0,
            col: 0,
        }
    }

    fn ensure_same_space(&self, other: &MatrixArray) -> Result<()> {
        if self.space != other.space {
            log::warn!(
                "Refusing MatrixArray operation between {} and {} space",
                self.space,
                other.space
            );
            return Err(MatrixArrayError::SpaceMismatch {
                left: self.space,
                right: other.space,
            });
        }
        Ok(())
    }

    fn ensure_same_shape(&self, other: &MatrixArray) -> Result<()> {
        if self.data.shape() != other.data.shape() {
            return Err(MatrixArrayError::ShapeMismatch {
                expected: self.data.shape().to_vec(),
                got: other.data.shape().to_vec(),
            });
        }
        Ok(())
    }

    fn apply_inplace(&mut self, rhs: Operand<'_>, op: fn(&mut f64, f64)) -> Result<()> {
        log::trace!(
            "Elementwise operation over {} matrices of rank {}",
            self.length(),
            self.rank()
        );
        match rhs {
            Operand::Matrices(other) => {
                self.ensure_same_space(other)?;
                self.ensure_same_shape(other)?;
                Zip::from(&mut self.data)
                    .and(&other.data)
                    .for_each(|a, &b| op(a, b));
            }
            Operand::Scalar(value) => self.data.map_inplace(|a| op(a, value)),
            Operand::Array(array) => {
                let view = array.broadcast(self.data.raw_dim()).ok_or_else(|| {
                    MatrixArrayError::ShapeMismatch {
                        expected: self.data.shape().to_vec(),
                        got: array.shape().to_vec(),
                    }
                })?;
                Zip::from(&mut self.data)
                    .and(&view)
                    .for_each(|a, &b| op(a, b));
            }
        }
        Ok(())
    }

    fn apply(&self, rhs: Operand<'_>, op: fn(&mut f64, f64)) -> Result<MatrixArray> {
        let mut out = self.clone();
        out.apply_inplace(rhs, op)?;
        Ok(out)
    }

    /// Elementwise sum as a new array.
    #[allow(clippy::should_implement_trait)]
    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<MatrixArray> {
        self.apply(rhs.into(), |a, b| *a += b)
    }

    pub fn add_inplace<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_inplace(rhs.into(), |a, b| *a += b)?;
        Ok(self)
    }

    /// Elementwise difference as a new array.
    #[allow(clippy::should_implement_trait)]
    pub fn sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<MatrixArray> {
        self.apply(rhs.into(), |a, b| *a -= b)
    }

    pub fn sub_inplace<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_inplace(rhs.into(), |a, b| *a -= b)?;
        Ok(self)
    }

    /// Elementwise (Hadamard) product as a new array. See [`dot`](Self::dot)
    /// for the matrix product.
    #[allow(clippy::should_implement_trait)]
    pub fn mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<MatrixArray> {
        self.apply(rhs.into(), |a, b| *a *= b)
    }

    pub fn mul_inplace<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_inplace(rhs.into(), |a, b| *a *= b)?;
        Ok(self)
    }

    /// Elementwise quotient as a new array. Division by zero follows IEEE 754.
    #[allow(clippy::should_implement_trait)]
    pub fn div<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<MatrixArray> {
        self.apply(rhs.into(), |a, b| *a /= b)
    }

    pub fn div_inplace<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<&mut Self> {
        self.apply_inplace(rhs.into(), |a, b| *a /= b)?;
        Ok(self)
    }

    fn inverted_buffer(&self, config: &LinalgConfig) -> Result<Array3<f64>> {
        config.validate()?;
        log::debug!(
            "Inverting {} matrices of rank {}",
            self.length(),
            self.rank()
        );

        let mut out = Array3::<f64>::zeros(self.data.raw_dim());
        for (index, (matrix, mut target)) in self
            .data
            .outer_iter()
            .zip(out.outer_iter_mut())
            .enumerate()
        {
            let inverse: Array2<f64> = linalg::invert_matrix(matrix, config.pivot_tolerance)
                .ok_or_else(|| {
                    log::warn!("Matrix {} of {} is singular, aborting inversion", index, self.length());
                    MatrixArrayError::SingularMatrix { index }
                })?;
            target.assign(&inverse);
        }
        Ok(out)
    }

    /// Invert every matrix, returning a new array.
    ///
    /// Fails with [`MatrixArrayError::SingularMatrix`] on the first slice that
    /// cannot be inverted.
    pub fn invert(&self) -> Result<MatrixArray> {
        self.invert_with(&LinalgConfig::default())
    }

    pub fn invert_with(&self, config: &LinalgConfig) -> Result<MatrixArray> {
        let inverse = Self {
            data: self.inverted_buffer(config)?,
            space: self.space,
        };
        trace_matrix_array("inverse", &inverse, 4);
        Ok(inverse)
    }

    /// Invert every matrix in place. On failure the buffer is left unchanged.
    pub fn invert_inplace(&mut self) -> Result<&mut Self> {
        self.invert_inplace_with(&LinalgConfig::default())
    }

    pub fn invert_inplace_with(&mut self, config: &LinalgConfig) -> Result<&mut Self> {
        self.data = self.inverted_buffer(config)?;
        trace_matrix_array("inverse", self, 4);
        Ok(self)
    }

    fn product_buffer(&self, other: &MatrixArray) -> Result<Array3<f64>> {
        self.ensure_same_shape(other)?;
        log::debug!(
            "Batched matrix product over {} matrices of rank {}",
            self.length(),
            self.rank()
        );
        let mut out = Array3::<f64>::zeros(self.data.raw_dim());
        linalg::batched_matmul(self.data.view(), other.data.view(), out.view_mut());
        Ok(out)
    }

    /// Matrix product `self[m] . other[m]` for every `m`, as a new array.
    ///
    /// Unlike [`matmul`](Self::matmul) this does not compare space tags, so it
    /// can combine arrays from different spaces deliberately. The result keeps
    /// `self`'s space.
    pub fn dot(&self, other: &MatrixArray) -> Result<MatrixArray> {
        let product = Self {
            data: self.product_buffer(other)?,
            space: self.space,
        };
        trace_matrix_array("product", &product, 4);
        Ok(product)
    }

    pub fn dot_inplace(&mut self, other: &MatrixArray) -> Result<&mut Self> {
        self.data = self.product_buffer(other)?;
        trace_matrix_array("product", self, 4);
        Ok(self)
    }

    /// Space-checked [`dot`](Self::dot).
    pub fn matmul(&self, other: &MatrixArray) -> Result<MatrixArray> {
        self.ensure_same_space(other)?;
        self.dot(other)
    }

    /// Space-checked [`dot_inplace`](Self::dot_inplace).
    pub fn matmul_inplace(&mut self, other: &MatrixArray) -> Result<&mut Self> {
        self.ensure_same_space(other)?;
        self.dot_inplace(other)
    }
}

impl fmt::Display for MatrixArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<MatrixArray rank:{} length:{}>", self.rank(), self.length())
    }
}

/// Iterator over the upper-triangular columns of a [`MatrixArray`].
///
/// Created by [`MatrixArray::iter_columns`].
#[derive(Clone, Debug)]
pub struct Columns<'a> {
    array: &'a MatrixArray,
    row: usize,
    col: usize,
}

impl<'a> Columns<'a> {
    fn remaining(&self) -> usize {
        let rank = self.array.rank();
        if self.row >= rank {
            return 0;
        }
        let rows_left = rank - self.row;
        // Full triangle from `row` down, minus what was already taken from `row`.
        rows_left * (rows_left + 1) / 2 - (self.col - self.row)
    }
}

impl<'a> Iterator for Columns<'a> {
    type Item = ((usize, usize), ArrayView1<'a, f64>);

    fn next(&mut self) -> Option<Self::Item> {
        let array: &'a MatrixArray = self.array;
        let rank = array.rank();
        if self.row >= rank {
            return None;
        }

        let key = (self.row, self.col);
        let column = array.data.slice(s![.., self.row, self.col]);

        self.col += 1;
        if self.col == rank {
            self.row += 1;
            self.col = self.row;
        }
        Some((key, column))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Columns<'a> {}

impl<'a> FusedIterator for Columns<'a> {}
