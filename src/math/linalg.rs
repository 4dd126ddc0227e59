//! Per-slice kernels used by the batched `MatrixArray` operations.
//!
//! Inversion is LU decomposition with partial pivoting followed by one
//! forward/back substitution per unit column. Multiplication delegates each
//! slice to ndarray's `general_mat_mul`.

use ndarray::linalg::general_mat_mul;
use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewMut3};

/// Packed `PA = LU` factorization of one square slice.
struct LuFactors {
    /// Lower triangle (without the unit diagonal) holds L, the rest holds U.
    lu: Array2<f64>,
    /// Row `i` of `PA` is row `pivots[i]` of `A`.
    pivots: Vec<usize>,
}

impl LuFactors {
    /// Returns `None` when a pivot is zero or not finite. A positive
    /// `pivot_tolerance` additionally rejects pivots at or below
    /// `pivot_tolerance * max|a_ij|`.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    fn decompose(a: ArrayView2<'_, f64>, pivot_tolerance: f64) -> Option<Self> {
        let n = a.nrows();
        let threshold = if pivot_tolerance > 0.0 {
            pivot_tolerance * a.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
        } else {
            0.0
        };

        let mut lu = a.to_owned();
        let mut pivots: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let mut max_val = lu[[k, k]].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = lu[[i, k]].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_row != k {
                for j in 0..n {
                    lu.swap([k, j], [max_row, j]);
                }
                pivots.swap(k, max_row);
            }

            let pivot = lu[[k, k]];
            if !pivot.is_finite() || !(pivot.abs() > threshold) {
                return None;
            }

            for i in (k + 1)..n {
                let factor = lu[[i, k]] / pivot;
                lu[[i, k]] = factor;
                for j in (k + 1)..n {
                    let ukj = lu[[k, j]];
                    lu[[i, j]] -= factor * ukj;
                }
            }
        }

        Some(Self { lu, pivots })
    }

    fn inverse(&self) -> Array2<f64> {
        let n = self.pivots.len();
        let mut inv = Array2::<f64>::zeros((n, n));
        let mut x = vec![0.0f64; n];

        for col in 0..n {
            for (i, &pi) in self.pivots.iter().enumerate() {
                x[i] = if pi == col { 1.0 } else { 0.0 };
            }

            // Forward substitution with the implicit unit diagonal of L.
            #[allow(clippy::needless_range_loop)]
            for i in 1..n {
                for j in 0..i {
                    let lij_xj = self.lu[[i, j]] * x[j];
                    x[i] -= lij_xj;
                }
            }

            #[allow(clippy::needless_range_loop)]
            for i in (0..n).rev() {
                for j in (i + 1)..n {
                    let uij_xj = self.lu[[i, j]] * x[j];
                    x[i] -= uij_xj;
                }
                x[i] /= self.lu[[i, i]];
            }

            for (i, &value) in x.iter().enumerate() {
                inv[[i, col]] = value;
            }
        }

        inv
    }
}

/// Invert a single square matrix, or `None` if it is numerically singular.
pub(crate) fn invert_matrix(a: ArrayView2<'_, f64>, pivot_tolerance: f64) -> Option<Array2<f64>> {
    LuFactors::decompose(a, pivot_tolerance).map(|factors| factors.inverse())
}

/// `out[m] = lhs[m] . rhs[m]` for every slice `m`. Shapes are checked by the caller.
pub(crate) fn batched_matmul(
    lhs: ArrayView3<'_, f64>,
    rhs: ArrayView3<'_, f64>,
    mut out: ArrayViewMut3<'_, f64>,
) {
    for ((mut target, a), b) in out
        .outer_iter_mut()
        .zip(lhs.outer_iter())
        .zip(rhs.outer_iter())
    {
        general_mat_mul(1.0, &a, &b, 0.0, &mut target);
    }
}
