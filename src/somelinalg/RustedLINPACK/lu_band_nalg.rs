#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
use crate::somelinalg::linalg_error::LinalgError;
use log::debug;
use nalgebra::{DMatrix, DVector};
use std::mem;

/// LU decomposition with partial (row) pivoting, restricted to a banded matrix.
/// Rewrite of the nalgebra LU algorithm: every Gaussian step only touches the rows
/// `i..i+kl+1` and the columns `i..i+kl+ku+1` (pivoting may widen the upper band by `kl`).
/// Row interchanges are recorded per step and not applied to the columns already
/// eliminated, so the multipliers of column i stay in rows `i+1..i+kl+1` and both
/// substitutions stay in the band. Cost is O(N kl (kl+ku)) instead of O(N³).
///
/// The finite difference matrices of the radial problem have `kl = 1`, `ku = 2`
/// (the second-order centre condition reaches two nodes to the right).
pub struct BandedLU {
    lu: DMatrix<f64>,
    /// pivot row chosen at each elimination step
    ipiv: Vec<usize>,
    p: Vec<usize>,
    kl: usize,
    ku: usize,
    decomposed: bool,
}

impl BandedLU {
    /// `bandwidth` is `(kl, ku)`; if `None` it is detected from the nonzero pattern
    pub fn new(matrix: DMatrix<f64>, bandwidth: Option<(usize, usize)>) -> Result<BandedLU, LinalgError> {
        let (nrows, ncols) = matrix.shape();
        if nrows != ncols {
            return Err(LinalgError::NotSquare(nrows, ncols));
        }
        if nrows == 0 {
            return Err(LinalgError::EmptySystem);
        }
        let (kl, ku) = bandwidth.unwrap_or_else(|| Self::find_bandwidths(&matrix));
        debug!("banded LU: n = {}, kl = {}, ku = {}", nrows, kl, ku);
        Ok(BandedLU {
            lu: matrix,
            ipiv: (0..nrows).collect(),
            p: (0..nrows).collect(),
            kl,
            ku,
            decomposed: false,
        })
    }

    pub fn bandwidths(&self) -> (usize, usize) {
        (self.kl, self.ku)
    }

    /// Factorise in place. For each column the pivot is the entry of largest magnitude
    /// among the `kl + 1` rows that can be nonzero; rows are swapped when needed and the
    /// multipliers are stored below the diagonal.
    pub fn decompose(&mut self) -> Result<(), LinalgError> {
        if self.decomposed {
            return Ok(());
        }
        let n = self.lu.nrows();
        let (kl, ku) = (self.kl, self.ku);
        for i in 0..n {
            let lower_border = std::cmp::min(n, i + kl + 1);
            let piv = self.lu.view_range(i..lower_border, i).icamax() + i;
            let diag = self.lu[(piv, i)];
            if diag == 0.0 {
                return Err(LinalgError::SingularMatrix(i));
            }
            self.ipiv[i] = piv;
            if piv != i {
                self.p.swap(i, piv);
                Self::gauss_step_swap(&mut self.lu, diag, i, piv, kl, ku, n);
            } else {
                Self::gauss_step(&mut self.lu, diag, i, kl, ku, n);
            }
        }
        self.decomposed = true;
        Ok(())
    }

    /// Swaps row `i` with row `piv` and executes one step of Gaussian elimination on the
    /// i-th row and column. `diag` is the pivot value (already located at row `piv`).
    fn gauss_step_swap(
        matrix: &mut DMatrix<f64>,
        diag: f64,
        i: usize,
        piv: usize,
        kl: usize,
        ku: usize,
        n: usize,
    ) {
        let piv = piv - i;
        let lower_border = std::cmp::min(n, i + kl + 1);
        let right_border = std::cmp::min(n, i + ku + kl + 1);
        let mut submat = matrix.view_range_mut(i..lower_border, i..right_border);
        let inv_diag = 1.0 / diag;
        // coeffs: column i, submat: the rest of the band
        let (mut coeffs, mut submat) = submat.columns_range_pair_mut(0, 1..);
        coeffs.swap((0, 0), (piv, 0));
        let mut coeffs = coeffs.rows_range_mut(1..);
        coeffs *= inv_diag;
        let (mut pivot_row, mut down) = submat.rows_range_pair_mut(0, 1..);
        for k in 0..pivot_row.ncols() {
            mem::swap(&mut pivot_row[k], &mut down[(piv - 1, k)]);
            // down[:, k] -= pivot_row[k] * coeffs
            down.column_mut(k).axpy(-pivot_row[k], &coeffs, 1.0);
        }
    }

    /// One step of Gaussian elimination on the i-th row and column, no swap.
    fn gauss_step(matrix: &mut DMatrix<f64>, diag: f64, i: usize, kl: usize, ku: usize, n: usize) {
        let lower_border = std::cmp::min(n, i + kl + 1);
        let right_border = std::cmp::min(n, i + ku + kl + 1);
        let mut submat = matrix.view_range_mut(i..lower_border, i..right_border);
        let inv_diag = 1.0 / diag;
        let (mut coeffs, mut submat) = submat.columns_range_pair_mut(0, 1..);
        let mut coeffs = coeffs.rows_range_mut(1..);
        coeffs *= inv_diag;
        let (pivot_row, mut down) = submat.rows_range_pair_mut(0, 1..);
        for k in 0..pivot_row.ncols() {
            down.column_mut(k).axpy(-pivot_row[k], &coeffs, 1.0);
        }
    }

    /// unit lower triangular factor of `P A = L U`
    pub fn l(&self) -> DMatrix<f64> {
        let mut m = self.lu.clone();
        for (i, &piv) in self.ipiv.iter().enumerate() {
            if piv != i {
                m.columns_range_mut(0..i).swap_rows(i, piv);
            }
        }
        m.fill_upper_triangle(0.0, 1);
        m.fill_diagonal(1.0);
        m
    }

    pub fn u(&self) -> DMatrix<f64> {
        self.lu.upper_triangle()
    }

    /// row permutation: row `k` of `P A` is row `p[k]` of `A`
    pub fn p(&self) -> &[usize] {
        &self.p
    }

    /// Solve A x = b. Decomposes first if that was not done yet.
    pub fn solve(&mut self, b: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
        let n = self.lu.nrows();
        if b.len() != n {
            return Err(LinalgError::DimensionMismatch {
                rows: n,
                cols: n,
                len: b.len(),
            });
        }
        self.decompose()?;
        let (kl, ku) = (self.kl, self.ku);
        let mut x = b.clone();
        // forward sweep: the interchange of step i, then the multipliers of column i
        for i in 0..n {
            let piv = self.ipiv[i];
            if piv != i {
                x.swap_rows(i, piv);
            }
            let xi = x[i];
            for r in i + 1..std::cmp::min(n, i + kl + 1) {
                x[r] -= self.lu[(r, i)] * xi;
            }
        }
        // back substitution, U has kl + ku super-diagonals
        for i in (0..n).rev() {
            let diag = self.lu[(i, i)];
            if diag == 0.0 {
                return Err(LinalgError::SingularMatrix(i));
            }
            let mut sum = x[i];
            for j in i + 1..std::cmp::min(n, i + kl + ku + 1) {
                sum -= self.lu[(i, j)] * x[j];
            }
            x[i] = sum / diag;
        }
        Ok(x)
    }

    /// Number of nonzero sub- and super-diagonals.
    pub fn find_bandwidths(A: &DMatrix<f64>) -> (usize, usize) {
        let n = A.nrows();
        let mut kl = 0;
        let mut ku = 0;
        for i in 0..n {
            for j in 0..n {
                if A[(i, j)] != 0.0 {
                    if j > i {
                        ku = std::cmp::max(ku, j - i);
                    } else if i > j {
                        kl = std::cmp::max(kl, i - j);
                    }
                }
            }
        }
        (kl, ku)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// tridiagonal matrix with an extra entry at (0, 2), same pattern as the radial operator
    fn radial_like_matrix(n: usize) -> DMatrix<f64> {
        let mut A = DMatrix::zeros(n, n);
        A[(0, 0)] = -3.0;
        A[(0, 1)] = 4.0;
        A[(0, 2)] = -1.0;
        for i in 1..n - 1 {
            A[(i, i - 1)] = 1.0 - 0.5 / i as f64;
            A[(i, i)] = -2.0;
            A[(i, i + 1)] = 1.0 + 0.5 / i as f64;
        }
        A[(n - 1, n - 1)] = 1.0;
        A
    }

    #[test]
    fn test_find_bandwidths() {
        let A = radial_like_matrix(8);
        assert_eq!(BandedLU::find_bandwidths(&A), (1, 2));
        let lu = BandedLU::new(A, None).unwrap();
        assert_eq!(lu.bandwidths(), (1, 2));
    }

    #[test]
    fn test_LU_reconstructs_matrix() {
        let data = vec![
            4.0, 1.0, 0.0, 0.0, 2.0, 5.0, 1.0, 0.0, 0.0, 3.0, 6.0, 2.0, 0.0, 0.0, 1.0, 7.0,
        ];
        let matrix = DMatrix::from_vec(4, 4, data);
        let mut lu = BandedLU::new(matrix.clone(), None).unwrap();
        lu.decompose().unwrap();
        let l = lu.l();
        let u = lu.u();
        let mut pa = matrix.clone();
        for (k, &row) in lu.p().iter().enumerate() {
            pa.set_row(k, &matrix.row(row));
        }
        assert_relative_eq!(&l * &u, pa, epsilon = 1e-12);
    }

    #[test]
    fn test_banded_solve_matches_dense() {
        let n = 20;
        let A = radial_like_matrix(n);
        let b = DVector::from_fn(n, |i, _| if i == n - 1 { 20.0 } else if i == 0 { 0.0 } else { 0.1 });
        let mut lu = BandedLU::new(A.clone(), Some((1, 2))).unwrap();
        let x = lu.solve(&b).unwrap();
        let x_dense = A.clone().lu().solve(&b).unwrap();
        assert_relative_eq!(x, x_dense, epsilon = 1e-10);
        assert_relative_eq!(&A * &x, b, epsilon = 1e-10);
    }

    #[test]
    fn test_pivoting_needed() {
        // zero on the leading diagonal forces a row swap
        let A = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 2.0, 1.0, 1.0, 0.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![1.0, 4.0, 7.0]);
        let mut lu = BandedLU::new(A.clone(), None).unwrap();
        let x = lu.solve(&b).unwrap();
        assert_relative_eq!(&A * &x, b, epsilon = 1e-12);
    }

    #[test]
    fn test_repeated_pivoting_on_wide_system() {
        // pivots come from below on every step: the pivot rows must be replayed on b
        let n = 12;
        let mut A = DMatrix::zeros(n, n);
        for i in 0..n {
            A[(i, i)] = 0.1;
            if i + 1 < n {
                A[(i + 1, i)] = 3.0 + i as f64;
                A[(i, i + 1)] = 1.0;
            }
            if i + 2 < n {
                A[(i, i + 2)] = -0.5;
            }
        }
        let b = DVector::from_fn(n, |i, _| 1.0 + i as f64);
        let mut lu = BandedLU::new(A.clone(), None).unwrap();
        assert_eq!(lu.bandwidths(), (1, 2));
        let x = lu.solve(&b).unwrap();
        assert_relative_eq!(&A * &x, b, epsilon = 1e-9);
        assert!(lu.p().iter().enumerate().any(|(k, &row)| k != row));
        let mut pa = A.clone();
        for (k, &row) in lu.p().iter().enumerate() {
            pa.set_row(k, &A.row(row));
        }
        assert_relative_eq!(lu.l() * lu.u(), pa, epsilon = 1e-9);
    }

    #[test]
    fn test_singular_matrix() {
        let A = DMatrix::from_row_slice(3, 3, &[1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        let mut lu = BandedLU::new(A, None).unwrap();
        assert!(matches!(lu.solve(&b), Err(LinalgError::SingularMatrix(_))));
    }

    #[test]
    fn test_not_square() {
        let A = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(BandedLU::new(A, None), Err(LinalgError::NotSquare(2, 3))));
    }
}
