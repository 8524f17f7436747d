//! Thomas algorithm for tridiagonal systems.
//!
//! The system is stored as three diagonals of equal length `n`:
//! `sub[0]` and `sup[n-1]` lie outside the matrix and are ignored.
//!
//! ```text
//! | diag[0]  sup[0]                     |
//! | sub[1]   diag[1]  sup[1]            |
//! |          ...      ...      ...      |
//! |                   sub[n-1] diag[n-1]|
//! ```
use super::linalg_error::LinalgError;
use log::debug;
use nalgebra::{DMatrix, DVector};

/// pivots smaller than this in absolute value are treated as zero
const PIVOT_EPS: f64 = 1e-300;

#[derive(Debug, Clone, PartialEq)]
pub struct Tridiagonal {
    pub sub: DVector<f64>,
    pub diag: DVector<f64>,
    pub sup: DVector<f64>,
}

impl Tridiagonal {
    pub fn zeros(n: usize) -> Tridiagonal {
        Tridiagonal {
            sub: DVector::zeros(n),
            diag: DVector::zeros(n),
            sup: DVector::zeros(n),
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// dense copy, used by the LU based solvers and for diagnostics
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut A = DMatrix::zeros(n, n);
        for i in 0..n {
            A[(i, i)] = self.diag[i];
            if i > 0 {
                A[(i, i - 1)] = self.sub[i];
            }
            if i + 1 < n {
                A[(i, i + 1)] = self.sup[i];
            }
        }
        A
    }

    /// y = A x without forming the dense matrix
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        let n = self.len();
        DVector::from_fn(n, |i, _| {
            let mut y = self.diag[i] * x[i];
            if i > 0 {
                y += self.sub[i] * x[i - 1];
            }
            if i + 1 < n {
                y += self.sup[i] * x[i + 1];
            }
            y
        })
    }

    /// solve A x = d, see [`thomas_solve`]
    pub fn solve(&self, d: &DVector<f64>) -> Result<DVector<f64>, LinalgError> {
        thomas_solve(&self.sub, &self.diag, &self.sup, d)
    }
}

/// Solve a tridiagonal system with the Thomas algorithm (forward sweep + back substitution).
/// No pivoting: the method is stable for diagonally dominant matrices and for the
/// finite difference operators assembled in this crate. A vanishing pivot is reported as
/// `SingularMatrix` instead of producing infinities.
pub fn thomas_solve(
    sub: &DVector<f64>,
    diag: &DVector<f64>,
    sup: &DVector<f64>,
    d: &DVector<f64>,
) -> Result<DVector<f64>, LinalgError> {
    let n = d.len();
    if n == 0 {
        return Err(LinalgError::EmptySystem);
    }
    if sub.len() != n || diag.len() != n || sup.len() != n {
        return Err(LinalgError::DimensionMismatch {
            rows: diag.len(),
            cols: diag.len(),
            len: n,
        });
    }

    let mut c_prime = DVector::zeros(n);
    let mut d_prime = DVector::zeros(n);

    if diag[0].abs() < PIVOT_EPS {
        return Err(LinalgError::SingularMatrix(0));
    }
    c_prime[0] = sup[0] / diag[0];
    d_prime[0] = d[0] / diag[0];
    // forward sweep
    for i in 1..n {
        let den = diag[i] - sub[i] * c_prime[i - 1];
        if den.abs() < PIVOT_EPS || !den.is_finite() {
            return Err(LinalgError::SingularMatrix(i));
        }
        if i < n - 1 {
            c_prime[i] = sup[i] / den;
        }
        d_prime[i] = (d[i] - sub[i] * d_prime[i - 1]) / den;
    }
    // back substitution
    let mut x = DVector::zeros(n);
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    debug!("Thomas algorithm solved system of size {}", n);
    Ok(x)
}
