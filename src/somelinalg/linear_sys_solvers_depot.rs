use crate::somelinalg::RustedLINPACK::lu_band_nalg::BandedLU;
use crate::somelinalg::linalg_error::LinalgError;
use crate::somelinalg::tridiagonal::Tridiagonal;
use log::debug;
use nalgebra::{DMatrix, DVector};
use strum_macros::{Display, EnumIter, EnumString};

/// direct solvers available for the finite difference system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum LinearSolverKind {
    /// O(N) Thomas algorithm on the tridiagonal form of the system
    #[default]
    #[strum(to_string = "thomas")]
    Thomas,
    /// LU with partial pivoting restricted to the band
    #[strum(to_string = "band")]
    BandedLU,
    /// nalgebra dense LU, O(N³)
    #[strum(to_string = "full")]
    DenseLU,
}

/// Solve a dense-stored system with one of the LU solvers.
/// `bandwidth` = (kl, ku) is only used by `BandedLU`.
pub fn nalgebra_solvers_depot(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    method: LinearSolverKind,
    bandwidth: (usize, usize),
) -> Result<DVector<f64>, LinalgError> {
    if !A.is_square() {
        return Err(LinalgError::NotSquare(A.nrows(), A.ncols()));
    }
    if A.nrows() != b.len() {
        return Err(LinalgError::DimensionMismatch {
            rows: A.nrows(),
            cols: A.ncols(),
            len: b.len(),
        });
    }
    debug!("solving {}x{} system with method {}", A.nrows(), A.ncols(), method);
    match method {
        LinearSolverKind::BandedLU => {
            let mut lu = BandedLU::new(A.to_owned(), Some(bandwidth))?;
            lu.solve(b)
        }
        LinearSolverKind::DenseLU => {
            let lu = A.to_owned().lu();
            lu.solve(b).ok_or_else(|| {
                let u = lu.u();
                let zero_row = (0..u.nrows()).find(|&i| u[(i, i)] == 0.0).unwrap_or(0);
                LinalgError::SingularMatrix(zero_row)
            })
        }
        LinearSolverKind::Thomas => {
            if bandwidth != (1, 1) {
                debug!("Thomas algorithm requested for bandwidth {:?}, using banded LU", bandwidth);
                let mut lu = BandedLU::new(A.to_owned(), Some(bandwidth))?;
                return lu.solve(b);
            }
            let n = A.nrows();
            let tri = Tridiagonal {
                sub: DVector::from_fn(n, |i, _| if i > 0 { A[(i, i - 1)] } else { 0.0 }),
                diag: A.diagonal(),
                sup: DVector::from_fn(n, |i, _| if i + 1 < n { A[(i, i + 1)] } else { 0.0 }),
            };
            tri.solve(b)
        }
    }
}
