//! Finite difference discretisation of the radial diffusion operator.
//!
//! Interior nodes i = 1..N-2:
//!
//! d²C/dr² ≈ (C_{i+1} - 2C_i + C_{i-1}) / dr²
//!
//! dC/dr ≈ (C_{i+1} - C_i) / dr              (forward, O(dr))
//!
//! dC/dr ≈ (C_{i+1} - C_{i-1}) / (2 dr)      (central, O(dr²))
//!
//! Centre node: second-order one-sided zero flux condition -3C_0 + 4C_1 - C_2 = 0
//! (used by both schemes so the boundary does not spoil the interior order).
//! Outer node: C_{N-1} = Ce.
//!
//! The resulting matrix is tridiagonal except for the entry (0, 2).
use super::error::DiffusionError;
use super::grid::RadialGrid;
use super::problem::PillarParameters;
use crate::somelinalg::linalg_error::LinalgError;
use crate::somelinalg::tridiagonal::Tridiagonal;
use nalgebra::{DMatrix, DVector};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// approximation of the first derivative in the (1/r) dC/dr term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Scheme {
    #[strum(to_string = "forward")]
    Forward,
    #[strum(to_string = "central")]
    Central,
}

impl Scheme {
    /// formal order of accuracy of the scheme
    pub fn theoretical_order(&self) -> f64 {
        match self {
            Scheme::Forward => 1.0,
            Scheme::Central => 2.0,
        }
    }

    pub fn parse(name: &str) -> Result<Scheme, DiffusionError> {
        Scheme::from_str(name.trim()).map_err(|_| DiffusionError::UnknownScheme(name.to_string()))
    }
}

/// Assembled linear system A C = rhs.
/// `tri` holds the three central diagonals, `centre_far` is A[0][2].
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteSystem {
    pub tri: Tridiagonal,
    pub centre_far: f64,
    pub rhs: DVector<f64>,
}

/// Build the finite difference system of the pillar problem on `grid`.
pub fn assemble_system(grid: &RadialGrid, scheme: Scheme, params: &PillarParameters) -> DiscreteSystem {
    let n = grid.len();
    let dr = grid.dr();
    let r = grid.nodes();
    let d = params.diffusivity;
    let mut tri = Tridiagonal::zeros(n);
    let mut rhs = DVector::zeros(n);

    let inv_dr2 = 1.0 / (dr * dr);
    for i in 1..n - 1 {
        let r_i = r[i];
        // second derivative
        let mut coeff_im1 = d * inv_dr2;
        let mut coeff_i = -2.0 * d * inv_dr2;
        let mut coeff_ip1 = d * inv_dr2;
        match scheme {
            Scheme::Forward => {
                coeff_i -= d / (r_i * dr);
                coeff_ip1 += d / (r_i * dr);
            }
            Scheme::Central => {
                coeff_im1 -= d / (r_i * 2.0 * dr);
                coeff_ip1 += d / (r_i * 2.0 * dr);
            }
        }
        tri.sub[i] = coeff_im1;
        tri.diag[i] = coeff_i;
        tri.sup[i] = coeff_ip1;
        rhs[i] = params.source_at(r_i);
    }
    // zero flux at r = 0
    tri.diag[0] = -3.0;
    tri.sup[0] = 4.0;
    let centre_far = -1.0;
    rhs[0] = 0.0;
    // Dirichlet at r = R
    tri.diag[n - 1] = 1.0;
    rhs[n - 1] = params.outer_concentration;

    DiscreteSystem { tri, centre_far, rhs }
}

impl DiscreteSystem {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    /// (kl, ku) of the full matrix
    pub fn bandwidth(&self) -> (usize, usize) {
        (1, 2)
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut A = self.tri.to_dense();
        A[(0, 2)] = self.centre_far;
        A
    }

    /// A c - rhs
    pub fn residual(&self, c: &DVector<f64>) -> DVector<f64> {
        let mut res = self.tri.mul_vec(c) - &self.rhs;
        res[0] += self.centre_far * c[2];
        res
    }

    /// Eliminate A[0][2] with row 1 (row0 -= A[0][2] / A[1][2] * row1) so that the
    /// system becomes purely tridiagonal. The solution is unchanged.
    pub fn reduce_to_tridiagonal(&self) -> Result<(Tridiagonal, DVector<f64>), DiffusionError> {
        let mut tri = self.tri.clone();
        let mut rhs = self.rhs.clone();
        if self.centre_far == 0.0 {
            return Ok((tri, rhs));
        }
        if tri.sup[1] == 0.0 {
            return Err(LinalgError::SingularMatrix(1).into());
        }
        let factor = self.centre_far / tri.sup[1];
        tri.diag[0] -= factor * tri.sub[1];
        tri.sup[0] -= factor * tri.diag[1];
        rhs[0] -= factor * rhs[1];
        Ok((tri, rhs))
    }
}
