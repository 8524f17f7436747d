//! direct solvers for banded matrices
#![allow(non_snake_case)]
/// LU decomposition with partial pivoting restricted to the band of the matrix
pub mod lu_band_nalg;
