//! some linear algebra functions used throughout the code
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// error type of the direct solvers
pub mod linalg_error;
/// Thomas algorithm for tridiagonal matrices
pub mod tridiagonal;

pub mod RustedLINPACK;
/// diagnostics for linear systems and matrices: if it is singular
/// or poorly conditioned
pub mod linear_sys_diagnostics;
/// choice of the direct solver by name
pub mod linear_sys_solvers_depot;
