use thiserror::Error;

/// failures of the direct linear solvers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinalgError {
    #[error("matrix is singular: zero pivot at row {0}")]
    SingularMatrix(usize),
    #[error("dimensions of matrix ({rows}x{cols}) and vector ({len}) must match")]
    DimensionMismatch { rows: usize, cols: usize, len: usize },
    #[error("matrix must be square, got {0}x{1}")]
    NotSquare(usize, usize),
    #[error("linear system is empty")]
    EmptySystem,
}
