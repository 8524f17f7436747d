use crate::somelinalg::linalg_error::LinalgError;
use thiserror::Error;

/// errors of the radial diffusion solver, the convergence study and their glue
#[derive(Debug, Error)]
pub enum DiffusionError {
    #[error("grid must contain at least 3 points (both boundaries included), got {0}")]
    InvalidGridSize(usize),
    #[error("refinement level {level} of a study starting from {initial_grid_size} points exceeds the limit of {max} points")]
    GridTooLarge {
        initial_grid_size: usize,
        level: usize,
        max: usize,
    },
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("linear system error: {0}")]
    Linalg(#[from] LinalgError),
    #[error("dimension mismatch: numerical solution has {numerical} values, analytical has {analytical}")]
    DimensionMismatch { numerical: usize, analytical: usize },
    #[error("solution contains a non-finite value at node {0}")]
    NonFiniteSolution(usize),
    #[error("unknown finite difference scheme `{0}`: choose 'forward' or 'central'")]
    UnknownScheme(String),
    #[error("unknown linear solver `{0}`: choose 'thomas', 'band' or 'full'")]
    UnknownLinearSolver(String),
    #[error("unknown log level `{0}`: choose debug, info, warn, error or off")]
    UnknownLogLevel(String),
    #[error("task parsing error: {0}")]
    TaskParse(String),
    #[error("plotting error: {0}")]
    Plot(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiffusionError {
    /// true for the numerical failure modes (singular matrix, non-finite result)
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            DiffusionError::Linalg(_) | DiffusionError::NonFiniteSolution(_)
        )
    }
}
