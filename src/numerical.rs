//! numerical methods
/// finite difference solver of the steady radial diffusion problem and its convergence analysis
pub mod RadialDiffusion;
