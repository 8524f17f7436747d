//! examples of usage of RadialDiffusion
/// radial diffusion solver, convergence studies, task documents
pub mod diffusion_examples;
