//! Steady radial diffusion with a volumetric source in a cylindrical pillar
//!
//! D_eff (d²C/dr² + (1/r) dC/dr) = S r^k,   dC/dr(0) = 0,   C(R) = Ce
//!
//! solved by finite differences (forward or central first derivative) and checked
//! against the closed form solution with a grid convergence study.
//!
//! Example
//! ```rust, ignore
//! use RadialDiffusion::numerical::RadialDiffusion::{FD_scheme::Scheme, convergence::convergence_study,
//!     problem::PillarParameters};
//! let params = PillarParameters::default();
//! let study = convergence_study(Scheme::Forward, 5, 8, &params).unwrap();
//! study.log_table();
//! println!("{:?}", study.final_order());
//! ```
/// closed form solution C(r)
pub mod analytical;
/// error norms, observed order of accuracy, convergence table
pub mod convergence;
pub mod error;
/// assembly of the finite difference system
pub mod FD_scheme;
/// uniform radial grid
pub mod grid;
/// physical parameters of the pillar
pub mod problem;
pub mod solver;
/// task document with the parameters of a run
pub mod task_config;
