//! Closed-form steady profile of the pillar problem.
//!
//! Integrating (1/r) d/dr (r dC/dr) = S r^k / D_eff twice with dC/dr(0) = 0 and C(R) = Ce gives
//!
//! C(r) = Ce + S / (D_eff (k+2)²) * (r^(k+2) - R^(k+2))
//!
//! which for the uniform source (k = 0) is C(r) = (1/4)(S/D_eff)(r² - R²) + Ce.
use super::problem::PillarParameters;
use nalgebra::DVector;

fn profile_coefficient(params: &PillarParameters) -> f64 {
    let m = params.source_exponent + 2.0;
    params.source / (params.diffusivity * m * m)
}

/// concentration at radius r [mol/m³]
pub fn analytical_solution(r: f64, params: &PillarParameters) -> f64 {
    let m = params.source_exponent + 2.0;
    params.outer_concentration + profile_coefficient(params) * (r.powf(m) - params.radius.powf(m))
}

/// analytical solution evaluated at every node of `r`
pub fn analytical_profile(r: &DVector<f64>, params: &PillarParameters) -> DVector<f64> {
    r.map(|ri| analytical_solution(ri, params))
}

/// C(0) = Ce - S R^(k+2) / (D_eff (k+2)²)
pub fn centre_concentration(params: &PillarParameters) -> f64 {
    let m = params.source_exponent + 2.0;
    params.outer_concentration - profile_coefficient(params) * params.radius.powf(m)
}

/// dC/dr = S r^(k+1) / (D_eff (k+2))
pub fn analytical_gradient(r: f64, params: &PillarParameters) -> f64 {
    let m = params.source_exponent + 2.0;
    params.source * r.powf(m - 1.0) / (params.diffusivity * m)
}
