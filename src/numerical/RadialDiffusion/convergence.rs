//! Convergence analysis: error norms against the analytical profile and observed
//! order of accuracy over a sequence of grids, each halving dr.
use super::FD_scheme::Scheme;
use super::analytical::analytical_profile;
use super::error::DiffusionError;
use super::grid::refinement_sizes;
use super::problem::PillarParameters;
use super::solver::solve_diffusion_with;
use crate::somelinalg::linear_sys_solvers_depot::LinearSolverKind;
use itertools::Itertools;
use log::info;
use nalgebra::DVector;
use tabled::{builder::Builder, settings::Style};

/// Errors below ROUND_OFF_FLOOR * max(1, |Ce|) are round-off: the ratio of two of them
/// says nothing about the discretisation, so no order is reported for such a pair.
pub const ROUND_OFF_FLOOR: f64 = 1e-11;

/// error level treated as round-off for an outer concentration `Ce`
pub fn round_off_floor(outer_concentration: f64) -> f64 {
    ROUND_OFF_FLOOR * outer_concentration.abs().max(1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorNorms {
    /// mean absolute error
    pub L1: f64,
    /// root mean square error
    pub L2: f64,
    /// maximum absolute error
    pub Linf: f64,
}

/// L1 = Σ|e|/N, L2 = sqrt(Σe²/N), L∞ = max|e|
pub fn compute_error_norms(
    C_numerical: &DVector<f64>,
    C_analytical: &DVector<f64>,
) -> Result<ErrorNorms, DiffusionError> {
    if C_numerical.len() != C_analytical.len() || C_numerical.is_empty() {
        return Err(DiffusionError::DimensionMismatch {
            numerical: C_numerical.len(),
            analytical: C_analytical.len(),
        });
    }
    let error = (C_numerical - C_analytical).abs();
    let n = error.len() as f64;
    Ok(ErrorNorms {
        L1: error.sum() / n,
        L2: (error.norm_squared() / n).sqrt(),
        Linf: error.max(),
    })
}

/// ln(e_coarse / e_fine) / ln(dr_coarse / dr_fine), None if either error is at `floor` or below
pub fn observed_order(e_coarse: f64, e_fine: f64, dr_coarse: f64, dr_fine: f64, floor: f64) -> Option<f64> {
    if e_coarse <= floor || e_fine <= floor || dr_coarse == dr_fine {
        return None;
    }
    Some((e_coarse / e_fine).ln() / (dr_coarse / dr_fine).ln())
}

/// one grid of the study
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceLevel {
    pub n_points: usize,
    pub dr: f64,
    pub norms: ErrorNorms,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceStudy {
    pub scheme: Scheme,
    pub levels: Vec<ConvergenceLevel>,
    /// errors at or below this are round-off
    pub round_off_floor: f64,
    /// observed orders between consecutive levels, one entry fewer than `levels`
    pub order_L1: Vec<Option<f64>>,
    pub order_L2: Vec<Option<f64>>,
    pub order_Linf: Vec<Option<f64>>,
}

/// Run a grid convergence study: `num_refinements` grids starting from
/// `initial_grid_size` nodes, dr halved at each level. Every level is solved to completion
/// before the next one is started.
pub fn convergence_study(
    scheme: Scheme,
    initial_grid_size: usize,
    num_refinements: usize,
    params: &PillarParameters,
) -> Result<ConvergenceStudy, DiffusionError> {
    convergence_study_with(scheme, initial_grid_size, num_refinements, params, LinearSolverKind::default())
}

/// convergence study solving every level with `linear_solver`
pub fn convergence_study_with(
    scheme: Scheme,
    initial_grid_size: usize,
    num_refinements: usize,
    params: &PillarParameters,
    linear_solver: LinearSolverKind,
) -> Result<ConvergenceStudy, DiffusionError> {
    let sizes = refinement_sizes(initial_grid_size, num_refinements)?;
    let mut levels = Vec::with_capacity(sizes.len());
    for n_points in sizes {
        let solution = solve_diffusion_with(n_points, scheme, params, linear_solver)?;
        let C_ana = analytical_profile(&solution.r, params);
        let norms = compute_error_norms(&solution.C, &C_ana)?;
        info!(
            "{} scheme, N = {}: L1 = {:.4e}, L2 = {:.4e}, Linf = {:.4e}",
            scheme, n_points, norms.L1, norms.L2, norms.Linf
        );
        levels.push(ConvergenceLevel {
            n_points,
            dr: solution.dr(),
            norms,
        });
    }
    let floor = round_off_floor(params.outer_concentration);
    let orders = |norm: fn(&ErrorNorms) -> f64| -> Vec<Option<f64>> {
        levels
            .iter()
            .tuple_windows()
            .map(|(coarse, fine)| observed_order(norm(&coarse.norms), norm(&fine.norms), coarse.dr, fine.dr, floor))
            .collect()
    };
    let order_L1 = orders(|n| n.L1);
    let order_L2 = orders(|n| n.L2);
    let order_Linf = orders(|n| n.Linf);
    Ok(ConvergenceStudy {
        scheme,
        levels,
        round_off_floor: floor,
        order_L1,
        order_L2,
        order_Linf,
    })
}

fn format_order(order: Option<f64>) -> String {
    match order {
        Some(p) => format!("{:.4}", p),
        None => "-".to_string(),
    }
}

impl ConvergenceStudy {
    /// observed orders of the finest pair of grids (L1, L2, L∞)
    pub fn final_order(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        (
            self.order_L1.last().copied().flatten(),
            self.order_L2.last().copied().flatten(),
            self.order_Linf.last().copied().flatten(),
        )
    }

    /// every error of every level is round-off: the scheme reproduces the profile
    pub fn is_exact(&self) -> bool {
        !self.levels.is_empty()
            && self.levels.iter().all(|l| {
                l.norms.L1 <= self.round_off_floor
                    && l.norms.L2 <= self.round_off_floor
                    && l.norms.Linf <= self.round_off_floor
            })
    }

    pub fn dr(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.dr).collect()
    }

    /// errors of every level for one norm
    pub fn errors(&self, norm: fn(&ErrorNorms) -> f64) -> Vec<f64> {
        self.levels.iter().map(|l| norm(&l.norms)).collect()
    }

    /// convergence table: one row per grid, orders refer to the pair (previous, this)
    pub fn table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(
            ["N", "dr", "L1", "L2", "Linf", "order L1", "order L2", "order Linf"].map(String::from),
        );
        for (i, level) in self.levels.iter().enumerate() {
            let order = |orders: &Vec<Option<f64>>| {
                if i == 0 { "-".to_string() } else { format_order(orders[i - 1]) }
            };
            builder.push_record([
                level.n_points.to_string(),
                format!("{:.4e}", level.dr),
                format!("{:.4e}", level.norms.L1),
                format!("{:.4e}", level.norms.L2),
                format!("{:.4e}", level.norms.Linf),
                order(&self.order_L1),
                order(&self.order_L2),
                order(&self.order_Linf),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }

    pub fn log_table(&self) {
        info!(
            "\n \n CONVERGENCE TABLE: {} scheme (theoretical order {}) \n{}",
            self.scheme,
            self.scheme.theoretical_order(),
            self.table()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_error_norms() {
        let num = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let ana = DVector::from_vec(vec![1.0, 2.5, 2.0, 4.0]);
        let norms = compute_error_norms(&num, &ana).unwrap();
        assert_relative_eq!(norms.L1, 1.5 / 4.0);
        assert_relative_eq!(norms.L2, (1.25f64 / 4.0).sqrt());
        assert_relative_eq!(norms.Linf, 1.0);
        assert!(norms.L1 <= norms.L2 && norms.L2 <= norms.Linf);
    }

    #[test]
    fn test_error_norms_mismatch() {
        let num = DVector::from_vec(vec![1.0, 2.0]);
        let ana = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            compute_error_norms(&num, &ana),
            Err(DiffusionError::DimensionMismatch { numerical: 2, analytical: 1 })
        ));
        let empty = DVector::<f64>::zeros(0);
        assert!(compute_error_norms(&empty, &empty).is_err());
    }

    #[test]
    fn test_observed_order() {
        assert_relative_eq!(observed_order(4.0, 1.0, 0.2, 0.1, 1e-12).unwrap(), 2.0);
        assert_relative_eq!(observed_order(2.0, 1.0, 0.2, 0.1, 1e-12).unwrap(), 1.0);
        assert_eq!(observed_order(1e-15, 1e-15, 0.2, 0.1, 1e-12), None);
        assert_eq!(observed_order(1.0, 0.0, 0.2, 0.1, 1e-12), None);
    }

    #[test]
    fn test_study_shape() {
        let study = convergence_study(Scheme::Forward, 5, 4, &PillarParameters::default()).unwrap();
        let n: Vec<usize> = study.levels.iter().map(|l| l.n_points).collect();
        assert_eq!(n, vec![5, 9, 17, 33]);
        assert_eq!(study.order_L1.len(), 3);
        assert_eq!(study.order_L2.len(), 3);
        assert_eq!(study.order_Linf.len(), 3);
        let dr = study.dr();
        for w in dr.windows(2) {
            assert_relative_eq!(w[1], w[0] / 2.0, epsilon = 1e-15);
        }
        let table = study.table();
        assert!(table.contains("order Linf"));
        assert!(table.contains("33"));
    }

    #[test]
    fn test_round_off_floor() {
        assert_relative_eq!(round_off_floor(20.0), 2e-10);
        assert_relative_eq!(round_off_floor(-20.0), 2e-10);
        assert_relative_eq!(round_off_floor(0.1), ROUND_OFF_FLOOR);
        let floor = round_off_floor(20.0);
        assert_eq!(observed_order(1e-10, 5e-11, 0.2, 0.1, floor), None);
        assert!(observed_order(1e-9, 5e-10, 0.2, 0.1, floor).is_some());
    }

    #[test]
    fn test_is_exact() {
        let params = PillarParameters::default();
        let central = convergence_study(Scheme::Central, 5, 3, &params).unwrap();
        assert_relative_eq!(central.round_off_floor, 2e-10);
        assert!(central.is_exact());
        let forward = convergence_study(Scheme::Forward, 5, 3, &params).unwrap();
        assert!(!forward.is_exact());
        let empty = convergence_study(Scheme::Forward, 5, 0, &params).unwrap();
        assert!(!empty.is_exact());
    }

    #[test]
    fn test_study_rejects_small_grid() {
        assert!(matches!(
            convergence_study(Scheme::Central, 2, 3, &PillarParameters::default()),
            Err(DiffusionError::InvalidGridSize(2))
        ));
        assert!(matches!(
            convergence_study(Scheme::Central, 5, 70, &PillarParameters::default()),
            Err(DiffusionError::GridTooLarge { .. })
        ));
    }
}
