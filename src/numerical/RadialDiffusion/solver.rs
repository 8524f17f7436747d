//! Finite difference solver for the steady radial diffusion problem.
//!
//! Example
//! ```rust, ignore
//! use RadialDiffusion::numerical::RadialDiffusion::{FD_scheme::Scheme, problem::PillarParameters,
//!     solver::RadialDiffusionSolver};
//! let mut solver = RadialDiffusionSolver::new(PillarParameters::default(), Scheme::Central, 33);
//! solver.set_loglevel(Some("info".to_string()));
//! let solution = solver.solve().unwrap();
//! println!("C(0) = {}", solution.C[0]);
//! ```
use super::FD_scheme::{DiscreteSystem, Scheme, assemble_system};
use super::error::DiffusionError;
use super::grid::RadialGrid;
use super::problem::PillarParameters;
use crate::Utils::logger::init_logger;
use crate::Utils::plots::plot_solution;
use crate::somelinalg::linear_sys_diagnostics::linear_system_diagnostics;
use crate::somelinalg::linear_sys_solvers_depot::{LinearSolverKind, nalgebra_solvers_depot};
use log::{debug, info, warn};
use nalgebra::DVector;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// condition number above which a failed system is reported as poorly conditioned
const CONDITION_THRESHOLD: f64 = 1e12;

/// radial nodes and concentration values
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionSolution {
    pub r: DVector<f64>,
    pub C: DVector<f64>,
}

impl DiffusionSolution {
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn dr(&self) -> f64 {
        self.r[1] - self.r[0]
    }
}

/// Solve the pillar problem on a grid of `n_points` nodes with the default (Thomas) solver.
pub fn solve_diffusion(
    n_points: usize,
    scheme: Scheme,
    params: &PillarParameters,
) -> Result<DiffusionSolution, DiffusionError> {
    solve_diffusion_with(n_points, scheme, params, LinearSolverKind::default())
}

/// same as `solve_diffusion` with a chosen linear solver
pub fn solve_diffusion_with(
    n_points: usize,
    scheme: Scheme,
    params: &PillarParameters,
    linear_solver: LinearSolverKind,
) -> Result<DiffusionSolution, DiffusionError> {
    let mut solver = RadialDiffusionSolver::new(*params, scheme, n_points);
    solver.set_linear_solver(linear_solver);
    solver.solver()
}

pub struct RadialDiffusionSolver {
    pub params: PillarParameters,
    pub scheme: Scheme,
    pub n_points: usize,
    pub linear_solver: LinearSolverKind,
    pub loglevel: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub calc_statistics: HashMap<String, String>,
    result: Option<DiffusionSolution>,
}

impl RadialDiffusionSolver {
    pub fn new(params: PillarParameters, scheme: Scheme, n_points: usize) -> RadialDiffusionSolver {
        RadialDiffusionSolver {
            params,
            scheme,
            n_points,
            linear_solver: LinearSolverKind::default(),
            loglevel: None,
            log_dir: None,
            calc_statistics: HashMap::new(),
            result: None,
        }
    }

    pub fn set_linear_solver(&mut self, linear_solver: LinearSolverKind) {
        self.linear_solver = linear_solver;
    }

    /// "debug", "info", "warn", "error" or "off"; None leaves the global logger untouched
    pub fn set_loglevel(&mut self, loglevel: Option<String>) {
        self.loglevel = loglevel;
    }

    /// also write the log into a timestamped file inside `dir`
    pub fn set_log_dir(&mut self, dir: Option<PathBuf>) {
        self.log_dir = dir;
    }

    /// core of the solver: assemble, solve, check
    pub fn solver(&mut self) -> Result<DiffusionSolution, DiffusionError> {
        let begin = Instant::now();
        self.params.validate()?;
        let grid = RadialGrid::new(self.n_points, self.params.radius)?;
        info!(
            "solving radial diffusion: scheme = {}, N = {}, dr = {:.4e}, linear solver = {}",
            self.scheme,
            grid.len(),
            grid.dr(),
            self.linear_solver
        );
        let system = assemble_system(&grid, self.scheme, &self.params);
        let C = self.solve_linear_system(&system)?;
        if let Some(i) = C.iter().position(|c| !c.is_finite()) {
            return Err(DiffusionError::NonFiniteSolution(i));
        }
        let n = C.len();
        if C[n - 1] != self.params.outer_concentration {
            warn!(
                "boundary value C(R) = {} differs from Ce = {}",
                C[n - 1],
                self.params.outer_concentration
            );
        }
        let residual = system.residual(&C).amax();
        debug!("max residual of the discrete system: {:.3e}", residual);

        self.calc_statistics.insert("scheme".to_string(), self.scheme.to_string());
        self.calc_statistics.insert("number of nodes".to_string(), n.to_string());
        self.calc_statistics.insert("dr".to_string(), format!("{:.4e}", grid.dr()));
        self.calc_statistics
            .insert("linear solver".to_string(), self.linear_solver.to_string());
        self.calc_statistics
            .insert("max residual".to_string(), format!("{:.3e}", residual));
        self.calc_statistics.insert(
            "time elapsed, ms".to_string(),
            format!("{:.3}", begin.elapsed().as_secs_f64() * 1e3),
        );

        let solution = DiffusionSolution {
            r: grid.nodes().clone(),
            C,
        };
        self.result = Some(solution.clone());
        Ok(solution)
    }

    /// wrapper around the solver function to set up logging and print statistics
    pub fn solve(&mut self) -> Result<DiffusionSolution, DiffusionError> {
        if let Some(level) = self.loglevel.clone() {
            if !init_logger(&level, self.log_dir.as_deref())? {
                debug!("logger already initialised, keeping it");
            }
        }
        let res = self.solver()?;
        self.calc_statistics();
        Ok(res)
    }

    fn solve_linear_system(&self, system: &DiscreteSystem) -> Result<DVector<f64>, DiffusionError> {
        let res = match self.linear_solver {
            LinearSolverKind::Thomas => {
                let (tri, rhs) = system.reduce_to_tridiagonal()?;
                tri.solve(&rhs).map_err(DiffusionError::from)
            }
            method => nalgebra_solvers_depot(&system.to_dense(), &system.rhs, method, system.bandwidth())
                .map_err(DiffusionError::from),
        };
        if let Err(ref e) = res {
            warn!("linear solve failed: {}", e);
            linear_system_diagnostics(&system.to_dense(), &system.rhs, CONDITION_THRESHOLD);
        }
        res
    }

    pub fn get_result(&self) -> Option<&DiffusionSolution> {
        self.result.as_ref()
    }

    pub fn calc_statistics(&self) -> HashMap<String, String> {
        let stats = self.calc_statistics.clone();
        let mut table = Builder::from(stats.clone()).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table);
        stats
    }

    /// plot the numerical profile against the analytical one into `dir`
    pub fn plot_result(&self, dir: &Path) -> Result<PathBuf, DiffusionError> {
        let solution = self
            .result
            .as_ref()
            .ok_or_else(|| DiffusionError::Plot("nothing to plot: call solve() first".to_string()))?;
        let filename = format!("concentration_{}_N{}.png", self.scheme, solution.len());
        let path = plot_solution(solution, self.scheme, &self.params, dir, &filename)?;
        info!("result plotted into {}", path.display());
        Ok(path)
    }
}
