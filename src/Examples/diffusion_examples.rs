#![allow(non_snake_case)]
use crate::Utils::logger::init_logger;
use crate::Utils::plots::{plot_comparison, plot_convergence, plot_solution};
use crate::numerical::RadialDiffusion::FD_scheme::{Scheme, assemble_system};
use crate::numerical::RadialDiffusion::analytical::{analytical_profile, centre_concentration};
use crate::numerical::RadialDiffusion::convergence::{compute_error_norms, convergence_study, convergence_study_with};
use crate::numerical::RadialDiffusion::error::DiffusionError;
use crate::numerical::RadialDiffusion::grid::RadialGrid;
use crate::numerical::RadialDiffusion::problem::PillarParameters;
use crate::numerical::RadialDiffusion::solver::{RadialDiffusionSolver, solve_diffusion_with};
use crate::numerical::RadialDiffusion::task_config::TaskConfig;
use crate::somelinalg::linear_sys_diagnostics::linear_system_diagnostics;
use crate::somelinalg::linear_sys_solvers_depot::LinearSolverKind;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use strum::IntoEnumIterator;

/// Run every study of a task: for each scheme the concentration profile and the grid
/// convergence study (table in the log, plots in `results_dir`), then both schemes on one chart.
/// Returns the paths of the written images.
pub fn run_studies(cfg: &TaskConfig) -> Result<Vec<PathBuf>, DiffusionError> {
    std::fs::create_dir_all(&cfg.results_dir)?;
    init_logger(&cfg.loglevel, cfg.log_dir())?;
    let params = &cfg.params;
    let dir = cfg.results_dir.as_path();
    info!(
        "pillar: S = {:e}, k = {}, D_eff = {:e}, R = {}, Ce = {}; analytical C(0) = {:.6}",
        params.source,
        params.source_exponent,
        params.diffusivity,
        params.radius,
        params.outer_concentration,
        centre_concentration(params)
    );
    let mut written = Vec::new();
    for &scheme in &cfg.schemes {
        let mut solver = RadialDiffusionSolver::new(*params, scheme, cfg.profile_points);
        solver.set_linear_solver(cfg.linear_solver);
        let solution = solver.solve()?;
        written.push(plot_solution(
            &solution,
            scheme,
            params,
            dir,
            &format!("concentration_{}.png", scheme),
        )?);

        let study = convergence_study_with(
            scheme,
            cfg.initial_grid_size,
            cfg.refinements,
            params,
            cfg.linear_solver,
        )?;
        study.log_table();
        match study.final_order() {
            (_, Some(order), _) => info!(
                "{} scheme: observed order (L2) {:.4}, theoretical {}",
                scheme,
                order,
                scheme.theoretical_order()
            ),
            _ => info!(
                "{} scheme: errors are at round-off level, the scheme is exact for this profile",
                scheme
            ),
        }
        written.push(plot_convergence(&study, dir, &format!("convergence_{}.png", scheme))?);
    }
    written.push(plot_comparison(
        cfg.profile_points,
        params,
        dir,
        "comparison_both_schemes.png",
    )?);
    for path in &written {
        info!("saved {}", path.display());
    }
    Ok(written)
}

fn report(res: Result<(), DiffusionError>) {
    match res {
        Ok(()) => {}
        Err(e) if e.is_numerical() => error!("numerical failure: {}", e),
        Err(e) => error!("{}", e),
    }
}

pub fn diffusion_examples(example: usize) {
    match example {
        0 => {
            // all studies with the default parameters, images go to results/
            report(run_studies(&TaskConfig::default()).map(|_| ()));
        }
        1 => {
            // one solve with the stateful solver, statistics and a plot
            let res = (|| -> Result<(), DiffusionError> {
                let params = PillarParameters::default();
                let mut solver = RadialDiffusionSolver::new(params, Scheme::Central, 33);
                solver.set_loglevel(Some("info".to_string()));
                let solution = solver.solve()?;
                info!(
                    "C(0): numerical {:.6}, analytical {:.6}",
                    solution.C[0],
                    centre_concentration(&params)
                );
                let path = solver.plot_result(Path::new("results"))?;
                info!("plot saved to {}", path.display());
                Ok(())
            })();
            report(res);
        }
        2 => {
            // forward scheme: first order convergence
            let res = (|| -> Result<(), DiffusionError> {
                init_logger("info", None)?;
                let study = convergence_study(Scheme::Forward, 5, 8, &PillarParameters::default())?;
                study.log_table();
                info!("final orders (L1, L2, Linf): {:?}", study.final_order());
                Ok(())
            })();
            report(res);
        }
        3 => {
            // manufactured profile with source S r^2: the central scheme shows its second order
            let res = (|| -> Result<(), DiffusionError> {
                init_logger("info", None)?;
                let params = PillarParameters::default().with_source_exponent(2.0);
                for scheme in Scheme::iter() {
                    let study = convergence_study(scheme, 5, 8, &params)?;
                    study.log_table();
                }
                Ok(())
            })();
            report(res);
        }
        4 => {
            // linear solvers on a fine grid: same answer, different cost
            let res = (|| -> Result<(), DiffusionError> {
                init_logger("info", None)?;
                let params = PillarParameters::default();
                let n = 1025;
                for method in LinearSolverKind::iter() {
                    let begin = Instant::now();
                    let solution = solve_diffusion_with(n, Scheme::Central, &params, method)?;
                    let exact = analytical_profile(&solution.r, &params);
                    let norms = compute_error_norms(&solution.C, &exact)?;
                    info!(
                        "{}: {:.3} ms, Linf error {:.3e}",
                        method,
                        begin.elapsed().as_secs_f64() * 1e3,
                        norms.Linf
                    );
                }
                Ok(())
            })();
            report(res);
        }
        5 => {
            // task document from a string
            let task = "
                # thinner pillar, higher outer concentration
                physics
                radius: 0.25
                outer_concentration: 40.0
                study
                schemes: forward, central
                refinements: 5
                output
                results_dir: results_thin
                loglevel: info
            ";
            let res = TaskConfig::from_str(task).and_then(|cfg| run_studies(&cfg).map(|_| ()));
            report(res);
        }
        6 => {
            // rank and conditioning of the assembled system
            let res = (|| -> Result<(), DiffusionError> {
                init_logger("info", None)?;
                let params = PillarParameters::default();
                let grid = RadialGrid::new(65, params.radius)?;
                let system = assemble_system(&grid, Scheme::Forward, &params);
                let diagnostics = linear_system_diagnostics(&system.to_dense(), &system.rhs, 1e12);
                if !diagnostics.solvable {
                    warn!("system is not solvable");
                }
                Ok(())
            })();
            report(res);
        }
        _ => {
            warn!("no example with number {}", example);
        }
    }
}
