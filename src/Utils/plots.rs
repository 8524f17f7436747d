//! PNG plots of concentration profiles and convergence studies (plotters, bitmap backend).
use crate::numerical::RadialDiffusion::FD_scheme::Scheme;
use crate::numerical::RadialDiffusion::analytical::analytical_solution;
use crate::numerical::RadialDiffusion::convergence::ConvergenceStudy;
use crate::numerical::RadialDiffusion::error::DiffusionError;
use crate::numerical::RadialDiffusion::problem::PillarParameters;
use crate::numerical::RadialDiffusion::solver::{DiffusionSolution, solve_diffusion};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const PLOT_SIZE: (u32, u32) = (1200, 750);
/// number of points of the analytical curve
const ANALYTICAL_POINTS: usize = 500;

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for DiffusionError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        DiffusionError::Plot(e.to_string())
    }
}

/// min..max widened by 5% of the span on both sides (by 1 if the span is zero)
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return 0.0..1.0;
    }
    let pad = if max > min { 0.05 * (max - min) } else { 1.0 };
    (min - pad)..(max + pad)
}

/// Range of the positive values widened to whole decades, for log axes.
/// None if there is no positive finite value.
pub fn log_range(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return None;
    }
    let lo = 10f64.powf(min.log10().floor());
    let mut hi = 10f64.powf(max.log10().ceil());
    if hi <= lo {
        hi = lo * 10.0;
    }
    Some(lo..hi)
}

/// `dir/filename`, creating `dir` if missing
fn output_path(dir: &Path, filename: &str) -> Result<PathBuf, DiffusionError> {
    std::fs::create_dir_all(dir)?;
    Ok(dir.join(filename))
}

fn analytical_curve(params: &PillarParameters) -> Vec<(f64, f64)> {
    let R = params.radius;
    (0..ANALYTICAL_POINTS)
        .map(|i| {
            let r = R * i as f64 / (ANALYTICAL_POINTS - 1) as f64;
            (r, analytical_solution(r, params))
        })
        .collect()
}

fn scheme_color(scheme: Scheme) -> RGBColor {
    match scheme {
        Scheme::Forward => RED,
        Scheme::Central => GREEN,
    }
}

/// Numerical profiles (markers) against the analytical curve on one chart.
fn draw_profiles(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    caption: &str,
    solutions: &[(Scheme, &DiffusionSolution)],
    params: &PillarParameters,
) -> Result<(), DiffusionError> {
    root.fill(&WHITE)?;
    let exact = analytical_curve(params);
    let y_range = padded_range(
        exact
            .iter()
            .map(|(_, c)| *c)
            .chain(solutions.iter().flat_map(|(_, s)| s.C.iter().copied())),
    );
    let mut chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 36))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..params.radius, y_range)?;
    chart
        .configure_mesh()
        .x_desc("r, m")
        .y_desc("C, mol/m³")
        .draw()?;

    chart
        .draw_series(LineSeries::new(exact, BLUE.stroke_width(2)))?
        .label("analytical")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    for (scheme, solution) in solutions {
        let color = scheme_color(*scheme);
        chart
            .draw_series(
                solution
                    .r
                    .iter()
                    .zip(solution.C.iter())
                    .map(|(&r, &c)| Circle::new((r, c), 5, color.filled())),
            )?
            .label(format!("{} scheme, N = {}", scheme, solution.len()))
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Plot an already computed solution against the analytical profile.
pub fn plot_solution(
    solution: &DiffusionSolution,
    scheme: Scheme,
    params: &PillarParameters,
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, DiffusionError> {
    let path = output_path(dir, filename)?;
    {
        let root = BitMapBackend::new(&path, PLOT_SIZE).into_drawing_area();
        let caption = format!("Concentration profile, {} scheme", scheme);
        draw_profiles(&root, &caption, &[(scheme, solution)], params)?;
    }
    Ok(path)
}

/// Solve on `n_points` nodes and plot the profile against the analytical one.
pub fn plot_concentration_profiles(
    n_points: usize,
    scheme: Scheme,
    params: &PillarParameters,
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, DiffusionError> {
    let solution = solve_diffusion(n_points, scheme, params)?;
    plot_solution(&solution, scheme, params, dir, filename)
}

/// Both schemes on the same grid against the analytical profile.
pub fn plot_comparison(
    n_points: usize,
    params: &PillarParameters,
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, DiffusionError> {
    let forward = solve_diffusion(n_points, Scheme::Forward, params)?;
    let central = solve_diffusion(n_points, Scheme::Central, params)?;
    let path = output_path(dir, filename)?;
    {
        let root = BitMapBackend::new(&path, PLOT_SIZE).into_drawing_area();
        draw_profiles(
            &root,
            "Forward vs central scheme",
            &[(Scheme::Forward, &forward), (Scheme::Central, &central)],
            params,
        )?;
    }
    Ok(path)
}

/// caption of the convergence plot, flags a scheme that is exact for the profile
pub fn convergence_caption(study: &ConvergenceStudy) -> String {
    if study.is_exact() {
        format!("Grid convergence, {} scheme (exact to round-off)", study.scheme)
    } else {
        format!("Grid convergence, {} scheme", study.scheme)
    }
}

/// Log-log plot of L1, L2 and L∞ errors against dr with a reference slope
/// of the theoretical order. Non-positive errors (exact to round-off) are left out.
pub fn plot_convergence(study: &ConvergenceStudy, dir: &Path, filename: &str) -> Result<PathBuf, DiffusionError> {
    let dr = study.dr();
    if dr.is_empty() {
        return Err(DiffusionError::Plot("empty convergence study".to_string()));
    }
    let norms: [(&str, Vec<f64>, RGBColor); 3] = [
        ("L1", study.errors(|n| n.L1), BLUE),
        ("L2", study.errors(|n| n.L2), RED),
        ("Linf", study.errors(|n| n.Linf), GREEN),
    ];
    let order = study.scheme.theoretical_order();
    let exact = study.is_exact();
    // reference line through the coarsest positive L2 error
    let anchor = dr
        .iter()
        .zip(norms[1].1.iter())
        .find(|(_, e)| **e > 0.0 && e.is_finite())
        .map(|(h, e)| (*h, *e));
    let reference: Vec<(f64, f64)> = match anchor {
        Some((h0, e0)) if !exact => dr.iter().map(|h| (*h, e0 * (h / h0).powf(order))).collect(),
        _ => Vec::new(),
    };

    let x_range = log_range(dr.iter().copied()).unwrap_or(1e-3..1.0);
    let y_range = log_range(
        norms
            .iter()
            .flat_map(|(_, e, _)| e.iter().copied())
            .chain(reference.iter().map(|(_, e)| *e)),
    )
    .unwrap_or(1e-16..1.0);

    let caption = convergence_caption(study);

    let path = output_path(dir, filename)?;
    {
        let root = BitMapBackend::new(&path, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 36))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range.clone().log_scale(), y_range.clone().log_scale())?;
        chart
            .configure_mesh()
            .x_desc("dr, m")
            .y_desc("error")
            .x_label_formatter(&|x: &f64| format!("{:.1e}", x))
            .y_label_formatter(&|y: &f64| format!("{:.1e}", y))
            .draw()?;

        let mut labelled = false;
        for (name, errors, color) in norms.iter() {
            let color = *color;
            let points: Vec<(f64, f64)> = dr
                .iter()
                .zip(errors.iter())
                .filter(|(_, e)| **e > 0.0 && e.is_finite())
                .map(|(h, e)| (*h, *e))
                .collect();
            if points.is_empty() {
                continue;
            }
            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
                .label(*name)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;
            labelled = true;
        }
        if exact {
            // geometric middle of the log axes
            let at = ((x_range.start * x_range.end).sqrt(), (y_range.start * y_range.end).sqrt());
            chart.draw_series(std::iter::once(Text::new(
                "all errors at round-off level: no observed order",
                at,
                ("sans-serif", 28).into_font().color(&BLACK),
            )))?;
        }
        if !reference.is_empty() {
            chart
                .draw_series(LineSeries::new(reference, BLACK.stroke_width(1)))?
                .label(format!("O(dr^{})", order))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
            labelled = true;
        }
        if labelled {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::LowerRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        root.present()?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::RadialDiffusion::convergence::convergence_study;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_padded_range() {
        let r = padded_range(vec![0.0, 10.0]);
        assert_relative_eq!(r.start, -0.5);
        assert_relative_eq!(r.end, 10.5);
        let flat = padded_range(vec![3.0, 3.0]);
        assert_relative_eq!(flat.start, 2.0);
        assert_relative_eq!(flat.end, 4.0);
        assert_eq!(padded_range(Vec::<f64>::new()), 0.0..1.0);
    }

    #[test]
    fn test_log_range() {
        let r = log_range(vec![0.003, 0.2, 0.0, -1.0]).unwrap();
        assert_relative_eq!(r.start, 1e-3, max_relative = 1e-12);
        assert_relative_eq!(r.end, 1.0, max_relative = 1e-12);
        let one = log_range(vec![1e-2]).unwrap();
        assert!(one.end > one.start);
        assert!(log_range(vec![0.0, -2.0]).is_none());
    }

    // font rendering may be unavailable on headless machines: then the error must be a Plot error
    fn check_plot_result(res: Result<PathBuf, DiffusionError>) {
        match res {
            Ok(path) => assert!(path.exists()),
            Err(e) => assert!(matches!(e, DiffusionError::Plot(_)), "unexpected error {:?}", e),
        }
    }

    #[test]
    fn test_plots_smoke() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested");
        let params = PillarParameters::default();
        check_plot_result(plot_concentration_profiles(9, Scheme::Forward, &params, &out, "c.png"));
        check_plot_result(plot_comparison(9, &params, &out, "both.png"));
        let study = convergence_study(Scheme::Forward, 5, 4, &params).unwrap();
        check_plot_result(plot_convergence(&study, &out, "conv.png"));
        assert!(out.is_dir());
    }

    #[test]
    fn test_convergence_plot_exact_scheme() {
        let params = PillarParameters::default();
        let central = convergence_study(Scheme::Central, 5, 4, &params).unwrap();
        assert_eq!(convergence_caption(&central), "Grid convergence, central scheme (exact to round-off)");
        let forward = convergence_study(Scheme::Forward, 5, 4, &params).unwrap();
        assert_eq!(convergence_caption(&forward), "Grid convergence, forward scheme");
        let dir = tempdir().unwrap();
        check_plot_result(plot_convergence(&central, dir.path(), "exact.png"));
    }
}
