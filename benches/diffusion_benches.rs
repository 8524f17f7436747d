use RadialDiffusion::numerical::RadialDiffusion::FD_scheme::Scheme;
use RadialDiffusion::numerical::RadialDiffusion::convergence::convergence_study;
use RadialDiffusion::numerical::RadialDiffusion::problem::PillarParameters;
use RadialDiffusion::numerical::RadialDiffusion::solver::solve_diffusion_with;
use RadialDiffusion::somelinalg::linear_sys_solvers_depot::LinearSolverKind;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use strum::IntoEnumIterator;

fn bench_linear_solvers(c: &mut Criterion) {
    let params = PillarParameters::default();
    let mut group = c.benchmark_group("linear solvers, central scheme");
    for n in [65usize, 257] {
        for method in LinearSolverKind::iter() {
            group.bench_with_input(BenchmarkId::new(method.to_string(), n), &n, |b, &n| {
                b.iter(|| solve_diffusion_with(black_box(n), Scheme::Central, &params, method))
            });
        }
    }
    group.finish();
}

fn bench_convergence_study(c: &mut Criterion) {
    let params = PillarParameters::default();
    c.bench_function("convergence study, forward, 8 levels", |b| {
        b.iter(|| convergence_study(Scheme::Forward, black_box(5), 8, &params))
    });
}

criterion_group!(benches, bench_linear_solvers, bench_convergence_study);
criterion_main!(benches);
