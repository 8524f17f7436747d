use log::{info, warn};
use nalgebra::{DMatrix, DVector, stack};
use tabled::{builder::Builder, settings::Style};

/// Rouché–Capelli theorem: the system Ax = b has a solution if and only if
/// rank(A) == rank([A b]).
pub fn Rouche_Capelli_theorem(A: &DMatrix<f64>, b: &DVector<f64>) -> bool {
    let Ab: DMatrix<f64> = stack![A, b];
    // rank tolerance scaled by the largest entry
    let eps = f64::EPSILON * A.amax().max(1.0) * A.nrows() as f64;
    let rank_A = A.rank(eps);
    let rank_Ab = Ab.rank(eps);
    let result = rank_A == rank_Ab;
    if !result {
        warn!(
            "The system has no solution. rank(A) = {} != rank([A b]) = {}",
            rank_A, rank_Ab
        );
    }
    result
}

/// Condition number as ratio of the largest to the smallest singular value.
/// Returns `f64::INFINITY` for an exactly singular matrix.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        f64::INFINITY
    } else {
        max_sigma / min_sigma
    }
}

pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let cond = condition_number(A);
    let poorly_conditioned = cond > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2e}",
            cond
        );
    }
    poorly_conditioned
}

/// summary of the checks run on a system that failed to solve
#[derive(Debug, Clone, PartialEq)]
pub struct SystemDiagnostics {
    pub solvable: bool,
    pub condition_number: f64,
    pub poorly_conditioned: bool,
}

/// Check solvability (Rouché–Capelli) and conditioning, log the findings as a table.
pub fn linear_system_diagnostics(A: &DMatrix<f64>, b: &DVector<f64>, threshold: f64) -> SystemDiagnostics {
    let solvable = Rouche_Capelli_theorem(A, b);
    let cond = condition_number(A);
    let diagnostics = SystemDiagnostics {
        solvable,
        condition_number: cond,
        poorly_conditioned: cond > threshold,
    };
    let mut builder = Builder::default();
    let rows = [
        ("check", "value".to_string()),
        ("size", format!("{}x{}", A.nrows(), A.ncols())),
        ("solvable", solvable.to_string()),
        ("condition number", format!("{:.3e}", cond)),
        ("threshold", format!("{:.3e}", threshold)),
    ];
    for (key, value) in rows {
        builder.push_record([key.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    if diagnostics.solvable && !diagnostics.poorly_conditioned {
        info!("\n LINEAR SYSTEM DIAGNOSTICS \n{}", table);
    } else {
        warn!("\n LINEAR SYSTEM DIAGNOSTICS \n{}", table);
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    /// famous example of ill-conditioned matrix
    fn hilbert_matrix(n: usize) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |i, j| 1.0 / (i as f64 + j as f64 + 1.0))
    }

    #[test]
    fn test_Rouche_Capelli_theorem() {
        // example https://en.wikipedia.org/wiki/Rouché–Capelli_theorem
        let A = DMatrix::from_vec(3, 3, vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 2.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![3.0, 1.0, 5.0]);
        assert!(!Rouche_Capelli_theorem(&A, &b));
        let b_consistent = &A * DVector::from_vec(vec![1.0, 1.0, 1.0]);
        assert!(Rouche_Capelli_theorem(&A, &b_consistent));
    }

    #[test]
    fn test_poorly_conditioned_hilbert() {
        let A = hilbert_matrix(6);
        assert!(poorly_conditioned(&A, 1e5));
        assert!(!poorly_conditioned(&DMatrix::identity(6, 6), 1e5));
    }

    #[test]
    fn test_diagnostics_identity() {
        let A = DMatrix::identity(4, 4);
        let b = DVector::from_element(4, 1.0);
        let d = linear_system_diagnostics(&A, &b, 1e8);
        assert!(d.solvable);
        assert!(!d.poorly_conditioned);
        assert!((d.condition_number - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diagnostics_singular() {
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 0.0]);
        let d = linear_system_diagnostics(&A, &b, 1e8);
        assert!(!d.solvable);
        assert!(d.poorly_conditioned);
    }
}
