use super::error::DiffusionError;
use nalgebra::DVector;

/// Uniform radial mesh r_i = i * dr, i = 0..N-1, dr = R / (N - 1).
/// Both boundary nodes are counted in N.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGrid {
    nodes: DVector<f64>,
    dr: f64,
    radius: f64,
}

impl RadialGrid {
    /// the centre condition needs three nodes, so N >= 3
    pub const MIN_POINTS: usize = 3;
    /// largest grid a study may reach
    pub const MAX_POINTS: usize = (1 << 24) + 1;

    pub fn new(n_points: usize, radius: f64) -> Result<RadialGrid, DiffusionError> {
        if n_points < Self::MIN_POINTS {
            return Err(DiffusionError::InvalidGridSize(n_points));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(DiffusionError::InvalidParameter {
                name: "radius",
                value: radius,
                reason: "must be positive and finite",
            });
        }
        let dr = radius / (n_points - 1) as f64;
        let last = n_points - 1;
        // the outer node is set to R exactly so that C(R) is evaluated where the Dirichlet row lives
        let nodes = DVector::from_fn(n_points, |i, _| if i == last { radius } else { i as f64 * dr });
        Ok(RadialGrid { nodes, dr, radius })
    }

    pub fn nodes(&self) -> &DVector<f64> {
        &self.nodes
    }

    pub fn dr(&self) -> f64 {
        self.dr
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// grid with half the spacing: N' = 2(N - 1) + 1, every old node is kept
    pub fn refined(&self) -> RadialGrid {
        let n = 2 * (self.len() - 1) + 1;
        // N >= 3 and R > 0 already hold for self
        let dr = self.radius / (n - 1) as f64;
        let last = n - 1;
        let nodes = DVector::from_fn(n, |i, _| if i == last { self.radius } else { i as f64 * dr });
        RadialGrid {
            nodes,
            dr,
            radius: self.radius,
        }
    }
}

/// Grid sizes of a refinement sequence halving dr each level: (N0 - 1) * 2^i + 1.
/// Every size must stay within `RadialGrid::MAX_POINTS`.
pub fn refinement_sizes(initial_grid_size: usize, num_refinements: usize) -> Result<Vec<usize>, DiffusionError> {
    if initial_grid_size < RadialGrid::MIN_POINTS {
        return Err(DiffusionError::InvalidGridSize(initial_grid_size));
    }
    (0..num_refinements)
        .map(|level| {
            u32::try_from(level)
                .ok()
                .and_then(|shift| 1usize.checked_shl(shift))
                .and_then(|factor| (initial_grid_size - 1).checked_mul(factor))
                .and_then(|intervals| intervals.checked_add(1))
                .filter(|n| *n <= RadialGrid::MAX_POINTS)
                .ok_or(DiffusionError::GridTooLarge {
                    initial_grid_size,
                    level,
                    max: RadialGrid::MAX_POINTS,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_nodes() {
        let g = RadialGrid::new(5, 0.5).unwrap();
        assert_eq!(g.len(), 5);
        assert_relative_eq!(g.dr(), 0.125);
        assert_eq!(g.nodes()[0], 0.0);
        assert_eq!(g.nodes()[4], 0.5);
        for i in 1..g.len() {
            assert!(g.nodes()[i] > g.nodes()[i - 1]);
        }
    }

    #[test]
    fn test_invalid_grid() {
        assert!(matches!(RadialGrid::new(2, 0.5), Err(DiffusionError::InvalidGridSize(2))));
        assert!(matches!(RadialGrid::new(0, 0.5), Err(DiffusionError::InvalidGridSize(0))));
        assert!(RadialGrid::new(5, 0.0).is_err());
        assert!(RadialGrid::new(5, f64::INFINITY).is_err());
    }

    #[test]
    fn test_refined_keeps_nodes() {
        let g = RadialGrid::new(5, 0.5).unwrap();
        let f = g.refined();
        assert_eq!(f.len(), 9);
        assert_relative_eq!(f.dr(), g.dr() / 2.0);
        for i in 0..g.len() {
            assert_relative_eq!(f.nodes()[2 * i], g.nodes()[i], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_refinement_sizes() {
        assert_eq!(refinement_sizes(5, 4).unwrap(), vec![5, 9, 17, 33]);
        assert_eq!(refinement_sizes(3, 3).unwrap(), vec![3, 5, 9]);
        assert!(refinement_sizes(5, 0).unwrap().is_empty());
    }

    #[test]
    fn test_refinement_sizes_limits() {
        assert!(matches!(refinement_sizes(0, 3), Err(DiffusionError::InvalidGridSize(0))));
        assert!(matches!(refinement_sizes(2, 3), Err(DiffusionError::InvalidGridSize(2))));
        // 4 * 2^70 overflows usize
        assert!(matches!(
            refinement_sizes(5, 70),
            Err(DiffusionError::GridTooLarge { initial_grid_size: 5, .. })
        ));
        // 4 * 2^22 + 1 is the largest allowed size from N0 = 5
        let sizes = refinement_sizes(5, 23).unwrap();
        assert_eq!(sizes.last(), Some(&RadialGrid::MAX_POINTS));
        assert!(matches!(
            refinement_sizes(5, 24),
            Err(DiffusionError::GridTooLarge { level: 23, .. })
        ));
    }
}
