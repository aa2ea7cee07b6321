use crate::math::geometry::{centroid, Point};
use crate::math::powell::{minimize, PowellOptions};
use crate::solver::residual::residual;
use crate::telemetry::log::LogManager;
use ndarray::{array, ArrayView1};

/// Position of the neutral as used by the diagram.
///
/// `NotDisplaced` always stands for the star point N at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NeutralPoint {
    Displaced(Point),
    NotDisplaced,
}

impl NeutralPoint {
    pub fn position(&self) -> Point {
        match self {
            NeutralPoint::Displaced(point) => *point,
            NeutralPoint::NotDisplaced => Point::ORIGIN,
        }
    }

    pub fn is_displaced(&self) -> bool {
        matches!(self, NeutralPoint::Displaced(_))
    }
}

/// Outcome of one solver run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarPointSolution {
    pub point: Point,
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Neutral point of a scenario together with the solver run that produced it, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutralPointEstimate {
    pub neutral: NeutralPoint,
    pub solution: Option<StarPointSolution>,
}

impl NeutralPointEstimate {
    pub fn used_fallback(&self) -> bool {
        self.solution
            .map(|solution| !solution.converged)
            .unwrap_or(false)
    }
}

/// Displacement magnitude to solve for: `None` for absent, zero or non-finite `U_NN`.
pub fn displacement_magnitude(u_nn: Option<f64>) -> Option<f64> {
    u_nn.filter(|value| value.is_finite() && *value != 0.0)
}

/// Locates the displaced neutral N' from measured magnitudes.
pub struct StarPointSolver {
    options: PowellOptions,
    logger: LogManager,
}

impl StarPointSolver {
    pub fn new() -> Self {
        Self::with_options(PowellOptions::default())
    }

    pub fn with_options(options: PowellOptions) -> Self {
        Self {
            options,
            logger: LogManager::new("star-point"),
        }
    }

    /// Minimizes the residual starting at the triangle centroid.
    ///
    /// When the minimizer does not converge the centroid itself is returned with
    /// `converged == false`.
    pub fn solve(
        &self,
        triangle: &[Point; 3],
        u_nn: f64,
        u_values: &[f64; 3],
    ) -> StarPointSolution {
        let start = centroid(triangle);
        let objective =
            |p: ArrayView1<f64>| residual(Point::new(p[0], p[1]), triangle, u_nn, u_values);
        let minimum = minimize(objective, array![start.x, start.y], &self.options);

        if !minimum.converged {
            self.logger.warn(&format!(
                "optimization unsuccessful after {} iterations, falling back to centroid ({:.3}, {:.3})",
                minimum.iterations, start.x, start.y
            ));
            return StarPointSolution {
                point: start,
                residual: residual(start, triangle, u_nn, u_values),
                iterations: minimum.iterations,
                converged: false,
            };
        }

        let point = Point::new(minimum.point[0], minimum.point[1]);
        self.logger.record(&format!(
            "N' at ({:.3}, {:.3}) residual {:.4e} after {} iterations",
            point.x, point.y, minimum.value, minimum.iterations
        ));
        StarPointSolution {
            point,
            residual: minimum.value,
            iterations: minimum.iterations,
            converged: true,
        }
    }

    /// Applies the displacement policy: the solver only runs for a usable `U_NN`.
    pub fn locate(
        &self,
        triangle: &[Point; 3],
        u_nn: Option<f64>,
        u_values: &[f64; 3],
    ) -> NeutralPointEstimate {
        match displacement_magnitude(u_nn) {
            Some(magnitude) => {
                let solution = self.solve(triangle, magnitude, u_values);
                NeutralPointEstimate {
                    neutral: NeutralPoint::Displaced(solution.point),
                    solution: Some(solution),
                }
            }
            None => NeutralPointEstimate {
                neutral: NeutralPoint::NotDisplaced,
                solution: None,
            },
        }
    }
}

impl Default for StarPointSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::{distance, triangle_vertices};

    #[test]
    fn zero_or_absent_unn_is_not_displaced() {
        let solver = StarPointSolver::new();
        let triangle = triangle_vertices(50.0);
        let voltages = [10.0, 300.0, 42.0];
        for u_nn in [None, Some(0.0), Some(f64::NAN)] {
            let estimate = solver.locate(&triangle, u_nn, &voltages);
            assert_eq!(estimate.neutral, NeutralPoint::NotDisplaced);
            assert_eq!(estimate.neutral.position(), Point::ORIGIN);
            assert!(!estimate.neutral.is_displaced());
            assert!(estimate.solution.is_none());
        }
    }

    #[test]
    fn solver_recovers_consistent_neutral_point() {
        let solver = StarPointSolver::new();
        let triangle = triangle_vertices(50.0);
        let target = Point::new(6.0, -4.0);
        let u_nn = distance(target, Point::ORIGIN);
        let voltages = triangle.map(|vertex| distance(target, vertex));

        let estimate = solver.locate(&triangle, Some(u_nn), &voltages);
        let solution = estimate.solution.unwrap();
        assert!(solution.converged);
        assert!(!estimate.used_fallback());
        let found = estimate.neutral.position();
        assert!(distance(found, target) < 5e-2, "found {:?}", found);
    }

    #[test]
    fn pathological_targets_fall_back_to_centroid() {
        let solver = StarPointSolver::new();
        let triangle = triangle_vertices(50.0);
        let estimate = solver.locate(&triangle, Some(1e200), &[1e200, -1e200, 1e200]);

        assert!(estimate.used_fallback());
        assert_eq!(estimate.neutral, NeutralPoint::Displaced(centroid(&triangle)));
    }

    #[test]
    fn iteration_cap_falls_back_to_centroid() {
        let solver = StarPointSolver::with_options(PowellOptions {
            max_iterations: 0,
            ..Default::default()
        });
        let triangle = triangle_vertices(50.0);
        let solution = solver.solve(&triangle, 5.0, &[45.0, 52.0, 55.0]);
        assert!(!solution.converged);
        assert_eq!(solution.point, centroid(&triangle));
    }
}
