use crate::math::geometry::{distance, Point};

/// Squared distance error of `point` against the measured magnitudes.
///
/// One term compares the distance to the star point N with `u_nn`, the other
/// three compare the distances to L1..L3 with the per-phase voltages.
pub fn residual(point: Point, triangle: &[Point; 3], u_nn: f64, u_values: &[f64; 3]) -> f64 {
    let neutral_error = (distance(point, Point::ORIGIN) - u_nn).abs();
    let vertex_errors: f64 = triangle
        .iter()
        .zip(u_values)
        .map(|(&vertex, &target)| {
            let error = (distance(point, vertex) - target).abs();
            error * error
        })
        .sum();
    neutral_error * neutral_error + vertex_errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::triangle_vertices;

    #[test]
    fn exact_distances_give_zero_residual() {
        let triangle = triangle_vertices(10.0);
        let point = Point::new(2.0, 1.0);
        let u_nn = distance(point, Point::ORIGIN);
        let u_values = triangle.map(|vertex| distance(point, vertex));
        assert!(residual(point, &triangle, u_nn, &u_values) < 1e-20);
    }

    #[test]
    fn residual_sums_squared_errors() {
        let triangle = triangle_vertices(10.0);
        // At the origin every vertex is 10 away.
        let value = residual(Point::ORIGIN, &triangle, 1.0, &[12.0, 10.0, 7.0]);
        assert!((value - (1.0 + 4.0 + 0.0 + 9.0)).abs() < 1e-9);
    }
}
