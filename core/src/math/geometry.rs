use serde::{Deserialize, Serialize};

/// Offsets of L1, L2 and L3 on the supply triangle, counter-clockwise.
pub const PHASE_OFFSETS_DEG: [f64; 3] = [0.0, 120.0, 240.0];

/// Point in the diagram plane. The star point N sits at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `magnitude` along the direction `degrees`.
    pub fn from_polar(magnitude: f64, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        Self {
            x: magnitude * radians.cos(),
            y: magnitude * radians.sin(),
        }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Direction from `from` to `to` in degrees, as `atan2(dy, dx)`.
pub fn angle_between(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Vertices L1, L2, L3 of the supply triangle at radius `amplitude`.
///
/// Non-positive amplitudes are not rejected; they collapse the triangle onto
/// the origin or mirror it through it.
pub fn triangle_vertices(amplitude: f64) -> [Point; 3] {
    PHASE_OFFSETS_DEG.map(|offset| Point::from_polar(amplitude, offset))
}

/// Arithmetic mean of `points`, the origin for an empty slice.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ORIGIN;
    }
    let count = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sum_x / count, sum_y / count)
}
