use crate::math::geometry::Point;

/// Axis-aligned view rectangle in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Bounding box of the finite entries of `points`.
    pub fn around(points: &[Point]) -> Option<Self> {
        points
            .iter()
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<Bounds>, p| {
                Some(match acc {
                    None => Bounds::new(p.x, p.x, p.y, p.y),
                    Some(b) => Bounds::new(
                        b.min_x.min(p.x),
                        b.max_x.max(p.x),
                        b.min_y.min(p.y),
                        b.max_y.max(p.y),
                    ),
                })
            })
    }

    /// Grows each side by `fraction` of the span along that axis.
    ///
    /// A degenerate axis is first widened to ±1 around its centre.
    pub fn with_margin(self, fraction: f64) -> Self {
        let (min_x, max_x) = widen_axis(self.min_x, self.max_x, fraction);
        let (min_y, max_y) = widen_axis(self.min_y, self.max_y, fraction);
        Self::new(min_x, max_x, min_y, max_y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

fn widen_axis(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let (min, max) = if max - min > 0.0 {
        (min, max)
    } else {
        let centre = (min + max) / 2.0;
        (centre - 1.0, centre + 1.0)
    };
    let pad = (max - min) * fraction;
    (min - pad, max + pad)
}

/// Endpoint of an arrow after fitting it into the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowClip {
    pub end: Point,
    /// Uniform shortening factor that was applied, `1.0` when untouched.
    pub factor: f64,
    pub clipped: bool,
}

/// Shortens the arrow `origin -> origin + (dx, dy)` so its tip stays inside `view`.
///
/// The factor is the largest value ≤ 1 that keeps both coordinates of the tip
/// within the view; it never goes below zero, so an origin outside the view
/// collapses the arrow rather than flipping it.
pub fn clip_arrow(origin: Point, dx: f64, dy: f64, view: &Bounds) -> ArrowClip {
    let mut factor = f64::INFINITY;
    if dx != 0.0 {
        let limit = if dx > 0.0 { view.max_x } else { view.min_x };
        factor = factor.min((limit - origin.x) / dx);
    }
    if dy != 0.0 {
        let limit = if dy > 0.0 { view.max_y } else { view.min_y };
        factor = factor.min((limit - origin.y) / dy);
    }

    if factor < 1.0 {
        let factor = factor.max(0.0);
        ArrowClip {
            end: origin.offset(dx * factor, dy * factor),
            factor,
            clipped: true,
        }
    } else {
        ArrowClip {
            end: origin.offset(dx, dy),
            factor: 1.0,
            clipped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Bounds {
        Bounds::new(-10.0, 10.0, -10.0, 10.0)
    }

    #[test]
    fn long_arrow_is_clipped_onto_the_boundary() {
        let clip = clip_arrow(Point::ORIGIN, 20.0, 0.0, &square());
        assert!(clip.clipped);
        assert_eq!(clip.end, Point::new(10.0, 0.0));
        assert_eq!(clip.factor, 0.5);
    }

    #[test]
    fn short_arrow_is_untouched() {
        let clip = clip_arrow(Point::ORIGIN, 5.0, 5.0, &square());
        assert!(!clip.clipped);
        assert_eq!(clip.end, Point::new(5.0, 5.0));
    }

    #[test]
    fn diagonal_arrow_is_shortened_uniformly() {
        let clip = clip_arrow(Point::new(2.0, 0.0), -4.0, -30.0, &square());
        assert!(clip.clipped);
        assert!((clip.end.y + 10.0).abs() < 1e-12);
        assert!((clip.end.x - (2.0 - 4.0 / 3.0)).abs() < 1e-12);
        assert!(square().contains(clip.end));
    }

    #[test]
    fn zero_arrow_is_untouched() {
        let clip = clip_arrow(Point::new(1.0, 1.0), 0.0, 0.0, &square());
        assert!(!clip.clipped);
        assert_eq!(clip.end, Point::new(1.0, 1.0));
    }

    #[test]
    fn margin_grows_each_side_by_span_fraction() {
        let bounds = Bounds::new(-25.0, 50.0, -40.0, 40.0).with_margin(0.1);
        assert!((bounds.min_x + 32.5).abs() < 1e-12);
        assert!((bounds.max_x - 57.5).abs() < 1e-12);
        assert!((bounds.min_y + 48.0).abs() < 1e-12);
        assert!((bounds.max_y - 48.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_bounds_are_widened() {
        let bounds = Bounds::around(&[Point::new(3.0, 3.0)])
            .unwrap()
            .with_margin(0.0);
        assert_eq!(bounds, Bounds::new(2.0, 4.0, 2.0, 4.0));
        assert!(Bounds::around(&[]).is_none());
    }
}
