use crate::math::geometry::Point;
use crate::render::bounds::Bounds;

/// Pixel rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn inset(&self, padding: f64) -> Self {
        Self::new(
            self.x + padding,
            self.y + padding,
            (self.width - 2.0 * padding).max(0.0),
            (self.height - 2.0 * padding).max(0.0),
        )
    }
}

/// Maps diagram coordinates into a pixel rectangle with one scale for both
/// axes, centring the view and flipping Y so positive values point up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    view: Bounds,
    scale: f64,
    left: f64,
    top: f64,
}

impl Viewport {
    pub fn fit(view: Bounds, area: Rect) -> Self {
        let scale = (area.width / view.width()).min(area.height / view.height());
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            view,
            scale,
            left: area.x + (area.width - view.width() * scale) / 2.0,
            top: area.y + (area.height - view.height() * scale) / 2.0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_screen(&self, point: Point) -> (f64, f64) {
        (
            self.left + (point.x - self.view.min_x) * self.scale,
            self.top + (self.view.max_y - point.y) * self.scale,
        )
    }

    /// Pixel rectangle actually covered by the view.
    pub fn plot_area(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.view.width() * self.scale,
            self.view.height() * self.scale,
        )
    }
}
