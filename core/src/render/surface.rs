use crate::math::geometry::Point;
use crate::render::bounds::Bounds;
use crate::render::style::{Color, MarkerStyle, Stroke, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum LegendGlyph {
    Marker(Color),
    Line(Stroke),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub glyph: LegendGlyph,
    pub label: String,
}

impl LegendEntry {
    pub fn marker(color: Color, label: impl Into<String>) -> Self {
        Self {
            glyph: LegendGlyph::Marker(color),
            label: label.into(),
        }
    }

    pub fn line(stroke: Stroke, label: impl Into<String>) -> Self {
        Self {
            glyph: LegendGlyph::Line(stroke),
            label: label.into(),
        }
    }
}

/// Output sink of the rendering engine, in diagram coordinates.
///
/// Backends map the view set by [`DrawingSurface::set_view`] onto their pixel
/// area with equal scale on both axes.
pub trait DrawingSurface {
    /// Drops everything drawn so far, including the view and legend.
    fn clear(&mut self);
    fn set_view(&mut self, view: Bounds);
    fn marker(&mut self, at: Point, style: MarkerStyle);
    /// Closed outline through `points`.
    fn polygon(&mut self, points: &[Point], stroke: Stroke);
    fn arrow(&mut self, from: Point, to: Point, stroke: Stroke);
    fn label(&mut self, at: Point, text: &str, style: TextStyle);
    fn legend(&mut self, entries: &[LegendEntry], font_size: f64);
}
