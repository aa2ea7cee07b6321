//! SVG backend. A document holds one or more panels, each drawn through the
//! [`DrawingSurface`] trait into its own group and pixel rectangle.

use crate::math::geometry::Point;
use crate::render::bounds::Bounds;
use crate::render::display_list::DisplayList;
use crate::render::style::{palette, HAlign, LineStyle, MarkerStyle, Stroke, TextStyle, VAlign};
use crate::render::surface::{DrawingSurface, LegendEntry, LegendGlyph};
use crate::render::viewport::{Rect, Viewport};
use svg::node::element::{Circle, Group, Line, Polygon, Rectangle, Text};
use svg::node::Node;
use svg::Document;

const FONT_FAMILY: &str = "DejaVu Sans, Arial, sans-serif";
const DASH_PATTERN: &str = "6,4";
const PLOT_PADDING: f64 = 16.0;
const TITLE_HEIGHT: f64 = 28.0;
const ARROW_HEAD_LENGTH: f64 = 10.0;

/// Pixel coordinates keep two decimals.
fn px(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn stroke_attributes(stroke: &Stroke) -> Vec<(&'static str, String)> {
    let mut attributes = vec![
        ("stroke", stroke.color.to_hex()),
        ("stroke-width", px(stroke.width).to_string()),
    ];
    if stroke.style == LineStyle::Dashed {
        attributes.push(("stroke-dasharray", DASH_PATTERN.to_string()));
    }
    attributes
}

fn points_attribute(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{},{}", px(*x), px(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct SvgDocument {
    width: f64,
    height: f64,
    groups: Vec<Group>,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            groups: Vec::new(),
        }
    }

    /// Surface drawing into `area` of this document.
    pub fn surface(&mut self, area: Rect) -> SvgPanel<'_> {
        let index = self.groups.len();
        self.groups.push(Group::new());
        SvgPanel::new(&mut self.groups[index], area)
    }

    /// Writes a recorded diagram into `area`, with an optional title above it.
    pub fn panel(&mut self, area: Rect, list: &DisplayList, title: Option<&str>) {
        let mut plot = area;
        if let Some(title) = title {
            let heading = Text::new(title)
                .set("x", px(area.x + area.width / 2.0))
                .set("y", px(area.y + 6.0))
                .set("font-family", FONT_FAMILY)
                .set("font-size", 16)
                .set("font-weight", 600)
                .set("text-anchor", "middle")
                .set("dominant-baseline", "hanging");
            self.groups.push(Group::new().add(heading));
            plot = Rect::new(
                area.x,
                area.y + TITLE_HEIGHT,
                area.width,
                (area.height - TITLE_HEIGHT).max(0.0),
            );
        }
        list.replay(&mut self.surface(plot));
    }

    pub fn finish(self) -> String {
        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", "#ffffff");
        let document = self.groups.into_iter().fold(
            Document::new()
                .set("width", px(self.width))
                .set("height", px(self.height))
                .set(
                    "viewBox",
                    format!("0 0 {} {}", px(self.width), px(self.height)),
                )
                .add(background),
            |document, group| document.add(group),
        );
        format!("{document}\n")
    }
}

/// Single-panel SVG of a recorded diagram.
pub fn render_svg(list: &DisplayList, width: f64, height: f64, title: Option<&str>) -> String {
    let mut document = SvgDocument::new(width, height);
    document.panel(Rect::new(0.0, 0.0, width, height), list, title);
    document.finish()
}

/// Drawing surface over one group of an SVG document.
pub struct SvgPanel<'a> {
    group: &'a mut Group,
    area: Rect,
    viewport: Viewport,
}

impl<'a> SvgPanel<'a> {
    fn new(group: &'a mut Group, area: Rect) -> Self {
        Self {
            group,
            area,
            viewport: Viewport::fit(Bounds::new(-1.0, 1.0, -1.0, 1.0), area.inset(PLOT_PADDING)),
        }
    }

    fn push<N: Into<Box<dyn Node>>>(&mut self, node: N) {
        let group = std::mem::replace(self.group, Group::new());
        *self.group = group.add(node);
    }

    fn screen(&self, point: Point) -> (f64, f64) {
        self.viewport.to_screen(point)
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) {
        let line = stroke_attributes(stroke).into_iter().fold(
            Line::new()
                .set("x1", px(from.0))
                .set("y1", px(from.1))
                .set("x2", px(to.0))
                .set("y2", px(to.1)),
            |line, (name, value)| line.set(name, value),
        );
        self.push(line);
    }

    fn dot(&mut self, centre: (f64, f64), radius: f64, fill: String) {
        self.push(
            Circle::new()
                .set("cx", px(centre.0))
                .set("cy", px(centre.1))
                .set("r", px(radius))
                .set("fill", fill),
        );
    }

    fn text_at(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        let (anchor, x) = match style.h_align {
            HAlign::Left => ("start", x + 2.0),
            HAlign::Center => ("middle", x),
            HAlign::Right => ("end", x - 2.0),
        };
        let (baseline, y) = match style.v_align {
            VAlign::Top => ("hanging", y + 2.0),
            VAlign::Middle => ("central", y),
            VAlign::Bottom => ("auto", y - 2.0),
        };
        self.push(
            Text::new(content)
                .set("x", px(x))
                .set("y", px(y))
                .set("fill", style.color.to_hex())
                .set("font-family", FONT_FAMILY)
                .set("font-size", px(style.size))
                .set("text-anchor", anchor)
                .set("dominant-baseline", baseline),
        );
    }
}

impl DrawingSurface for SvgPanel<'_> {
    fn clear(&mut self) {
        *self.group = Group::new();
    }

    fn set_view(&mut self, view: Bounds) {
        self.viewport = Viewport::fit(view, self.area.inset(PLOT_PADDING));
    }

    fn marker(&mut self, at: Point, style: MarkerStyle) {
        let centre = self.screen(at);
        self.dot(centre, style.size / 2.0, style.color.to_hex());
    }

    fn polygon(&mut self, points: &[Point], stroke: Stroke) {
        let screen: Vec<(f64, f64)> = points.iter().map(|p| self.screen(*p)).collect();
        let outline = stroke_attributes(&stroke).into_iter().fold(
            Polygon::new()
                .set("points", points_attribute(&screen))
                .set("fill", "none"),
            |polygon, (name, value)| polygon.set(name, value),
        );
        self.push(outline);
    }

    fn arrow(&mut self, from: Point, to: Point, stroke: Stroke) {
        let (x1, y1) = self.screen(from);
        let (x2, y2) = self.screen(to);
        let length = (x2 - x1).hypot(y2 - y1);
        if !length.is_finite() || length < 1e-9 {
            return;
        }
        let (ux, uy) = ((x2 - x1) / length, (y2 - y1) / length);
        let head = ARROW_HEAD_LENGTH.min(length * 0.4);
        let half_width = head * 0.35;
        let (bx, by) = (x2 - ux * head, y2 - uy * head);
        let (nx, ny) = (-uy * half_width, ux * half_width);

        self.line((x1, y1), (bx, by), &stroke);
        self.push(
            Polygon::new()
                .set(
                    "points",
                    points_attribute(&[(x2, y2), (bx + nx, by + ny), (bx - nx, by - ny)]),
                )
                .set("fill", stroke.color.to_hex()),
        );
    }

    fn label(&mut self, at: Point, text: &str, style: TextStyle) {
        let (x, y) = self.screen(at);
        self.text_at(x, y, text, &style);
    }

    fn legend(&mut self, entries: &[LegendEntry], font_size: f64) {
        if entries.is_empty() {
            return;
        }
        let padding = 6.0;
        let glyph_width = 24.0;
        let row_height = font_size * 1.5;
        let text_width = entries
            .iter()
            .map(|entry| entry.label.chars().count() as f64 * font_size * 0.6)
            .fold(0.0, f64::max);
        let box_width = 3.0 * padding + glyph_width + text_width;
        let box_height = 2.0 * padding + row_height * entries.len() as f64;
        let left = self.area.x + self.area.width - box_width - 4.0;
        let top = self.area.y + 4.0;

        self.push(
            Rectangle::new()
                .set("x", px(left))
                .set("y", px(top))
                .set("width", px(box_width))
                .set("height", px(box_height))
                .set("fill", "#ffffff")
                .set("fill-opacity", 0.85)
                .set("stroke", "#cccccc"),
        );
        for (row, entry) in entries.iter().enumerate() {
            let centre_y = top + padding + row_height * (row as f64 + 0.5);
            let glyph_left = left + padding;
            match &entry.glyph {
                LegendGlyph::Marker(color) => {
                    self.dot(
                        (glyph_left + glyph_width / 2.0, centre_y),
                        font_size * 0.35,
                        color.to_hex(),
                    );
                }
                LegendGlyph::Line(stroke) => {
                    self.line(
                        (glyph_left, centre_y),
                        (glyph_left + glyph_width, centre_y),
                        stroke,
                    );
                }
            }
            let style = TextStyle::aligned(palette::TEXT, font_size, HAlign::Left, VAlign::Middle);
            let text_left = glyph_left + glyph_width + padding - 2.0;
            self.text_at(text_left, centre_y, &entry.label, &style);
        }
    }
}
