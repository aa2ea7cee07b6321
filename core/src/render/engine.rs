use crate::math::geometry::Point;
use crate::prelude::{DiagramConfig, DiagramError, DiagramResult};
use crate::render::bounds::{clip_arrow, Bounds};
use crate::render::style::{palette, Color, HAlign, MarkerStyle, Stroke, TextStyle, VAlign};
use crate::render::surface::{DrawingSurface, LegendEntry};
use crate::solver::star_point::NeutralPoint;

const POINT_MARKER_SIZE: f64 = 5.0;
const VERTEX_MARKER_SIZE: f64 = 6.0;
const LEGEND_MARKER_LABEL: &str = "Star point N";
const LEGEND_SHORTENED_LABEL: &str = "Shortened arrow";

/// Computed geometry of one scenario, ready to draw.
#[derive(Debug, Clone)]
pub struct DiagramInput<'a> {
    /// Scenario ordinal, used in error messages.
    pub scenario: usize,
    pub triangle: [Point; 3],
    pub neutral: NeutralPoint,
    /// Direction of N' -> L1..L3 in degrees.
    pub phase_angles: [f64; 3],
    pub currents: &'a [f64],
    pub current_angles: &'a [f64],
    pub inn: f64,
    pub inn_angle: f64,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Current magnitude per diagram unit.
    pub current_scale: f64,
    pub label_fontsize: f64,
    /// Fraction of the data span added on each side of the automatic view.
    pub margin: f64,
    /// Fixed view; computed from the plotted points when `None`.
    pub view: Option<Bounds>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&DiagramConfig::default())
    }
}

impl From<&DiagramConfig> for RenderOptions {
    fn from(config: &DiagramConfig) -> Self {
        Self {
            current_scale: config.current_scale,
            label_fontsize: config.label_fontsize,
            margin: 0.1,
            view: None,
        }
    }
}

/// What a render call drew.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub view: Bounds,
    pub line_arrows: usize,
    pub phase_arrows: usize,
    pub current_arrows: usize,
    pub neutral_current_drawn: bool,
    /// Arrows drawn shortened to fit the view.
    pub clipped: usize,
    /// Arrows left out because their endpoint was not finite or they had no length.
    pub skipped: usize,
}

impl RenderReport {
    pub fn any_clipped(&self) -> bool {
        self.clipped > 0
    }
}

/// View covering N, N' (when displaced) and the triangle vertices.
pub fn auto_view(triangle: &[Point; 3], neutral: NeutralPoint, margin: f64) -> Bounds {
    let mut points = vec![Point::ORIGIN];
    if let NeutralPoint::Displaced(point) = neutral {
        points.push(point);
    }
    points.extend_from_slice(triangle);
    Bounds::around(&points)
        .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
        .with_margin(margin)
}

/// Draws the full phasor diagram of `input` onto `surface`.
///
/// The surface is cleared first, so rendering twice into the same surface
/// leaves the same content.
pub fn render_diagram<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    input: &DiagramInput<'_>,
    options: &RenderOptions,
) -> DiagramResult<RenderReport> {
    if input.currents.len() != input.current_angles.len() {
        return Err(DiagramError::MalformedScenario {
            index: input.scenario,
            reason: format!(
                "{} currents but {} current angles",
                input.currents.len(),
                input.current_angles.len()
            ),
        });
    }
    if !options.current_scale.is_finite() || options.current_scale <= 0.0 {
        return Err(DiagramError::InvalidConfig(format!(
            "current scale must be positive, got {}",
            options.current_scale
        )));
    }

    let view = options
        .view
        .unwrap_or_else(|| auto_view(&input.triangle, input.neutral, options.margin));
    let mut scene = Scene::begin(surface, view, options.label_fontsize);
    let neutral = input.neutral.position();

    scene.star_points(input.neutral);
    scene.triangle(&input.triangle);
    scene.line_voltages(&input.triangle);
    scene.phase_voltages(neutral, &input.triangle, &input.phase_angles);

    let currents = scene.currents(
        neutral,
        input.currents,
        input.current_angles,
        options.current_scale,
        CurrentKind::Line,
    );
    scene.report.current_arrows = currents;

    if input.inn > 0.0 {
        let drawn = scene.currents(
            neutral,
            &[input.inn],
            &[input.inn_angle],
            options.current_scale,
            CurrentKind::Neutral,
        );
        scene.report.neutral_current_drawn = drawn == 1;
    }

    Ok(scene.finish())
}

#[derive(Debug, Clone, Copy)]
enum CurrentKind {
    Line,
    Neutral,
}

impl CurrentKind {
    fn prefix(self) -> &'static str {
        match self {
            CurrentKind::Line => "I",
            CurrentKind::Neutral => "I_NN",
        }
    }

    fn color(self) -> Color {
        match self {
            CurrentKind::Line => palette::CURRENT,
            CurrentKind::Neutral => palette::NEUTRAL_CURRENT,
        }
    }
}

/// A cleared surface with a fixed view. Drawing is only possible through it.
struct Scene<'s, S: DrawingSurface + ?Sized> {
    surface: &'s mut S,
    view: Bounds,
    font_size: f64,
    voltage_legend: Vec<LegendEntry>,
    current_legend: Vec<LegendEntry>,
    report: RenderReport,
}

impl<'s, S: DrawingSurface + ?Sized> Scene<'s, S> {
    fn begin(surface: &'s mut S, view: Bounds, font_size: f64) -> Self {
        surface.clear();
        surface.set_view(view);
        Self {
            surface,
            view,
            font_size,
            voltage_legend: Vec::new(),
            current_legend: Vec::new(),
            report: RenderReport {
                view,
                line_arrows: 0,
                phase_arrows: 0,
                current_arrows: 0,
                neutral_current_drawn: false,
                clipped: 0,
                skipped: 0,
            },
        }
    }

    fn text(&self, color: Color, h_align: HAlign, v_align: VAlign) -> TextStyle {
        TextStyle::aligned(color, self.font_size, h_align, v_align)
    }

    fn star_points(&mut self, neutral: NeutralPoint) {
        self.surface.marker(
            Point::ORIGIN,
            MarkerStyle {
                color: palette::STAR_POINT,
                size: POINT_MARKER_SIZE,
            },
        );
        let style = self.text(palette::TEXT, HAlign::Right, VAlign::Bottom);
        self.surface.label(Point::ORIGIN, "N", style);

        if let NeutralPoint::Displaced(point) = neutral {
            self.surface.marker(
                point,
                MarkerStyle {
                    color: palette::NEUTRAL,
                    size: POINT_MARKER_SIZE,
                },
            );
            let style = self.text(palette::TEXT, HAlign::Left, VAlign::Bottom);
            self.surface.label(point, "N′", style);

            if point.is_finite() && point != Point::ORIGIN {
                self.surface
                    .arrow(Point::ORIGIN, point, Stroke::solid(palette::DISPLACEMENT));
                let style = self.text(palette::TEXT, HAlign::Center, VAlign::Bottom);
                self.surface
                    .label(Point::ORIGIN.midpoint(point), "U_NN", style);
            }
        }
    }

    fn triangle(&mut self, triangle: &[Point; 3]) {
        self.surface
            .polygon(triangle, Stroke::dashed(palette::TRIANGLE));
        for (i, vertex) in triangle.iter().enumerate() {
            self.surface.marker(
                *vertex,
                MarkerStyle {
                    color: palette::VERTEX,
                    size: VERTEX_MARKER_SIZE,
                },
            );
            let style = self.text(palette::TEXT, HAlign::Right, VAlign::Bottom);
            self.surface.label(*vertex, &format!("L{}", i + 1), style);
        }
    }

    fn line_voltages(&mut self, triangle: &[Point; 3]) {
        for i in 0..3 {
            let next = (i + 1) % 3;
            let (start, end) = (triangle[i], triangle[next]);
            if !self.drawable(start, end) {
                self.report.skipped += 1;
                continue;
            }
            self.surface
                .arrow(start, end, Stroke::solid(palette::LINE_VOLTAGE));
            let style = self.text(palette::LINE_VOLTAGE, HAlign::Center, VAlign::Bottom);
            self.surface
                .label(start.midpoint(end), &format!("U{}_{}", i + 1, next + 1), style);
            self.report.line_arrows += 1;
        }
    }

    fn phase_voltages(&mut self, neutral: Point, triangle: &[Point; 3], angles: &[f64; 3]) {
        let stroke = Stroke::solid(palette::PHASE_VOLTAGE);
        for (i, (vertex, angle)) in triangle.iter().zip(angles).enumerate() {
            let name = format!("U{}_N′", i + 1);
            if self.drawable(neutral, *vertex) {
                self.surface.arrow(neutral, *vertex, stroke);
                let style = self.text(palette::TEXT, HAlign::Center, VAlign::Bottom);
                self.surface.label(neutral.midpoint(*vertex), &name, style);
                self.report.phase_arrows += 1;
            } else {
                self.report.skipped += 1;
            }
            self.voltage_legend
                .push(LegendEntry::line(stroke, format!("{} ({:.2}°)", name, angle)));
        }
    }

    /// Draws one arrow per current from `origin`; returns how many were drawn.
    fn currents(
        &mut self,
        origin: Point,
        magnitudes: &[f64],
        angles: &[f64],
        scale: f64,
        kind: CurrentKind,
    ) -> usize {
        let mut drawn = 0;
        for (i, (&magnitude, &angle)) in magnitudes.iter().zip(angles).enumerate() {
            let tip = Point::from_polar(magnitude / scale, angle);
            let clip = clip_arrow(origin, tip.x, tip.y, &self.view);
            let stroke = if clip.clipped {
                Stroke::dashed(kind.color())
            } else {
                Stroke::solid(kind.color())
            };
            let name = if magnitudes.len() > 1 {
                format!("{}{}", kind.prefix(), i + 1)
            } else {
                kind.prefix().to_string()
            };

            if self.drawable(origin, clip.end) {
                self.surface.arrow(origin, clip.end, stroke);
                let style = self.text(palette::TEXT, HAlign::Center, VAlign::Bottom);
                self.surface.label(origin.midpoint(clip.end), &name, style);
                if clip.clipped {
                    self.report.clipped += 1;
                }
                drawn += 1;
            } else {
                self.report.skipped += 1;
            }
            self.current_legend
                .push(LegendEntry::line(stroke, format!("{} ({:.2}°)", name, angle)));
        }
        drawn
    }

    fn drawable(&self, from: Point, to: Point) -> bool {
        from.is_finite() && to.is_finite() && from != to
    }

    fn finish(self) -> RenderReport {
        let mut entries = vec![LegendEntry::marker(palette::STAR_POINT, LEGEND_MARKER_LABEL)];
        if self.report.any_clipped() {
            entries.push(LegendEntry::line(
                Stroke::dashed(palette::TEXT),
                LEGEND_SHORTENED_LABEL,
            ));
        }
        entries.extend(self.voltage_legend);
        entries.extend(self.current_legend);
        self.surface.legend(&entries, self.font_size);
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geometry::{angle_between, triangle_vertices};
    use crate::render::display_list::{DisplayList, Primitive};
    use crate::render::surface::LegendGlyph;

    fn balanced_input<'a>(currents: &'a [f64], angles: &'a [f64]) -> DiagramInput<'a> {
        let triangle = triangle_vertices(50.0);
        DiagramInput {
            scenario: 0,
            triangle,
            neutral: NeutralPoint::NotDisplaced,
            phase_angles: triangle.map(|vertex| angle_between(Point::ORIGIN, vertex)),
            currents,
            current_angles: angles,
            inn: 0.0,
            inn_angle: 0.0,
        }
    }

    fn options(scale: f64) -> RenderOptions {
        RenderOptions {
            current_scale: scale,
            ..Default::default()
        }
    }

    #[test]
    fn balanced_scenario_draws_nine_arrows_without_clipping() {
        let currents = [10.0, 10.0, 10.0];
        let angles = [0.0, 120.0, 240.0];
        let input = balanced_input(&currents, &angles);
        let mut surface = DisplayList::new();

        let report = render_diagram(&mut surface, &input, &options(1.0)).unwrap();

        assert_eq!(report.line_arrows, 3);
        assert_eq!(report.phase_arrows, 3);
        assert_eq!(report.current_arrows, 3);
        assert!(!report.neutral_current_drawn);
        assert!(!report.any_clipped());
        assert_eq!(report.skipped, 0);
        assert_eq!(surface.arrows().count(), 9);
        assert_eq!(surface.arrows_colored(palette::NEUTRAL_CURRENT), 0);
        assert_eq!(surface.arrows_colored(palette::DISPLACEMENT), 0);
        assert!(!surface.labels().any(|label| label == "N′"));
    }

    #[test]
    fn legend_lists_marker_voltages_then_currents() {
        let currents = [10.0, 10.0, 10.0];
        let angles = [0.0, 120.0, 240.0];
        let input = balanced_input(&currents, &angles);
        let mut surface = DisplayList::new();
        render_diagram(&mut surface, &input, &options(1.0)).unwrap();

        let labels: Vec<&str> = surface
            .legend_entries()
            .unwrap()
            .iter()
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Star point N",
                "U1_N′ (0.00°)",
                "U2_N′ (120.00°)",
                "U3_N′ (-120.00°)",
                "I1 (0.00°)",
                "I2 (120.00°)",
                "I3 (240.00°)",
            ]
        );
    }

    #[test]
    fn oversized_current_is_dashed_and_flagged() {
        let currents = [1000.0];
        let angles = [0.0];
        let mut input = balanced_input(&currents, &angles);
        input.inn = 2.0;
        input.inn_angle = 90.0;
        let view = Bounds::new(-10.0, 10.0, -10.0, 10.0);
        let options = RenderOptions {
            current_scale: 1.0,
            view: Some(view),
            ..Default::default()
        };
        let mut surface = DisplayList::new();

        let report = render_diagram(&mut surface, &input, &options).unwrap();

        assert_eq!(report.clipped, 1);
        assert!(report.neutral_current_drawn);
        let (_, end, stroke) = surface
            .arrows()
            .find(|(_, _, stroke)| stroke.color == palette::CURRENT)
            .unwrap();
        assert_eq!(end, Point::new(10.0, 0.0));
        assert!(stroke.is_dashed());

        let legend = surface.legend_entries().unwrap();
        assert_eq!(legend[1].label, "Shortened arrow");
        assert!(matches!(legend[1].glyph, LegendGlyph::Line(s) if s.is_dashed()));
        assert!(legend.iter().any(|entry| entry.label == "I_NN (90.00°)"));
        assert!(surface.labels().any(|label| label == "I"));
    }

    #[test]
    fn clipping_from_the_neutral_current_is_reported() {
        let currents = [1.0, 1.0];
        let angles = [0.0, 180.0];
        let mut input = balanced_input(&currents, &angles);
        input.inn = 500.0;
        input.inn_angle = 45.0;
        let mut surface = DisplayList::new();

        let report = render_diagram(&mut surface, &input, &options(1.0)).unwrap();

        assert_eq!(report.current_arrows, 2);
        assert_eq!(report.clipped, 1);
        assert!(report.any_clipped());
        assert!(surface
            .legend_entries()
            .unwrap()
            .iter()
            .any(|entry| entry.label == LEGEND_SHORTENED_LABEL));
    }

    #[test]
    fn displaced_neutral_draws_unn_and_moves_arrow_origins() {
        let currents = [10.0];
        let angles = [30.0];
        let mut input = balanced_input(&currents, &angles);
        let shifted = Point::new(5.0, -3.0);
        input.neutral = NeutralPoint::Displaced(shifted);
        let mut surface = DisplayList::new();

        let report = render_diagram(&mut surface, &input, &options(1.0)).unwrap();

        assert_eq!(report.phase_arrows, 3);
        assert_eq!(surface.arrows_colored(palette::DISPLACEMENT), 1);
        assert!(surface.labels().any(|label| label == "U_NN"));
        assert!(surface
            .arrows()
            .filter(|(_, _, stroke)| stroke.color == palette::PHASE_VOLTAGE)
            .all(|(from, _, _)| from == shifted));
        assert!(report.view.contains(shifted));
    }

    #[test]
    fn non_finite_current_is_skipped_but_listed() {
        let currents = [f64::NAN, 10.0];
        let angles = [0.0, 90.0];
        let input = balanced_input(&currents, &angles);
        let mut surface = DisplayList::new();

        let report = render_diagram(&mut surface, &input, &options(1.0)).unwrap();

        assert_eq!(report.current_arrows, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(surface.arrows_colored(palette::CURRENT), 1);
        assert!(surface
            .legend_entries()
            .unwrap()
            .iter()
            .any(|entry| entry.label.starts_with("I1 ")));
    }

    #[test]
    fn zero_or_negative_inn_draws_no_neutral_current() {
        let currents = [10.0];
        let angles = [0.0];
        for inn in [0.0, -4.0] {
            let mut input = balanced_input(&currents, &angles);
            input.inn = inn;
            let mut surface = DisplayList::new();
            let report = render_diagram(&mut surface, &input, &options(1.0)).unwrap();
            assert!(!report.neutral_current_drawn);
            assert_eq!(surface.arrows_colored(palette::NEUTRAL_CURRENT), 0);
        }
    }

    #[test]
    fn rerendering_into_the_same_surface_is_idempotent() {
        let currents = [12.0, 7.0, 9.0];
        let angles = [5.0, 130.0, 250.0];
        let input = balanced_input(&currents, &angles);
        let mut surface = DisplayList::new();

        render_diagram(&mut surface, &input, &options(1.5)).unwrap();
        let first = surface.clone();
        render_diagram(&mut surface, &input, &options(1.5)).unwrap();

        assert_eq!(surface, first);
        assert!(matches!(
            surface.primitives().first(),
            Some(Primitive::Marker { .. })
        ));
    }

    #[test]
    fn mismatched_currents_are_rejected() {
        let currents = [10.0, 10.0];
        let angles = [0.0];
        let input = balanced_input(&currents, &angles);
        let mut surface = DisplayList::new();
        let err = render_diagram(&mut surface, &input, &options(1.0)).unwrap_err();
        assert!(matches!(err, DiagramError::MalformedScenario { index: 0, .. }));
        assert!(surface.is_empty());
    }
}
