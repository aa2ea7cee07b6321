use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path},
    Color, Pixels, Point, Rectangle, Renderer, Theme,
};
use phasorcore::math::Point as DiagramPoint;
use phasorcore::render::{
    palette, Bounds, DisplayList, DrawingSurface, HAlign, LegendEntry, LegendGlyph, MarkerStyle,
    Rect, Stroke, TextStyle, VAlign, Viewport,
};

const PLOT_PADDING: f64 = 12.0;
const ARROW_HEAD_LENGTH: f32 = 10.0;
const DASH: [f32; 2] = [6.0, 4.0];

fn color_of(color: phasorcore::render::Color) -> Color {
    Color::from_rgb8(color.r, color.g, color.b)
}

fn stroke_of(stroke: &Stroke) -> canvas::Stroke<'static> {
    let base = canvas::Stroke::default()
        .with_color(color_of(stroke.color))
        .with_width(stroke.width as f32);
    if stroke.is_dashed() {
        canvas::Stroke {
            line_dash: canvas::LineDash {
                segments: &DASH,
                offset: 0,
            },
            ..base
        }
    } else {
        base
    }
}

/// Drawing surface over an iced canvas frame.
pub struct FrameSurface<'a> {
    frame: &'a mut Frame,
    area: Rect,
    viewport: Viewport,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut Frame, area: Rect) -> Self {
        Self {
            frame,
            area,
            viewport: Viewport::fit(Bounds::new(-1.0, 1.0, -1.0, 1.0), area.inset(PLOT_PADDING)),
        }
    }

    fn screen(&self, point: DiagramPoint) -> Point {
        let (x, y) = self.viewport.to_screen(point);
        Point::new(x as f32, y as f32)
    }

    /// Text is laid out from its top-left corner, so alignment is applied
    /// from an estimated glyph box.
    fn text_at(&mut self, anchor: Point, content: &str, style: &TextStyle) {
        let size = style.size as f32;
        let width = content.chars().count() as f32 * size * 0.6;
        let height = size * 1.2;
        let x = match style.h_align {
            HAlign::Left => anchor.x + 2.0,
            HAlign::Center => anchor.x - width / 2.0,
            HAlign::Right => anchor.x - width - 2.0,
        };
        let y = match style.v_align {
            VAlign::Top => anchor.y + 2.0,
            VAlign::Middle => anchor.y - height / 2.0,
            VAlign::Bottom => anchor.y - height - 2.0,
        };
        self.frame.fill_text(canvas::Text {
            content: content.to_string(),
            position: Point::new(x, y),
            color: color_of(style.color),
            size: Pixels(size),
            ..canvas::Text::default()
        });
    }
}

impl DrawingSurface for FrameSurface<'_> {
    fn clear(&mut self) {
        let size = self.frame.size();
        self.frame.fill_rectangle(Point::ORIGIN, size, Color::WHITE);
    }

    fn set_view(&mut self, view: Bounds) {
        self.viewport = Viewport::fit(view, self.area.inset(PLOT_PADDING));
    }

    fn marker(&mut self, at: DiagramPoint, style: MarkerStyle) {
        let circle = Path::circle(self.screen(at), style.size as f32 / 2.0);
        self.frame.fill(&circle, color_of(style.color));
    }

    fn polygon(&mut self, points: &[DiagramPoint], stroke: Stroke) {
        let screen: Vec<Point> = points.iter().map(|p| self.screen(*p)).collect();
        if screen.len() < 2 {
            return;
        }
        let outline = Path::new(|builder| {
            builder.move_to(screen[0]);
            for point in &screen[1..] {
                builder.line_to(*point);
            }
            builder.close();
        });
        self.frame.stroke(&outline, stroke_of(&stroke));
    }

    fn arrow(&mut self, from: DiagramPoint, to: DiagramPoint, stroke: Stroke) {
        let start = self.screen(from);
        let tip = self.screen(to);
        let (dx, dy) = (tip.x - start.x, tip.y - start.y);
        let length = dx.hypot(dy);
        if !length.is_finite() || length < 1e-6 {
            return;
        }
        let (ux, uy) = (dx / length, dy / length);
        let head = ARROW_HEAD_LENGTH.min(length * 0.4);
        let half_width = head * 0.35;
        let base = Point::new(tip.x - ux * head, tip.y - uy * head);

        self.frame
            .stroke(&Path::line(start, base), stroke_of(&stroke));
        let arrow_head = Path::new(|builder| {
            builder.move_to(tip);
            builder.line_to(Point::new(base.x - uy * half_width, base.y + ux * half_width));
            builder.line_to(Point::new(base.x + uy * half_width, base.y - ux * half_width));
            builder.close();
        });
        self.frame.fill(&arrow_head, color_of(stroke.color));
    }

    fn label(&mut self, at: DiagramPoint, text: &str, style: TextStyle) {
        let anchor = self.screen(at);
        self.text_at(anchor, text, &style);
    }

    fn legend(&mut self, entries: &[LegendEntry], font_size: f64) {
        if entries.is_empty() {
            return;
        }
        let size = font_size as f32;
        let padding = 6.0;
        let glyph_width = 24.0;
        let row_height = size * 1.5;
        let text_width = entries
            .iter()
            .map(|entry| entry.label.chars().count() as f32 * size * 0.6)
            .fold(0.0, f32::max);
        let box_width = 3.0 * padding + glyph_width + text_width;
        let box_height = 2.0 * padding + row_height * entries.len() as f32;
        let left = (self.area.x + self.area.width) as f32 - box_width - 4.0;
        let top = self.area.y as f32 + 4.0;

        let frame_box = Path::rectangle(Point::new(left, top), iced::Size::new(box_width, box_height));
        self.frame
            .fill(&frame_box, Color::from_rgba(1.0, 1.0, 1.0, 0.85));
        self.frame.stroke(
            &frame_box,
            canvas::Stroke::default().with_color(Color::from_rgb8(0xcc, 0xcc, 0xcc)),
        );

        for (row, entry) in entries.iter().enumerate() {
            let centre_y = top + padding + row_height * (row as f32 + 0.5);
            let glyph_left = left + padding;
            match &entry.glyph {
                LegendGlyph::Marker(color) => {
                    let dot = Path::circle(
                        Point::new(glyph_left + glyph_width / 2.0, centre_y),
                        size * 0.35,
                    );
                    self.frame.fill(&dot, color_of(*color));
                }
                LegendGlyph::Line(stroke) => {
                    let sample = Path::line(
                        Point::new(glyph_left, centre_y),
                        Point::new(glyph_left + glyph_width, centre_y),
                    );
                    self.frame.stroke(&sample, stroke_of(stroke));
                }
            }
            let style = TextStyle::aligned(palette::TEXT, font_size, HAlign::Left, VAlign::Middle);
            let text_left = glyph_left + glyph_width + padding - 2.0;
            self.text_at(Point::new(text_left, centre_y), &entry.label, &style);
        }
    }
}

/// Canvas program replaying a recorded diagram.
pub struct DiagramCanvas<'a> {
    list: &'a DisplayList,
}

impl<'a> DiagramCanvas<'a> {
    pub fn new(list: &'a DisplayList) -> Self {
        Self { list }
    }
}

impl<Message> canvas::Program<Message> for DiagramCanvas<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);
        let area = Rect::new(0.0, 0.0, bounds.width as f64, bounds.height as f64);
        self.list.replay(&mut FrameSurface::new(&mut frame, area));
        vec![frame.into_geometry()]
    }
}
