use crate::math::geometry::Point;
use crate::render::bounds::Bounds;
use crate::render::style::{Color, MarkerStyle, Stroke, TextStyle};
use crate::render::surface::{DrawingSurface, LegendEntry};

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Marker {
        at: Point,
        style: MarkerStyle,
    },
    Polygon {
        points: Vec<Point>,
        stroke: Stroke,
    },
    Arrow {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Label {
        at: Point,
        text: String,
        style: TextStyle,
    },
    Legend {
        entries: Vec<LegendEntry>,
        font_size: f64,
    },
}

/// Surface that records primitives in draw order for later replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    view: Option<Bounds>,
    primitives: Vec<Primitive>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> Option<Bounds> {
        self.view
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn arrows(&self) -> impl Iterator<Item = (Point, Point, &Stroke)> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Arrow { from, to, stroke } => Some((*from, *to, stroke)),
            _ => None,
        })
    }

    pub fn arrows_colored(&self, color: Color) -> usize {
        self.arrows()
            .filter(|(_, _, stroke)| stroke.color == color)
            .count()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn legend_entries(&self) -> Option<&[LegendEntry]> {
        self.primitives.iter().find_map(|primitive| match primitive {
            Primitive::Legend { entries, .. } => Some(entries.as_slice()),
            _ => None,
        })
    }

    /// Draws the recorded content onto another surface.
    pub fn replay<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        if let Some(view) = self.view {
            surface.set_view(view);
        }
        for primitive in &self.primitives {
            match primitive {
                Primitive::Marker { at, style } => surface.marker(*at, *style),
                Primitive::Polygon { points, stroke } => surface.polygon(points, *stroke),
                Primitive::Arrow { from, to, stroke } => surface.arrow(*from, *to, *stroke),
                Primitive::Label { at, text, style } => surface.label(*at, text, *style),
                Primitive::Legend { entries, font_size } => surface.legend(entries, *font_size),
            }
        }
    }
}

impl DrawingSurface for DisplayList {
    fn clear(&mut self) {
        self.view = None;
        self.primitives.clear();
    }

    fn set_view(&mut self, view: Bounds) {
        self.view = Some(view);
    }

    fn marker(&mut self, at: Point, style: MarkerStyle) {
        self.primitives.push(Primitive::Marker { at, style });
    }

    fn polygon(&mut self, points: &[Point], stroke: Stroke) {
        self.primitives.push(Primitive::Polygon {
            points: points.to_vec(),
            stroke,
        });
    }

    fn arrow(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.primitives.push(Primitive::Arrow { from, to, stroke });
    }

    fn label(&mut self, at: Point, text: &str, style: TextStyle) {
        self.primitives.push(Primitive::Label {
            at,
            text: text.to_string(),
            style,
        });
    }

    fn legend(&mut self, entries: &[LegendEntry], font_size: f64) {
        self.primitives.push(Primitive::Legend {
            entries: entries.to_vec(),
            font_size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::palette;

    #[test]
    fn replay_reproduces_the_recording() {
        let mut original = DisplayList::new();
        original.set_view(Bounds::new(-1.0, 1.0, -1.0, 1.0));
        original.arrow(
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            Stroke::solid(palette::CURRENT),
        );
        original.label(
            Point::ORIGIN,
            "N",
            TextStyle::centered(palette::TEXT, 10.0),
        );

        let mut copy = DisplayList::new();
        copy.marker(
            Point::ORIGIN,
            MarkerStyle {
                color: palette::VERTEX,
                size: 4.0,
            },
        );
        original.replay(&mut copy);
        assert_eq!(copy, original);
        assert_eq!(copy.arrows_colored(palette::CURRENT), 1);
        assert_eq!(copy.labels().collect::<Vec<_>>(), vec!["N"]);
    }

    #[test]
    fn recorded_legend_is_readable_back() {
        let mut list = DisplayList::new();
        assert!(list.legend_entries().is_none());

        list.legend(
            &[
                LegendEntry::marker(palette::STAR_POINT, "Star point N"),
                LegendEntry::line(Stroke::dashed(palette::TEXT), "Shortened arrow"),
            ],
            12.0,
        );

        let entries = list.legend_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].label, "Shortened arrow");
    }
}
