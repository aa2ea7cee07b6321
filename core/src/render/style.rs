/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Colours of the diagram elements.
pub mod palette {
    use super::Color;

    pub const STAR_POINT: Color = Color::rgb(0, 0, 255);
    pub const NEUTRAL: Color = Color::rgb(0, 0, 0);
    pub const VERTEX: Color = Color::rgb(0, 0, 0);
    pub const DISPLACEMENT: Color = Color::rgb(0, 100, 0);
    pub const TRIANGLE: Color = Color::rgb(255, 165, 0);
    pub const LINE_VOLTAGE: Color = Color::rgb(0, 0, 255);
    pub const PHASE_VOLTAGE: Color = Color::rgb(0, 128, 0);
    pub const CURRENT: Color = Color::rgb(255, 0, 0);
    pub const NEUTRAL_CURRENT: Color = Color::rgb(128, 0, 128);
    pub const TEXT: Color = Color::rgb(0, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub style: LineStyle,
}

impl Stroke {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            width: 1.5,
            style: LineStyle::Solid,
        }
    }

    pub fn dashed(color: Color) -> Self {
        Self {
            style: LineStyle::Dashed,
            ..Self::solid(color)
        }
    }

    pub fn is_dashed(&self) -> bool {
        self.style == LineStyle::Dashed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub color: Color,
    /// Diameter in pixels.
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Text placement relative to the anchor point; `Right`/`Bottom` put the text
/// left of and above the anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f64,
    pub h_align: HAlign,
    pub v_align: VAlign,
}

impl TextStyle {
    pub fn centered(color: Color, size: f64) -> Self {
        Self {
            color,
            size,
            h_align: HAlign::Center,
            v_align: VAlign::Bottom,
        }
    }

    pub fn aligned(color: Color, size: f64, h_align: HAlign, v_align: VAlign) -> Self {
        Self {
            color,
            size,
            h_align,
            v_align,
        }
    }
}
