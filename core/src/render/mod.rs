pub mod bounds;
pub mod display_list;
pub mod engine;
pub mod style;
pub mod surface;
pub mod svg;
pub mod viewport;

pub use bounds::{clip_arrow, ArrowClip, Bounds};
pub use display_list::{DisplayList, Primitive};
pub use engine::{auto_view, render_diagram, DiagramInput, RenderOptions, RenderReport};
pub use style::{palette, Color, HAlign, LineStyle, MarkerStyle, Stroke, TextStyle, VAlign};
pub use surface::{DrawingSurface, LegendEntry, LegendGlyph};
pub use self::svg::{render_svg, SvgDocument, SvgPanel};
pub use viewport::{Rect, Viewport};
