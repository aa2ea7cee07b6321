//! Star-point solver and phasor diagram renderer for three-phase measurements.
//!
//! Scenarios of line currents, line-to-line voltages and neutral quantities
//! are turned into a displaced neutral point N' and an annotated diagram drawn
//! through the [`render::DrawingSurface`] trait.

pub mod math;
pub mod plan;
pub mod prelude;
pub mod render;
pub mod scenario;
pub mod solver;
pub mod telemetry;

pub use plan::{DiagramPipeline, RenderOutcome, ScenarioPlan};
pub use prelude::{DiagramConfig, DiagramError, DiagramResult};
