pub mod geometry;
pub mod phasor;
pub mod powell;

pub use geometry::{angle_between, centroid, distance, triangle_vertices, Point};
pub use phasor::{inn_angle, phasor_sum};
pub use powell::{minimize, Minimum, PowellOptions};
