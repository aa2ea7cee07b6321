pub mod residual;
pub mod star_point;

pub use residual::residual;
pub use star_point::{
    displacement_magnitude, NeutralPoint, NeutralPointEstimate, StarPointSolution,
    StarPointSolver,
};
