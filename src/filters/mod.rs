//! Tracker entry points
//!
//! Each tracker owns a [`FilterContext`] and is driven by one `tick` call per
//! control cycle.
//!
//! - [`BallTracker`]: competing 3-D ball candidates, publishes the best one
//! - [`ObstacleTracker`]: robots on the ground plane, publishes an object table

mod ball;
mod context;
mod obstacle;

pub use ball::*;
pub use context::*;
pub use obstacle::*;
