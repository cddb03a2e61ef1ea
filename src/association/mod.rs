//! Association and weighting
//!
//! Branches the hypothesis set on every observation and selects the tracks
//! to publish.
//!
//! # Branch weights
//!
//! For a parent hypothesis of weight `p`:
//!
//! | explanation   | child weight                          |
//! |---------------|---------------------------------------|
//! | track `j`     | `p · (1 − pclutter) · exp(−d²/2)`     |
//! | new object    | `p · alpha · (1 − pclutter)`          |
//! | clutter       | `p · alpha · pclutter`                |
//!
//! where `d²` is the squared Mahalanobis distance on the ground plane.

mod engine;
mod selection;

pub use engine::*;
pub use selection::*;
