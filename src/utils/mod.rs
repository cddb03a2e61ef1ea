//! Utility functions for the trackers
//!
//! Hypothesis pruning, track lifecycle, and extrapolation of published
//! estimates.

pub mod extrapolation;
pub mod pruning;

pub use extrapolation::*;
pub use pruning::*;
