//! sctrack: sequence-clustering trackers for soccer robots
//!
//! Turns noisy, intermittent observations of the ball and of other robots
//! into confidence-scored tracks, once per control tick.
//!
//! # Features
//!
//! - **Multi-hypothesis**: a bounded set of weighted joint explanations of
//!   the observation sequence, pruned relative to the strongest one
//! - **Bounded resources**: every buffer is fixed-capacity, the tick path
//!   never allocates
//! - **Explicit state**: filter state lives in owned context values, never in
//!   process-wide globals
//! - **no_std Support**: disable the default `std` feature for embedded targets
//!
//! # Example
//!
//! ```
//! use sctrack::prelude::*;
//!
//! let mut tracker = BallTracker::new();
//! let params = BallParams::default();
//! let candidates = [BallCandidate::new([1.0, 2.0, 0.0], 0.0)];
//!
//! let output = tracker.tick(0.0, &candidates, &params).unwrap();
//! let ball = output.ball.unwrap();
//! assert!((ball.position[0] - 1.0).abs() < 1e-9);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod association;
pub mod config;
pub mod control;
pub mod filters;
pub mod hypothesis;
pub mod ingest;
pub mod models;
pub mod types;
pub mod utils;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::control::*;
    pub use crate::filters::*;
    pub use crate::types::labels::*;
    pub use crate::types::records::*;
    pub use crate::types::spaces::*;
    pub use crate::{Result, TrackError};
}

// ============================================================================
// Capacity Constants
// ============================================================================

/// Number of robots whose observations share one tick's observation buffer.
pub const MAX_TRACKED_SOURCES: usize = 5;

/// Number of objects a single source may report per tick.
pub const MAX_OBJECTS_PER_SOURCE: usize = 10;

/// Capacity of the per-tick observation buffer.
pub const OBSERVATION_CAPACITY: usize = MAX_TRACKED_SOURCES * MAX_OBJECTS_PER_SOURCE;

/// Maximum number of concurrently live hypotheses.
pub const MAXHYP: usize = 24;

/// Maximum number of objects published (and tracked per hypothesis).
pub const MAXNOBJ_GLOBAL: usize = 10;

/// Maximum number of competing ball candidates per hypothesis.
pub const MAX_BALL_CANDIDATES: usize = 4;

/// The smoothed-confidence window holds `MA_N + 1` samples.
pub const MA_N: usize = 4;

/// Number of associated observations remembered per track.
pub const FEATURE_HISTORY: usize = 6;

// ============================================================================
// Errors
// ============================================================================

/// Error types for the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    /// Growth of a fixed-capacity buffer was requested beyond its capacity
    CapacityExceeded,
    /// A tunable parameter is outside its valid range
    InvalidParameter(&'static str),
    /// Internal numerical failure of the filter
    FilterFault,
    /// No velocity controller is configured
    ControllerUnavailable,
}

#[cfg(feature = "std")]
impl std::error::Error for TrackError {}

impl ::core::fmt::Display for TrackError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            TrackError::CapacityExceeded => write!(f, "Fixed capacity exceeded"),
            TrackError::InvalidParameter(name) => write!(f, "Invalid parameter: {}", name),
            TrackError::FilterFault => write!(f, "Numerical failure in filter"),
            TrackError::ControllerUnavailable => write!(f, "No velocity controller configured"),
        }
    }
}

pub type Result<T> = ::core::result::Result<T, TrackError>;
