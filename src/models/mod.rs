//! Measurement and clutter models
//!
//! This module defines how an observation is scored against a predicted
//! track and the prior weights of the clutter and new-object explanations.

mod clutter;
mod observation;

pub use clutter::*;
pub use observation::*;
