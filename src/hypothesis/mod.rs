//! Hypothesis store
//!
//! Tracks live inside weighted joint hypotheses; the store holds a bounded
//! arena of hypotheses addressed by typed ids.

mod store;
mod track;

pub use store::*;
pub use track::*;
