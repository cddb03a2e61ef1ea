//! Hypothesis pruning and track lifecycle
//!
//! Essential for keeping the hypothesis set bounded: weak hypotheses are
//! dropped relative to the strongest one, and stale tracks are retired
//! independent of their hypothesis' rank.

use tracing::{trace, warn};

use crate::config::ClusteringParams;
use crate::hypothesis::HypothesisStore;
use crate::{Result, TrackError, MAXHYP};

/// Configuration for pruning operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PruningConfig {
    /// Maximum number of hypotheses kept
    pub nkeep: usize,
    /// Hypotheses with `p < p_max / pfactor` are dropped
    pub pfactor: f64,
}

impl PruningConfig {
    /// Creates a default pruning configuration.
    pub fn default_config() -> Self {
        Self::from_params(&ClusteringParams::default())
    }

    /// Creates a pruning configuration with custom values.
    ///
    /// `nkeep` is capped at [`MAXHYP`].
    pub fn new(nkeep: usize, pfactor: f64) -> Self {
        Self {
            nkeep: nkeep.clamp(1, MAXHYP),
            pfactor,
        }
    }

    /// Pruning configuration of the clustering parameters.
    pub fn from_params(params: &ClusteringParams) -> Self {
        Self::new(params.effective_nkeep(), params.pfactor)
    }
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Scales weights so that the strongest hypothesis has weight 1.
///
/// Returns the maximum weight before scaling. Fails with
/// [`TrackError::FilterFault`] if the set is empty or the maximum weight is
/// zero or not finite.
pub fn normalize_weights<const D: usize, const K: usize>(
    store: &mut HypothesisStore<D, K>,
) -> Result<f64> {
    let p_max = check_health(store)?;
    for hypothesis in store.iter_mut() {
        let weight = hypothesis.weight() / p_max;
        hypothesis.set_weight(weight);
    }
    Ok(p_max)
}

/// Maximum weight of a structurally sound hypothesis set.
pub fn check_health<const D: usize, const K: usize>(store: &HypothesisStore<D, K>) -> Result<f64> {
    match store.max_weight() {
        None => {
            warn!("No surviving hypothesis");
            Err(TrackError::FilterFault)
        }
        Some(p_max) if !p_max.is_finite() || p_max <= 0.0 => {
            warn!("Degenerate maximum hypothesis weight {}", p_max);
            Err(TrackError::FilterFault)
        }
        Some(p_max) if store.hypotheses().iter().any(|h| !h.weight().is_finite()) => {
            warn!("Non-finite hypothesis weight next to maximum {}", p_max);
            Err(TrackError::FilterFault)
        }
        Some(p_max) => Ok(p_max),
    }
}

/// Applies the full pruning pipeline: normalise, sort, keep `nkeep`, drop
/// everything below `1 / pfactor`.
///
/// Returns the number of hypotheses removed.
pub fn prune<const D: usize, const K: usize>(
    store: &mut HypothesisStore<D, K>,
    config: &PruningConfig,
) -> Result<usize> {
    normalize_weights(store)?;
    let before = store.len();

    store.sort_by_weight();
    store.truncate(config.nkeep);
    let threshold = 1.0 / config.pfactor;
    store.retain(|h| h.weight() >= threshold);

    let removed = before - store.len();
    if removed > 0 {
        trace!("Pruned {} of {} hypotheses", removed, before);
    }
    Ok(removed)
}

/// Retires every track not updated for longer than `maxage`.
///
/// Returns the number of tracks retired over all hypotheses.
pub fn retire_stale_tracks<const D: usize, const K: usize>(
    store: &mut HypothesisStore<D, K>,
    timestamp: f64,
    maxage: f64,
) -> usize {
    let mut retired = 0;
    for hypothesis in store.iter_mut() {
        let before = hypothesis.len();
        hypothesis.retain_tracks(|t| t.age(timestamp) <= maxage);
        retired += before - hypothesis.len();
    }
    if retired > 0 {
        trace!("Retired {} stale tracks at t={}", retired, timestamp);
    }
    retired
}
