//! Clutter and new-object priors
//!
//! Every observation is explained either by a tracked object, by an object
//! not seen before, or as clutter (a false alarm).

use crate::config::ClusteringParams;
use crate::{Result, TrackError};

/// Prior branch factors applied to a parent hypothesis weight `p`.
///
/// - associate: `p * (1 - pclutter) * L`
/// - new object: `p * alpha * (1 - pclutter)`
/// - clutter: `p * alpha * pclutter`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchPriors {
    /// Probability that an observation is clutter
    pclutter: f64,
    /// New-object prior relative to an existing object
    alpha: f64,
}

impl BranchPriors {
    /// Creates priors.
    ///
    /// `pclutter` must lie in `[0, 1)` and `alpha` must be positive.
    pub fn new(pclutter: f64, alpha: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&pclutter) {
            return Err(TrackError::InvalidParameter("pclutter"));
        }
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(TrackError::InvalidParameter("alpha"));
        }
        Ok(Self { pclutter, alpha })
    }

    /// Priors described by the clustering parameters.
    pub fn from_params(params: &ClusteringParams) -> Result<Self> {
        Self::new(params.pclutter, params.alpha)
    }

    /// Factor multiplying the likelihood of an association branch.
    #[inline]
    pub fn association(&self) -> f64 {
        1.0 - self.pclutter
    }

    /// Factor of a new-object branch.
    #[inline]
    pub fn new_object(&self) -> f64 {
        self.alpha * (1.0 - self.pclutter)
    }

    /// Factor of a clutter branch.
    #[inline]
    pub fn clutter(&self) -> f64 {
        self.alpha * self.pclutter
    }
}
