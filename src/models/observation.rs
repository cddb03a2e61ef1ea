//! Observation (sensor) models
//!
//! Describes how likely an observation is given a predicted track position.

use num_traits::Float;

use crate::config::ClusteringParams;
use crate::types::spaces::Position;
use crate::{Result, TrackError};

/// Association branches whose squared Mahalanobis distance exceeds this
/// (5σ) are not generated.
pub const GATE_MAHALANOBIS_SQ: f64 = 25.0;

/// Trait for observation models.
///
/// The measurement process is `z = x + v`, where `v` is zero-mean Gaussian
/// noise; only the ground-plane components (x, y) are scored.
pub trait ObservationModel<const D: usize> {
    /// Squared Mahalanobis distance between a predicted position and an
    /// observed one.
    fn mahalanobis_squared(&self, predicted: &Position<D>, observed: &Position<D>) -> f64;

    /// Unnormalised Gaussian likelihood `exp(-d²/2)`.
    fn likelihood(&self, predicted: &Position<D>, observed: &Position<D>) -> f64 {
        Float::exp(-0.5 * self.mahalanobis_squared(predicted, observed))
    }

    /// True if the observation lies inside the association gate.
    fn gate(&self, predicted: &Position<D>, observed: &Position<D>) -> bool {
        self.mahalanobis_squared(predicted, observed) <= GATE_MAHALANOBIS_SQ
    }
}

// ============================================================================
// Ground-plane Sensor
// ============================================================================

/// Position sensor with independent noise in x and y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlaneSensor {
    /// X position noise standard deviation
    pub sigma_x: f64,
    /// Y position noise standard deviation
    pub sigma_y: f64,
}

impl GroundPlaneSensor {
    /// Creates a sensor.
    ///
    /// Returns [`TrackError::InvalidParameter`] unless both deviations are
    /// positive and finite.
    pub fn new(sigma_x: f64, sigma_y: f64) -> Result<Self> {
        if !(sigma_x > 0.0 && sigma_x.is_finite()) {
            return Err(TrackError::InvalidParameter("sigmax"));
        }
        if !(sigma_y > 0.0 && sigma_y.is_finite()) {
            return Err(TrackError::InvalidParameter("sigmay"));
        }
        Ok(Self { sigma_x, sigma_y })
    }

    /// Sensor described by the clustering parameters.
    pub fn from_params(params: &ClusteringParams) -> Result<Self> {
        Self::new(params.sigmax, params.sigmay)
    }
}

impl<const D: usize> ObservationModel<D> for GroundPlaneSensor {
    fn mahalanobis_squared(&self, predicted: &Position<D>, observed: &Position<D>) -> f64 {
        let delta = (*observed - *predicted).to_array();
        let dx = if D > 0 { delta[0] / self.sigma_x } else { 0.0 };
        let dy = if D > 1 { delta[1] / self.sigma_y } else { 0.0 };
        dx * dx + dy * dy
    }
}
