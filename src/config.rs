//! Tunable filter parameters
//!
//! Parameters are owned by the caller and may change between ticks; the
//! trackers read them fresh on every tick and never cache a copy.

use crate::{Result, TrackError, MAXHYP, MAXNOBJ_GLOBAL, MAX_BALL_CANDIDATES, OBSERVATION_CAPACITY};

// ============================================================================
// Sequence Clustering
// ============================================================================

/// Parameters of the sequence-clustering core.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusteringParams {
    /// Probability that an observation is clutter
    pub pclutter: f64,
    /// New-object prior: `p_new = alpha * p_exist`
    pub alpha: f64,
    /// Measurement noise standard deviation, x (metres)
    pub sigmax: f64,
    /// Measurement noise standard deviation, y (metres)
    pub sigmay: f64,
    /// Number of hypotheses kept after each observation
    pub nkeep: usize,
    /// Hypotheses with `p < p_max / pfactor` are discarded
    pub pfactor: f64,
    /// Maximum number of observations considered per tick
    pub nselect: usize,
    /// Maximum number of tracked objects per hypothesis
    pub maxnobj: usize,
    /// Published positions are clipped to this radius around the robot (metres)
    pub clipradius: f64,
    /// Gain applied when blending a track toward an associated observation
    pub kscale: f64,
    /// Tracks not updated for longer than this are retired (seconds)
    pub maxage: f64,
    /// Minimum label score for an object to count as own team
    pub labelbound: f64,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self::obstacle_defaults()
    }
}

impl ClusteringParams {
    /// Defaults tuned for obstacle tracking.
    pub fn obstacle_defaults() -> Self {
        Self {
            pclutter: 0.01,
            alpha: 0.01,
            sigmax: 0.25,
            sigmay: 0.25,
            nkeep: 20,
            pfactor: 10.0,
            nselect: 32,
            maxnobj: 10,
            clipradius: 1000.0,
            kscale: 0.5,
            maxage: 1.0,
            labelbound: 0.60,
        }
    }

    /// Defaults tuned for ball tracking.
    pub fn ball_defaults() -> Self {
        Self {
            maxnobj: MAX_BALL_CANDIDATES,
            nselect: 16,
            kscale: 0.7,
            ..Self::obstacle_defaults()
        }
    }

    /// Checks every parameter against its valid range.
    ///
    /// Returns [`TrackError::InvalidParameter`] naming the first offender.
    pub fn validate(&self) -> Result<()> {
        positive(self.sigmax, "sigmax")?;
        positive(self.sigmay, "sigmay")?;
        positive(self.alpha, "alpha")?;
        positive(self.kscale, "kscale")?;
        positive(self.maxage, "maxage")?;
        positive(self.clipradius, "clipradius")?;
        if !(self.pclutter >= 0.0 && self.pclutter < 1.0) {
            return Err(TrackError::InvalidParameter("pclutter"));
        }
        if !(self.pfactor >= 1.0) || !self.pfactor.is_finite() {
            return Err(TrackError::InvalidParameter("pfactor"));
        }
        if self.kscale > 1.0 {
            return Err(TrackError::InvalidParameter("kscale"));
        }
        if !(0.0..=1.0).contains(&self.labelbound) {
            return Err(TrackError::InvalidParameter("labelbound"));
        }
        if self.nkeep == 0 {
            return Err(TrackError::InvalidParameter("nkeep"));
        }
        Ok(())
    }

    /// `nkeep` capped at the hypothesis capacity.
    #[inline]
    pub fn effective_nkeep(&self) -> usize {
        self.nkeep.clamp(1, MAXHYP)
    }

    /// `nselect` capped at the observation buffer capacity.
    #[inline]
    pub fn effective_nselect(&self) -> usize {
        self.nselect.min(OBSERVATION_CAPACITY)
    }

    /// `maxnobj` capped at the global object limit and the per-hypothesis
    /// track capacity `k`.
    #[inline]
    pub fn effective_maxnobj(&self, k: usize) -> usize {
        self.maxnobj.min(MAXNOBJ_GLOBAL).min(k)
    }
}

fn positive(value: f64, name: &'static str) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TrackError::InvalidParameter(name))
    }
}

// ============================================================================
// Ingest
// ============================================================================

/// Parameters of observation ingest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IngestParams {
    /// Feed teammate-shared positions into the filter
    pub use_teammates: bool,
    /// Teammate reports at or below this confidence are ignored
    pub min_teammate_confidence: f64,
    /// Minimum spacing between processed teammate reports (seconds)
    pub teammate_update_interval: f64,
}

impl Default for IngestParams {
    fn default() -> Self {
        Self {
            use_teammates: true,
            min_teammate_confidence: 0.5,
            teammate_update_interval: 0.05,
        }
    }
}

impl IngestParams {
    /// Checks every parameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.teammate_update_interval >= 0.0) {
            return Err(TrackError::InvalidParameter("teammate_update_interval"));
        }
        if !self.min_teammate_confidence.is_finite() {
            return Err(TrackError::InvalidParameter("min_teammate_confidence"));
        }
        Ok(())
    }
}

// ============================================================================
// Trackers
// ============================================================================

/// Parameters of the ball tracker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BallParams {
    /// Sequence-clustering core
    pub clustering: ClusteringParams,
    /// Observation ingest
    pub ingest: IngestParams,
    /// Per-second confidence decay factor in (0, 1]
    pub confidence_decay: f64,
    /// Published confidence is forced to 0 beyond this age (seconds)
    pub ball_time_to_forget: f64,
}

impl Default for BallParams {
    fn default() -> Self {
        Self {
            clustering: ClusteringParams::ball_defaults(),
            ingest: IngestParams {
                use_teammates: false,
                ..IngestParams::default()
            },
            confidence_decay: 0.8,
            ball_time_to_forget: 1.0,
        }
    }
}

impl BallParams {
    /// Checks every parameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.ingest.validate()?;
        decay(self.confidence_decay)?;
        if !(self.ball_time_to_forget >= 0.0) {
            return Err(TrackError::InvalidParameter("ball_time_to_forget"));
        }
        Ok(())
    }
}

/// Parameters of the obstacle tracker.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObstacleParams {
    /// Sequence-clustering core
    pub clustering: ClusteringParams,
    /// Observation ingest
    pub ingest: IngestParams,
    /// Per-second confidence decay factor in (0, 1]
    pub confidence_decay: f64,
}

impl Default for ObstacleParams {
    fn default() -> Self {
        Self {
            clustering: ClusteringParams::obstacle_defaults(),
            ingest: IngestParams::default(),
            confidence_decay: 0.8,
        }
    }
}

impl ObstacleParams {
    /// Checks every parameter against its valid range.
    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.ingest.validate()?;
        decay(self.confidence_decay)
    }
}

fn decay(rate: f64) -> Result<()> {
    if rate > 0.0 && rate <= 1.0 {
        Ok(())
    } else {
        Err(TrackError::InvalidParameter("confidence_decay"))
    }
}
