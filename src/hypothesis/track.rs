//! A single tracked object inside a hypothesis

use crate::types::labels::{ObjectClass, SourceLabel, Uid};
use crate::types::records::Observation;
use crate::types::ring::{MovingAverage, RingBuffer};
use crate::types::spaces::{Position, Velocity};
use crate::{FEATURE_HISTORY, MA_N};

/// Number of samples in a track's smoothing windows.
pub const MA_WINDOW: usize = MA_N + 1;

/// Seed of the smoothed confidence of a freshly spawned track.
pub const CONFIDENCE_SEED: f64 = 0.01;

/// Minimum time spread of the feature history for a velocity fit (seconds).
const MIN_FIT_SPAN: f64 = 1e-6;

// ============================================================================
// Feature
// ============================================================================

/// An associated observation remembered by a track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Feature<const D: usize> {
    /// Observed position
    pub position: Position<D>,
    /// Observation time
    pub timestamp: f64,
}

// ============================================================================
// Track
// ============================================================================

/// Kinematic and bookkeeping state of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<const D: usize> {
    /// Stable identity across ticks
    pub uid: Uid,
    /// Position at `last_update`
    pub position: Position<D>,
    /// Constant-velocity estimate
    pub velocity: Velocity<D>,
    /// Object radius, 0 if unknown
    pub radius: f64,
    /// Time the track was spawned
    pub birth_time: f64,
    /// Time of the last associated observation
    pub last_update: f64,
    /// Source of the last associated observation
    pub source: SourceLabel,
    /// Set while an observation was associated during the current tick
    pub(crate) detected: bool,
    confidence: MovingAverage<MA_WINDOW>,
    label_score: MovingAverage<MA_WINDOW>,
    history: RingBuffer<Feature<D>, FEATURE_HISTORY>,
}

impl<const D: usize> Track<D> {
    /// Spawns a track at an observation.
    pub fn spawn(uid: Uid, observation: &Observation<D>) -> Self {
        let teammate = if observation.source.is_teammate() { 1.0 } else { 0.0 };
        let mut history = RingBuffer::new(Feature::default());
        history.push(Feature {
            position: observation.position,
            timestamp: observation.timestamp,
        });

        Self {
            uid,
            position: observation.position,
            velocity: Velocity::zeros(),
            radius: observation.radius,
            birth_time: observation.timestamp,
            last_update: observation.timestamp,
            source: observation.source,
            detected: true,
            confidence: MovingAverage::seeded(CONFIDENCE_SEED),
            label_score: MovingAverage::seeded(teammate),
            history,
        }
    }

    /// Position predicted at `timestamp` under constant velocity.
    ///
    /// Never predicts backwards in time.
    #[inline]
    pub fn predicted(&self, timestamp: f64) -> Position<D> {
        let dt = (timestamp - self.last_update).max(0.0);
        self.position.advanced(&self.velocity, dt)
    }

    /// Blends the track toward an associated observation.
    ///
    /// The position moves from the prediction toward the observation by
    /// `kscale`; the velocity is refitted over the feature history.
    pub fn absorb(&mut self, observation: &Observation<D>, kscale: f64) {
        let predicted = self.predicted(observation.timestamp);
        self.position = predicted + (observation.position - predicted).scale(kscale);
        self.history.push(Feature {
            position: observation.position,
            timestamp: observation.timestamp,
        });
        if let Some(velocity) = self.fit_velocity() {
            self.velocity = velocity;
        }
        if observation.radius > 0.0 {
            self.radius = observation.radius;
        }
        self.last_update = self.last_update.max(observation.timestamp);
        self.source = observation.source;
        self.label_score
            .push(if observation.source.is_teammate() { 1.0 } else { 0.0 });
        self.detected = true;
    }

    /// Least-squares slope of the feature history, per axis.
    ///
    /// Returns `None` while the history is too short or too compressed in
    /// time to fit.
    fn fit_velocity(&self) -> Option<Velocity<D>> {
        let n = self.history.len();
        if n < 2 {
            return None;
        }
        let t_mean = self.history.iter().map(|f| f.timestamp).sum::<f64>() / n as f64;
        let spread = self
            .history
            .iter()
            .map(|f| (f.timestamp - t_mean) * (f.timestamp - t_mean))
            .sum::<f64>();
        if spread < MIN_FIT_SPAN * MIN_FIT_SPAN {
            return None;
        }

        let mut mean = [0.0; D];
        for feature in self.history.iter() {
            for (m, x) in mean.iter_mut().zip(feature.position.as_slice()) {
                *m += x / n as f64;
            }
        }
        let mut slope = [0.0; D];
        for feature in self.history.iter() {
            let dt = feature.timestamp - t_mean;
            for ((s, x), m) in slope.iter_mut().zip(feature.position.as_slice()).zip(mean.iter()) {
                *s += dt * (x - m) / spread;
            }
        }

        let velocity = Velocity::from_array(slope);
        velocity.is_finite().then_some(velocity)
    }

    /// Closes a tick: the smoothed confidence records whether an observation
    /// was associated.
    pub fn end_tick(&mut self) {
        self.confidence.push(if self.detected { 1.0 } else { 0.0 });
        self.detected = false;
    }

    /// Time since the last associated observation, never negative.
    #[inline]
    pub fn age(&self, timestamp: f64) -> f64 {
        (timestamp - self.last_update).max(0.0)
    }

    /// Smoothed confidence in [0, 1].
    #[inline]
    pub fn confidence(&self) -> f64 {
        self.confidence.mean()
    }

    /// Moving average of "observed by a teammate".
    #[inline]
    pub fn label_score(&self) -> f64 {
        self.label_score.mean()
    }

    /// Classification of the object.
    #[inline]
    pub fn class(&self, labelbound: f64) -> ObjectClass {
        ObjectClass::from_label_score(self.label_score(), labelbound)
    }

    /// True while an observation was associated this tick.
    #[inline]
    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// Number of remembered observations.
    #[inline]
    pub fn feature_count(&self) -> usize {
        self.history.len()
    }
}
