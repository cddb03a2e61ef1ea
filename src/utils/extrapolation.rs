//! Extrapolation and publication of track estimates
//!
//! Published estimates are projected to the query time under constant
//! velocity, and their confidence decays with the time since the last
//! associated observation.

use num_traits::Float;
use tracing::warn;

use crate::hypothesis::Hypothesis;
use crate::types::records::{BallSnapshot, ObjectTable, TrackedObject};
use crate::types::spaces::{Position, Velocity};

/// Constant-velocity projection: `position + time_leap * velocity`.
#[inline]
pub fn extrapolate<const N: usize>(
    position: &Position<N>,
    velocity: &Velocity<N>,
    time_leap: f64,
) -> Position<N> {
    position.advanced(velocity, time_leap)
}

/// Confidence after `age` seconds: `confidence * decay_rate^age`.
///
/// Negative ages count as zero.
#[inline]
pub fn decay_confidence(confidence: f64, decay_rate: f64, age: f64) -> f64 {
    confidence * Float::powf(decay_rate, age.max(0.0))
}

/// Confidence forced to 0 once `age` exceeds `time_to_forget`.
#[inline]
pub fn forget(confidence: f64, age: f64, time_to_forget: f64) -> f64 {
    if age > time_to_forget {
        0.0
    } else {
        confidence
    }
}

// ============================================================================
// Ball
// ============================================================================

/// Configuration of ball publication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallPublishConfig {
    /// Per-second confidence decay factor
    pub decay_rate: f64,
    /// Published confidence is 0 beyond this age (seconds)
    pub time_to_forget: f64,
}

impl BallPublishConfig {
    /// Creates a configuration.
    pub fn new(decay_rate: f64, time_to_forget: f64) -> Self {
        Self {
            decay_rate,
            time_to_forget,
        }
    }
}

/// The two ball records published per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallPublication {
    /// State at the last associated observation
    pub ball: BallSnapshot,
    /// State extrapolated to the tick time, with decayed confidence
    pub ball_now: BallSnapshot,
}

/// Builds the published ball records from a tracked snapshot at `timestamp`.
pub fn publish_ball(
    snapshot: &BallSnapshot,
    timestamp: f64,
    config: &BallPublishConfig,
) -> BallPublication {
    let age = (timestamp - snapshot.timestamp).max(0.0);

    let ball = BallSnapshot {
        confidence: forget(snapshot.confidence, age, config.time_to_forget),
        ..*snapshot
    };
    let ball_now = BallSnapshot {
        position: extrapolate(&snapshot.position, &snapshot.velocity, age),
        timestamp,
        confidence: forget(
            decay_confidence(snapshot.confidence, config.decay_rate, age),
            age,
            config.time_to_forget,
        ),
        ..*snapshot
    };

    BallPublication { ball, ball_now }
}

// ============================================================================
// Obstacles
// ============================================================================

/// Configuration of obstacle publication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPublishConfig {
    /// Robot's own position, centre of the clip disc
    pub own_position: Position<2>,
    /// Published positions are clipped to this radius (metres)
    pub clipradius: f64,
    /// Per-second confidence decay factor
    pub decay_rate: f64,
    /// Minimum label score of own-team objects
    pub labelbound: f64,
}

/// Publishes every track of a hypothesis, extrapolated to `timestamp`.
///
/// Positions are clipped to `clipradius` around the robot; unused table
/// slots stay zeroed.
pub fn publish_objects<const K: usize, const N: usize>(
    hypothesis: &Hypothesis<2, K>,
    timestamp: f64,
    config: &ObjectPublishConfig,
) -> ObjectTable<N> {
    let mut table = ObjectTable::new();

    for track in hypothesis.tracks() {
        let age = track.age(timestamp);
        let position = extrapolate(&track.position, &track.velocity, age)
            .clipped_to(&config.own_position, config.clipradius);
        let object = TrackedObject {
            uid: track.uid,
            class: track.class(config.labelbound),
            source: track.source,
            position,
            velocity: track.velocity,
            radius: track.radius,
            timestamp,
            confidence: decay_confidence(track.confidence(), config.decay_rate, age),
        };
        if table.push(object).is_err() {
            warn!("More tracks than publishable objects, dropping {}", track.uid);
            break;
        }
    }

    table
}
