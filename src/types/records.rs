//! Observation and published track records
//!
//! These are the shapes exchanged with the surrounding component's schema
//! layer: raw sensor reports going in, tracked objects and ball snapshots
//! coming out.

use super::labels::{ObjectClass, SourceLabel, Uid};
use super::spaces::{Position, Velocity};
use crate::{Result, TrackError};

// ============================================================================
// Inputs
// ============================================================================

/// An object reported by own vision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionCandidate<const D: usize> {
    /// Position in field coordinates
    pub position: [f64; D],
    /// Object radius, 0 if unknown
    pub radius: f64,
    /// Time of the observation, seconds
    pub timestamp: f64,
    /// Detector confidence
    pub confidence: f64,
}

impl<const D: usize> VisionCandidate<D> {
    /// A candidate with unknown radius and full confidence.
    pub fn new(position: [f64; D], timestamp: f64) -> Self {
        Self {
            position,
            radius: 0.0,
            timestamp,
            confidence: 1.0,
        }
    }

    /// Sets the radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

/// A ball candidate from vision (x, y, z).
pub type BallCandidate = VisionCandidate<3>;

/// An obstacle candidate from vision (x, y).
pub type ObstacleCandidate = VisionCandidate<2>;

/// A self-position shared by a teammate.
///
/// The teammate index is the report's index in the tick's teammate slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeammateReport<const D: usize> {
    /// Reported own position of the teammate
    pub position: [f64; D],
    /// Radius of the teammate's body
    pub radius: f64,
    /// Time the position was valid
    pub timestamp: f64,
    /// Teammate's confidence in its own localisation
    pub confidence: f64,
}

impl<const D: usize> TeammateReport<D> {
    /// Creates a report.
    pub fn new(position: [f64; D], timestamp: f64, confidence: f64) -> Self {
        Self {
            position,
            radius: 0.0,
            timestamp,
            confidence,
        }
    }
}

/// A normalised observation, ready for association.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<const D: usize> {
    /// Observed position
    pub position: Position<D>,
    /// Observed radius, 0 if unknown
    pub radius: f64,
    /// Who reported the observation
    pub source: SourceLabel,
    /// Time of the observation, seconds
    pub timestamp: f64,
    /// Reported confidence
    pub confidence: f64,
}

impl<const D: usize> Observation<D> {
    /// The zero observation used to fill unused buffer slots.
    pub fn placeholder() -> Self {
        Self {
            position: Position::zeros(),
            radius: 0.0,
            source: SourceLabel::Vision,
            timestamp: 0.0,
            confidence: 0.0,
        }
    }

    pub(crate) fn from_vision(candidate: &VisionCandidate<D>) -> Self {
        Self {
            position: Position::from_array(candidate.position),
            radius: candidate.radius,
            source: SourceLabel::Vision,
            timestamp: candidate.timestamp,
            confidence: candidate.confidence,
        }
    }

    /// Observation of a teammate's shared position.
    ///
    /// Stamped with the time the position was valid, not the tick time, so
    /// association predicts tracks to when the teammate actually stood there.
    pub(crate) fn from_teammate(index: u8, report: &TeammateReport<D>) -> Self {
        Self {
            position: Position::from_array(report.position),
            radius: report.radius,
            source: SourceLabel::Teammate(index),
            timestamp: report.timestamp,
            confidence: report.confidence,
        }
    }
}

impl<const D: usize> Default for Observation<D> {
    fn default() -> Self {
        Self::placeholder()
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// A published obstacle track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackedObject {
    /// Identity of the underlying track
    pub uid: Uid,
    /// Own team / opposing team / unknown
    pub class: ObjectClass,
    /// Source of the last associated observation
    pub source: SourceLabel,
    /// Position at `timestamp`
    pub position: Position<2>,
    /// Velocity estimate
    pub velocity: Velocity<2>,
    /// Object radius
    pub radius: f64,
    /// Time the record is valid for
    pub timestamp: f64,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl TrackedObject {
    /// Numeric source label: 0 for vision, teammate index + 1 otherwise.
    #[inline]
    pub fn label(&self) -> u32 {
        self.source.code()
    }
}

/// A published ball state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BallSnapshot {
    /// Identity of the tracked ball candidate
    pub uid: Uid,
    /// Position (x, y, z) at `timestamp`
    pub position: Position<3>,
    /// Velocity (vx, vy, vz)
    pub velocity: Velocity<3>,
    /// Time the snapshot is valid for
    pub timestamp: f64,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

// ============================================================================
// Object Table
// ============================================================================

/// Fixed-size table of published objects.
///
/// Slots beyond `len` always hold the zero object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTable<const N: usize> {
    objects: [TrackedObject; N],
    len: usize,
}

impl<const N: usize> ObjectTable<N> {
    /// Creates a table of zero objects.
    pub fn new() -> Self {
        Self {
            objects: [TrackedObject::default(); N],
            len: 0,
        }
    }

    /// Appends an object.
    pub fn push(&mut self, object: TrackedObject) -> Result<()> {
        if self.len >= N {
            return Err(TrackError::CapacityExceeded);
        }
        self.objects[self.len] = object;
        self.len += 1;
        Ok(())
    }

    /// Zeroes every slot.
    pub fn clear(&mut self) {
        self.objects = [TrackedObject::default(); N];
        self.len = 0;
    }

    /// Number of valid objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no object is published.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid objects.
    #[inline]
    pub fn as_slice(&self) -> &[TrackedObject] {
        &self.objects[..self.len]
    }

    /// Every slot, valid and zeroed alike.
    #[inline]
    pub fn slots(&self) -> &[TrackedObject; N] {
        &self.objects
    }

    /// Iterates over the valid objects.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.as_slice().iter()
    }
}

impl<const N: usize> Default for ObjectTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
