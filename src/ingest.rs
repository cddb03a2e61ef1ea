//! Observation ingest
//!
//! Normalises the raw reports of one tick (own vision, teammate-shared
//! positions) into a bounded, ordered observation batch, filtering out data
//! that was already processed on an earlier tick.

use tracing::{debug, trace, warn};

use crate::config::IngestParams;
use crate::types::records::{Observation, TeammateReport, VisionCandidate};
use crate::{Result, TrackError, OBSERVATION_CAPACITY};

// ============================================================================
// Source Clock
// ============================================================================

/// Newest timestamp already processed, per observation source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceClock {
    /// Newest processed vision timestamp
    pub last_vision_ts: f64,
    /// Newest processed teammate-report timestamp
    pub last_teammate_ts: f64,
}

impl SourceClock {
    /// A clock that has processed nothing yet.
    pub const fn new() -> Self {
        Self {
            last_vision_ts: -1.0,
            last_teammate_ts: -1.0,
        }
    }
}

impl Default for SourceClock {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Observation Batch
// ============================================================================

/// The observations accepted on one tick.
///
/// The batch always has [`OBSERVATION_CAPACITY`] slots; slots past `len`
/// hold placeholder (zero) observations.
#[derive(Debug, Clone, Copy)]
pub struct ObservationBatch<const D: usize> {
    slots: [Observation<D>; OBSERVATION_CAPACITY],
    len: usize,
    dropped: usize,
}

impl<const D: usize> ObservationBatch<D> {
    /// An empty batch of placeholders.
    pub fn new() -> Self {
        Self {
            slots: [Observation::placeholder(); OBSERVATION_CAPACITY],
            len: 0,
            dropped: 0,
        }
    }

    fn push(&mut self, observation: Observation<D>) -> Result<()> {
        if self.len >= OBSERVATION_CAPACITY {
            self.dropped += 1;
            return Err(TrackError::CapacityExceeded);
        }
        self.slots[self.len] = observation;
        self.len += 1;
        Ok(())
    }

    /// Number of accepted observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing was accepted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Observations dropped because the batch was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The accepted observations, in acceptance order.
    #[inline]
    pub fn as_slice(&self) -> &[Observation<D>] {
        &self.slots[..self.len]
    }

    /// Every slot, including placeholders.
    #[inline]
    pub fn slots(&self) -> &[Observation<D>; OBSERVATION_CAPACITY] {
        &self.slots
    }
}

impl<const D: usize> Default for ObservationBatch<D> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Ingest
// ============================================================================

/// Builds this tick's observation batch and advances the source clock.
///
/// Vision observations are accepted when newer than the last processed vision
/// timestamp. Teammate reports are accepted when their confidence exceeds
/// `min_teammate_confidence` and they are newer than the last processed
/// teammate timestamp plus `teammate_update_interval`; they are labelled with
/// the teammate's index + 1. A source's clock only advances if at least one of
/// its observations made it into the batch.
pub fn ingest<const D: usize>(
    vision: &[VisionCandidate<D>],
    teammates: &[TeammateReport<D>],
    clock: &mut SourceClock,
    params: &IngestParams,
) -> ObservationBatch<D> {
    let mut batch = ObservationBatch::new();

    let newest_vision = vision
        .iter()
        .map(|c| c.timestamp)
        .fold(f64::NEG_INFINITY, f64::max);

    if newest_vision > clock.last_vision_ts {
        let mut accepted = false;
        for candidate in vision.iter().filter(|c| c.timestamp > clock.last_vision_ts) {
            let observation = Observation::from_vision(candidate);
            if !observation.position.is_finite() || !observation.timestamp.is_finite() {
                trace!("Dropping non-finite vision observation");
                continue;
            }
            if batch.push(observation).is_ok() {
                accepted = true;
            }
        }
        if accepted {
            clock.last_vision_ts = newest_vision;
        }
    }

    if params.use_teammates {
        let newest_teammate = teammates
            .iter()
            .map(|r| r.timestamp)
            .fold(f64::NEG_INFINITY, f64::max);

        if newest_teammate > clock.last_teammate_ts {
            let threshold = clock.last_teammate_ts + params.teammate_update_interval;
            let mut accepted = false;
            for (index, report) in teammates.iter().enumerate() {
                if report.confidence <= params.min_teammate_confidence || report.timestamp <= threshold {
                    continue;
                }
                let Ok(index) = u8::try_from(index) else {
                    trace!("Dropping report of teammate {} beyond label range", index);
                    continue;
                };
                let observation = Observation::from_teammate(index, report);
                if !observation.position.is_finite() || !observation.timestamp.is_finite() {
                    trace!("Dropping non-finite teammate observation");
                    continue;
                }
                if batch.push(observation).is_ok() {
                    accepted = true;
                }
            }
            if accepted {
                clock.last_teammate_ts = newest_teammate;
            }
        }
    }

    if batch.dropped() > 0 {
        warn!(
            "More observations this tick than can be handled: dropped {} beyond capacity {}",
            batch.dropped(),
            OBSERVATION_CAPACITY
        );
    }
    debug!(
        "Ingested {} observations ({} vision reports, {} teammate reports)",
        batch.len(),
        vision.len(),
        teammates.len()
    );

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::labels::SourceLabel;

    fn vision(x: f64, ts: f64) -> VisionCandidate<2> {
        VisionCandidate::new([x, 0.0], ts)
    }

    #[test]
    fn test_vision_newer_than_clock_accepted() {
        let mut clock = SourceClock::new();
        let params = IngestParams::default();

        let batch = ingest(&[vision(1.0, 0.1), vision(2.0, 0.2)], &[], &mut clock, &params);
        assert_eq!(batch.len(), 2);
        assert!((clock.last_vision_ts - 0.2).abs() < 1e-12);

        // Same reports again: nothing new
        let batch = ingest(&[vision(1.0, 0.1), vision(2.0, 0.2)], &[], &mut clock, &params);
        assert!(batch.is_empty());

        // Only the newer one passes
        let batch = ingest(&[vision(1.0, 0.2), vision(3.0, 0.3)], &[], &mut clock, &params);
        assert_eq!(batch.len(), 1);
        assert!((batch.as_slice()[0].position[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_teammate_filtering_and_labels() {
        let mut clock = SourceClock::new();
        let params = IngestParams::default();
        let teammates = [
            TeammateReport::new([1.0, 1.0], 0.5, 0.9),
            TeammateReport::new([2.0, 2.0], 0.5, 0.3), // too unsure
            TeammateReport::new([3.0, 3.0], 0.5, 0.8),
        ];

        let batch = ingest::<2>(&[], &teammates, &mut clock, &params);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.as_slice()[0].source, SourceLabel::Teammate(0));
        assert_eq!(batch.as_slice()[1].source.code(), 3);
        assert!((clock.last_teammate_ts - 0.5).abs() < 1e-12);

        // Within the update interval of the last processed report
        let recent = [TeammateReport::new([1.0, 1.0], 0.53, 0.9)];
        let batch = ingest::<2>(&[], &recent, &mut clock, &params);
        assert!(batch.is_empty());
        assert!((clock.last_teammate_ts - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_clock_unchanged_without_acceptance() {
        let mut clock = SourceClock::new();
        let params = IngestParams::default();
        let teammates = [TeammateReport::new([1.0, 1.0], 0.5, 0.1)];

        let batch = ingest::<2>(&[], &teammates, &mut clock, &params);
        assert!(batch.is_empty());
        assert_eq!(clock, SourceClock::new());
    }

    #[test]
    fn test_teammates_disabled() {
        let mut clock = SourceClock::new();
        let params = IngestParams {
            use_teammates: false,
            ..IngestParams::default()
        };
        let teammates = [TeammateReport::new([1.0, 1.0], 0.5, 0.9)];

        assert!(ingest::<2>(&[], &teammates, &mut clock, &params).is_empty());
    }

    #[test]
    fn test_overflow_drops_excess_and_fills_placeholders() {
        let mut clock = SourceClock::new();
        let params = IngestParams::default();
        let mut many = [vision(0.0, 1.0); OBSERVATION_CAPACITY + 3];
        for (i, c) in many.iter_mut().enumerate() {
            c.position[0] = i as f64;
        }

        let batch = ingest(&many, &[], &mut clock, &params);
        assert_eq!(batch.len(), OBSERVATION_CAPACITY);
        assert_eq!(batch.dropped(), 3);

        let small = ingest(&[vision(1.0, 2.0)], &[], &mut clock, &params);
        assert_eq!(small.len(), 1);
        assert!(small.slots()[1..].iter().all(|o| *o == Observation::placeholder()));
    }

    #[test]
    fn test_non_finite_observations_dropped() {
        let mut clock = SourceClock::new();
        let params = IngestParams::default();
        let batch = ingest(&[VisionCandidate::new([f64::NAN, 0.0], 0.1)], &[], &mut clock, &params);
        assert!(batch.is_empty());
        assert_eq!(clock.last_vision_ts, -1.0);
    }

    #[test]
    fn test_non_finite_teammate_timestamp_dropped() {
        let mut clock = SourceClock::new();
        let params = IngestParams::default();
        let teammates = [
            TeammateReport::new([1.0, 1.0], 0.1, 0.9),
            TeammateReport::new([3.0, 3.0], f64::NAN, 0.9),
        ];

        let batch = ingest::<2>(&[], &teammates, &mut clock, &params);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.as_slice()[0].source, SourceLabel::Teammate(0));
        assert!((clock.last_teammate_ts - 0.1).abs() < 1e-12);
    }
}
