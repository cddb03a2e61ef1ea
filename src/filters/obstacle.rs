//! Obstacle tracker
//!
//! Tracks other robots on the ground plane from own vision and from the
//! positions teammates share, and publishes every track of the winning
//! hypothesis.

use super::context::{FilterContext, TickMode};
use crate::association::{winning_hypothesis, AssociationEngine};
use crate::config::ObstacleParams;
use crate::types::records::{ObjectTable, ObstacleCandidate, TeammateReport};
use crate::types::spaces::Position;
use crate::utils::extrapolation::{publish_objects, ObjectPublishConfig};
use crate::{Result, TrackError, MAXNOBJ_GLOBAL};

/// Filter context of the obstacle tracker.
pub type ObstacleContext = FilterContext<2, MAXNOBJ_GLOBAL>;

/// Objects published by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObstacleOutput {
    /// Published objects; stale slots are zeroed
    pub objects: ObjectTable<MAXNOBJ_GLOBAL>,
    /// A filter fault is pending
    pub filter_error: bool,
    /// New-object branches refused for capacity this tick
    pub capacity_warnings: usize,
    /// Observations dropped beyond the buffer capacity this tick
    pub dropped_observations: usize,
}

/// Multi-hypothesis obstacle tracker.
#[derive(Debug, Clone)]
pub struct ObstacleTracker {
    context: ObstacleContext,
    last_output: ObstacleOutput,
}

impl ObstacleTracker {
    /// Creates a tracker; it initialises itself on the first tick.
    pub fn new() -> Self {
        Self {
            context: ObstacleContext::new(),
            last_output: ObstacleOutput::default(),
        }
    }

    /// The filter context.
    #[inline]
    pub fn context(&self) -> &ObstacleContext {
        &self.context
    }

    /// The filter context, mutably.
    #[inline]
    pub fn context_mut(&mut self) -> &mut ObstacleContext {
        &mut self.context
    }

    /// Output of the last tick.
    #[inline]
    pub fn last_output(&self) -> &ObstacleOutput {
        &self.last_output
    }

    /// Runs one tick.
    ///
    /// `vision` are own obstacle sightings; `teammates[i]` is the position
    /// shared by teammate `i`. Published positions are extrapolated to
    /// `timestamp` and clipped around `own_position`.
    pub fn tick(
        &mut self,
        timestamp: f64,
        own_position: Position<2>,
        vision: &[ObstacleCandidate],
        teammates: &[TeammateReport<2>],
        params: &ObstacleParams,
    ) -> Result<ObstacleOutput> {
        if !timestamp.is_finite() {
            return Err(TrackError::InvalidParameter("timestamp"));
        }
        if !own_position.is_finite() {
            return Err(TrackError::InvalidParameter("own_position"));
        }
        params.validate()?;
        let engine = AssociationEngine::new(&params.clustering, MAXNOBJ_GLOBAL)?;

        if self.context.begin_tick(timestamp) == TickMode::Frozen {
            self.last_output = ObstacleOutput {
                filter_error: true,
                capacity_warnings: 0,
                dropped_observations: 0,
                ..self.last_output
            };
            return Ok(self.last_output);
        }

        let report = self.context.run_cycle(
            timestamp,
            &engine,
            vision,
            teammates,
            &params.ingest,
            params.clustering.maxage,
        );

        // A faulted cycle leaves the store unusable; keep the last objects
        let objects = match (report.fault, winning_hypothesis(self.context.store())) {
            (true, _) => self.last_output.objects,
            (false, Some(hypothesis)) => {
                let config = ObjectPublishConfig {
                    own_position,
                    clipradius: params.clustering.clipradius,
                    decay_rate: params.confidence_decay,
                    labelbound: params.clustering.labelbound,
                };
                publish_objects(hypothesis, timestamp, &config)
            }
            (false, None) => ObjectTable::new(),
        };

        let output = ObstacleOutput {
            objects,
            filter_error: self.context.has_error(),
            capacity_warnings: report.stats.capacity_warnings,
            dropped_observations: report.dropped,
        };
        self.context.end_tick(&report, output.objects.len());
        self.last_output = output;
        Ok(output)
    }
}

impl Default for ObstacleTracker {
    fn default() -> Self {
        Self::new()
    }
}
