//! Ball tracker
//!
//! Tracks up to [`MAX_BALL_CANDIDATES`] competing ball candidates per
//! hypothesis in 3-D and publishes the most confidently tracked one.

use tracing::trace;

use super::context::{FilterContext, TickMode};
use crate::association::{select_ball, selected_uid, AssociationEngine};
use crate::config::BallParams;
use crate::types::records::{BallCandidate, BallSnapshot};
use crate::utils::extrapolation::{publish_ball, BallPublishConfig};
use crate::{Result, TrackError, MAX_BALL_CANDIDATES};

/// Filter context of the ball tracker.
pub type BallContext = FilterContext<3, MAX_BALL_CANDIDATES>;

/// Ball records published by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BallOutput {
    /// State at the last associated observation
    pub ball: Option<BallSnapshot>,
    /// State extrapolated to the tick time
    pub ball_now: Option<BallSnapshot>,
    /// `ball` as published on the previous tick
    pub ball_prev: Option<BallSnapshot>,
    /// A filter fault is pending
    pub filter_error: bool,
    /// New-object branches refused for capacity this tick
    pub capacity_warnings: usize,
    /// Observations dropped beyond the buffer capacity this tick
    pub dropped_observations: usize,
}

/// Multi-hypothesis ball tracker.
#[derive(Debug, Clone)]
pub struct BallTracker {
    context: BallContext,
    /// Last tracked ball, kept after its track is retired
    tracked: Option<BallSnapshot>,
    last_output: BallOutput,
}

impl BallTracker {
    /// Creates a tracker; it initialises itself on the first tick.
    pub fn new() -> Self {
        Self {
            context: BallContext::new(),
            tracked: None,
            last_output: BallOutput::default(),
        }
    }

    /// The filter context.
    #[inline]
    pub fn context(&self) -> &BallContext {
        &self.context
    }

    /// The filter context, mutably.
    #[inline]
    pub fn context_mut(&mut self) -> &mut BallContext {
        &mut self.context
    }

    /// Output of the last tick.
    #[inline]
    pub fn last_output(&self) -> &BallOutput {
        &self.last_output
    }

    /// Runs one tick over this tick's vision ball candidates.
    ///
    /// Fails with [`TrackError::InvalidParameter`] without touching any
    /// state if `params` or `timestamp` are out of range. When nothing is
    /// tracked any more the last tracked ball keeps being published with
    /// decaying confidence.
    pub fn tick(
        &mut self,
        timestamp: f64,
        candidates: &[BallCandidate],
        params: &BallParams,
    ) -> Result<BallOutput> {
        if !timestamp.is_finite() {
            return Err(TrackError::InvalidParameter("timestamp"));
        }
        params.validate()?;
        let engine = AssociationEngine::new(&params.clustering, MAX_BALL_CANDIDATES)?;

        if self.context.begin_tick(timestamp) == TickMode::Frozen {
            self.last_output = BallOutput {
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
            candidates,
            &[],
            &params.ingest,
            params.clustering.maxage,
        );

        if !report.fault {
            let selected = select_ball(self.context.store());
            self.context
                .store_mut()
                .set_selected_uid(selected_uid(selected.as_ref()));
            if let Some(snapshot) = selected {
                trace!("Selected ball {} at confidence {:.3}", snapshot.uid, snapshot.confidence);
                self.tracked = Some(snapshot);
            }
        }

        let config = BallPublishConfig::new(params.confidence_decay, params.ball_time_to_forget);
        let published = self
            .tracked
            .as_ref()
            .map(|snapshot| publish_ball(snapshot, timestamp, &config));

        let output = BallOutput {
            ball: published.map(|p| p.ball),
            ball_now: published.map(|p| p.ball_now),
            ball_prev: self.last_output.ball,
            filter_error: self.context.has_error(),
            capacity_warnings: report.stats.capacity_warnings,
            dropped_observations: report.dropped,
        };
        self.context.end_tick(&report, usize::from(output.ball.is_some()));
        self.last_output = output;
        Ok(output)
    }
}

impl Default for BallTracker {
    fn default() -> Self {
        Self::new()
    }
}
