//! Filter context
//!
//! Everything a tracker remembers between ticks, owned in one value and
//! threaded through each tick explicitly.

use tracing::{debug, warn};

use crate::association::{AssociationEngine, UpdateStats};
use crate::config::IngestParams;
use crate::hypothesis::HypothesisStore;
use crate::ingest::{ingest, SourceClock};
use crate::types::records::{TeammateReport, VisionCandidate};
use crate::utils::pruning::{check_health, retire_stale_tracks};

/// What a tick may do after [`FilterContext::begin_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// Process observations normally
    Run,
    /// A fault is pending and reset-on-error is off; publish nothing new
    Frozen,
}

/// Outcome of one filter cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Observations accepted by ingest
    pub accepted: usize,
    /// Observations dropped beyond the buffer capacity
    pub dropped: usize,
    /// Association statistics
    pub stats: UpdateStats,
    /// Tracks retired for age
    pub retired: usize,
    /// The cycle hit a filter fault
    pub fault: bool,
}

/// Persistent state of one tracker.
#[derive(Debug, Clone)]
pub struct FilterContext<const D: usize, const K: usize> {
    store: HypothesisStore<D, K>,
    clock: SourceClock,
    initialized: bool,
    error: bool,
    reset_on_error: bool,
    tick_counter: u64,
}

impl<const D: usize, const K: usize> FilterContext<D, K> {
    /// Creates an uninitialised context with reset-on-error enabled.
    pub const fn new() -> Self {
        Self {
            store: HypothesisStore::new(),
            clock: SourceClock::new(),
            initialized: false,
            error: false,
            reset_on_error: true,
            tick_counter: 0,
        }
    }

    /// True once [`initialize`](Self::initialize) has run.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resets the hypothesis store and clears the error flag.
    ///
    /// The per-source clocks are kept, so observations processed before are
    /// not replayed.
    pub fn initialize(&mut self, timestamp: f64) {
        self.store.initialize(timestamp);
        self.error = false;
        self.initialized = true;
    }

    /// True while a filter fault is pending.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Acknowledges a pending fault; the next tick reinitialises the store.
    pub fn clear_error(&mut self) {
        if self.error {
            self.error = false;
            self.initialized = false;
        }
    }

    /// Whether a fault reinitialises the store at the start of the next tick.
    #[inline]
    pub fn reset_on_error(&self) -> bool {
        self.reset_on_error
    }

    /// Sets the reset-on-error policy.
    #[inline]
    pub fn set_reset_on_error(&mut self, enabled: bool) {
        self.reset_on_error = enabled;
    }

    /// Number of ticks started.
    #[inline]
    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    /// The hypothesis store.
    #[inline]
    pub fn store(&self) -> &HypothesisStore<D, K> {
        &self.store
    }

    /// The hypothesis store, mutably.
    #[inline]
    pub fn store_mut(&mut self) -> &mut HypothesisStore<D, K> {
        &mut self.store
    }

    /// Newest processed timestamps per source.
    #[inline]
    pub fn clock(&self) -> &SourceClock {
        &self.clock
    }

    pub(crate) fn raise_error(&mut self) {
        self.error = true;
    }

    /// Starts a tick: lazily initialises and handles a pending fault.
    pub(crate) fn begin_tick(&mut self, timestamp: f64) -> TickMode {
        self.tick_counter += 1;
        debug!("Tick {} start at t={:.3}", self.tick_counter, timestamp);

        if !self.initialized {
            self.initialize(timestamp);
        }
        if self.error {
            if !self.reset_on_error {
                warn!("Filter fault pending, tick {} frozen", self.tick_counter);
                return TickMode::Frozen;
            }
            warn!("Reinitialising after filter fault");
            self.initialize(timestamp);
        }
        TickMode::Run
    }

    /// Ingests the tick's observations and runs association, end-of-tick
    /// smoothing and age retirement.
    ///
    /// A structural failure raises the error flag and is reported in the
    /// returned [`CycleReport`].
    pub(crate) fn run_cycle(
        &mut self,
        timestamp: f64,
        engine: &AssociationEngine,
        vision: &[VisionCandidate<D>],
        teammates: &[TeammateReport<D>],
        ingest_params: &IngestParams,
        maxage: f64,
    ) -> CycleReport {
        let batch = ingest(vision, teammates, &mut self.clock, ingest_params);
        let mut report = CycleReport {
            accepted: batch.len(),
            dropped: batch.dropped(),
            ..CycleReport::default()
        };

        match engine.update(&mut self.store, batch.as_slice()) {
            Ok(stats) => report.stats = stats,
            Err(err) => {
                warn!("Association failed at t={:.3}: {}", timestamp, err);
                report.fault = true;
            }
        }
        if !report.fault {
            if report.stats.observations > 0 {
                self.store.end_tick();
            }
            report.retired = retire_stale_tracks(&mut self.store, timestamp, maxage);
            if let Err(err) = check_health(&self.store) {
                warn!("Hypothesis set unhealthy at t={:.3}: {}", timestamp, err);
                report.fault = true;
            }
        }
        if report.fault {
            self.raise_error();
        }
        report
    }

    /// Logs the end of a tick.
    pub(crate) fn end_tick(&self, report: &CycleReport, published: usize) {
        debug!(
            "Tick {} end: {} observations, {} hypotheses, {} published",
            self.tick_counter,
            report.stats.observations,
            self.store.len(),
            published
        );
    }
}

impl<const D: usize, const K: usize> Default for FilterContext<D, K> {
    fn default() -> Self {
        Self::new()
    }
}
