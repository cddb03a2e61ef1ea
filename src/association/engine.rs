//! Per-observation branching of the hypothesis set
//!
//! Every live hypothesis explains a new observation in one of three ways:
//! as a further sighting of one of its tracks, as an object not seen before,
//! or as clutter. The strongest children become the next generation.

use heapless::Vec;
use tracing::{trace, warn};

use crate::config::ClusteringParams;
use crate::hypothesis::{HypId, HypothesisStore, Track, TrackSlot};
use crate::models::{BranchPriors, GroundPlaneSensor, ObservationModel};
use crate::types::records::Observation;
use crate::utils::pruning::{prune, PruningConfig};
use crate::{Result, TrackError, MAXHYP};

// ============================================================================
// Branches
// ============================================================================

/// How a child hypothesis explains the observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    /// Further sighting of the parent's track in this slot
    Associate(TrackSlot),
    /// First sighting of a new object
    NewObject,
    /// False alarm
    Clutter,
}

/// A child hypothesis, described relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    /// Parent in the current generation
    pub parent: HypId,
    /// Explanation of the observation
    pub kind: BranchKind,
    /// Unnormalised child weight
    pub weight: f64,
}

/// The strongest [`MAXHYP`] children of one observation.
#[derive(Debug, Clone, Default)]
pub struct BranchBuffer {
    branches: Vec<Branch, MAXHYP>,
    refused: usize,
}

impl BranchBuffer {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            branches: Vec::new(),
            refused: 0,
        }
    }

    /// Offers a child.
    ///
    /// When the buffer is full the weakest child (possibly the offered one)
    /// is refused. Returns false if the offered child was refused.
    pub fn offer(&mut self, branch: Branch) -> bool {
        if !branch.weight.is_finite() {
            self.refused += 1;
            return false;
        }
        match self.branches.push(branch) {
            Ok(()) => true,
            Err(branch) => {
                self.refused += 1;
                let weakest = self
                    .branches
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        a.weight
                            .partial_cmp(&b.weight)
                            .unwrap_or(core::cmp::Ordering::Equal)
                    })
                    .map(|(i, b)| (i, b.weight));
                match weakest {
                    Some((i, weight)) if weight < branch.weight => {
                        self.branches[i] = branch;
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    /// Number of children held.
    #[inline]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// True if no child is held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Number of children refused so far.
    #[inline]
    pub fn refused(&self) -> usize {
        self.refused
    }

    /// The children held.
    #[inline]
    pub fn as_slice(&self) -> &[Branch] {
        &self.branches
    }
}

// ============================================================================
// Update Statistics
// ============================================================================

/// Statistics of an update, reporting absorbed per-observation issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Observations processed
    pub observations: usize,
    /// New-object branches refused because a hypothesis was full
    pub capacity_warnings: usize,
    /// Association branches outside the gate
    pub gated: usize,
    /// Children refused by the bounded candidate buffer
    pub refused_branches: usize,
}

// ============================================================================
// Association Engine
// ============================================================================

/// Branches, weights and prunes the hypothesis set per observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssociationEngine {
    sensor: GroundPlaneSensor,
    priors: BranchPriors,
    pruning: PruningConfig,
    kscale: f64,
    maxnobj: usize,
    nselect: usize,
}

impl AssociationEngine {
    /// Builds an engine for hypotheses of up to `k` tracks.
    ///
    /// Fails with [`TrackError::InvalidParameter`] on out-of-range parameters.
    pub fn new(params: &ClusteringParams, k: usize) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            sensor: GroundPlaneSensor::from_params(params)?,
            priors: BranchPriors::from_params(params)?,
            pruning: PruningConfig::from_params(params),
            kscale: params.kscale,
            maxnobj: params.effective_maxnobj(k),
            nselect: params.effective_nselect(),
        })
    }

    /// Maximum number of tracks per hypothesis.
    #[inline]
    pub fn maxnobj(&self) -> usize {
        self.maxnobj
    }

    /// Processes the first `nselect` observations in order.
    ///
    /// An empty slice leaves the store untouched. Fails with
    /// [`TrackError::FilterFault`] if the hypothesis set degenerates.
    pub fn update<const D: usize, const K: usize>(
        &self,
        store: &mut HypothesisStore<D, K>,
        observations: &[Observation<D>],
    ) -> Result<UpdateStats> {
        let mut stats = UpdateStats::default();
        for observation in observations.iter().take(self.nselect) {
            self.process(store, observation, &mut stats)?;
        }
        Ok(stats)
    }

    /// Replaces the hypothesis set with the strongest children explaining
    /// `observation`, normalised to a maximum weight of 1 and pruned.
    pub fn process<const D: usize, const K: usize>(
        &self,
        store: &mut HypothesisStore<D, K>,
        observation: &Observation<D>,
        stats: &mut UpdateStats,
    ) -> Result<()> {
        let branches = self.branches(store, observation, stats);
        stats.refused_branches += branches.refused();
        self.materialize(store, observation, &branches, stats)?;
        prune(store, &self.pruning)?;
        stats.observations += 1;
        trace!(
            "Observation at ({:.3}, {:.3}) from {:?}: {} hypotheses",
            observation.position[0],
            if D > 1 { observation.position[1] } else { 0.0 },
            observation.source,
            store.len()
        );
        Ok(())
    }

    /// Enumerates the children of every live hypothesis.
    pub fn branches<const D: usize, const K: usize>(
        &self,
        store: &HypothesisStore<D, K>,
        observation: &Observation<D>,
        stats: &mut UpdateStats,
    ) -> BranchBuffer {
        let mut buffer = BranchBuffer::new();
        let mut full = 0;

        for (parent, hypothesis) in store.iter() {
            let p = hypothesis.weight();

            for (slot, track) in hypothesis.tracks().iter().enumerate() {
                if !self.may_associate(track, observation) {
                    continue;
                }
                let predicted = track.predicted(observation.timestamp);
                if !self.sensor.gate(&predicted, &observation.position) {
                    stats.gated += 1;
                    continue;
                }
                let likelihood = self.sensor.likelihood(&predicted, &observation.position);
                buffer.offer(Branch {
                    parent,
                    kind: BranchKind::Associate(TrackSlot(slot)),
                    weight: p * self.priors.association() * likelihood,
                });
            }

            if hypothesis.len() < self.maxnobj {
                buffer.offer(Branch {
                    parent,
                    kind: BranchKind::NewObject,
                    weight: p * self.priors.new_object(),
                });
            } else {
                full += 1;
            }

            buffer.offer(Branch {
                parent,
                kind: BranchKind::Clutter,
                weight: p * self.priors.clutter(),
            });
        }

        if full > 0 {
            stats.capacity_warnings += full;
            warn!(
                "{} hypotheses hold {} objects already, observation cannot start a new track",
                full, self.maxnobj
            );
        }
        buffer
    }

    /// Teammate observations never join a track last seen by another
    /// teammate.
    fn may_associate<const D: usize>(&self, track: &Track<D>, observation: &Observation<D>) -> bool {
        let vetoed = observation.source.is_teammate()
            && track.source.is_teammate()
            && track.source != observation.source;
        if vetoed {
            trace!("Track {} reported by {:?}, not associating", track.uid, track.source);
        }
        !vetoed
    }

    /// Builds the next generation from the surviving children and swaps it
    /// in.
    fn materialize<const D: usize, const K: usize>(
        &self,
        store: &mut HypothesisStore<D, K>,
        observation: &Observation<D>,
        branches: &BranchBuffer,
        stats: &mut UpdateStats,
    ) -> Result<()> {
        if branches.is_empty() {
            warn!("No hypothesis explains the observation");
            return Err(TrackError::FilterFault);
        }

        {
            let (current, next, uids) = store.staging();
            for branch in branches.as_slice() {
                let mut child = current
                    .get(branch.parent.index())
                    .cloned()
                    .ok_or(TrackError::FilterFault)?;
                child.set_weight(branch.weight);

                match branch.kind {
                    BranchKind::Associate(slot) => {
                        child
                            .track_mut(slot)
                            .ok_or(TrackError::FilterFault)?
                            .absorb(observation, self.kscale);
                    }
                    BranchKind::NewObject => {
                        let track = Track::spawn(uids.next_uid(), observation);
                        if child.spawn_track(track, self.maxnobj).is_err() {
                            stats.capacity_warnings += 1;
                            continue;
                        }
                    }
                    BranchKind::Clutter => {}
                }

                next.push(child).map_err(|_| TrackError::CapacityExceeded)?;
            }
        }
        store.swap();
        Ok(())
    }
}
