//! Hypotheses and the fixed-capacity hypothesis store

use heapless::Vec;
use tracing::debug;

use super::track::Track;
use crate::types::labels::{Uid, UidGenerator};
use crate::{Result, TrackError, MAXHYP};

// ============================================================================
// Typed Indices
// ============================================================================

/// Index of a hypothesis in the store.
///
/// Valid until the next structural change of the store (spawn, retire,
/// prune or swap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HypId(pub(crate) usize);

impl HypId {
    /// Raw index.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Index of a track inside one hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackSlot(pub(crate) usize);

impl TrackSlot {
    /// Raw index.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

// ============================================================================
// Hypothesis
// ============================================================================

/// A weighted joint explanation of the observation sequence holding up to
/// `K` tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis<const D: usize, const K: usize> {
    tracks: Vec<Track<D>, K>,
    weight: f64,
}

impl<const D: usize, const K: usize> Hypothesis<D, K> {
    /// Creates a hypothesis without tracks.
    pub const fn new(weight: f64) -> Self {
        Self {
            tracks: Vec::new(),
            weight,
        }
    }

    /// Unnormalised weight.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Sets the weight.
    #[inline]
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Number of tracks.
    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True if the hypothesis explains everything as clutter.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The tracks.
    #[inline]
    pub fn tracks(&self) -> &[Track<D>] {
        &self.tracks
    }

    /// The tracks, mutably.
    #[inline]
    pub fn tracks_mut(&mut self) -> &mut [Track<D>] {
        &mut self.tracks
    }

    /// Track at a slot.
    #[inline]
    pub fn track(&self, slot: TrackSlot) -> Option<&Track<D>> {
        self.tracks.get(slot.0)
    }

    /// Track at a slot, mutably.
    #[inline]
    pub fn track_mut(&mut self, slot: TrackSlot) -> Option<&mut Track<D>> {
        self.tracks.get_mut(slot.0)
    }

    /// Slot of the track with the given uid.
    pub fn find(&self, uid: Uid) -> Option<TrackSlot> {
        self.tracks.iter().position(|t| t.uid == uid).map(TrackSlot)
    }

    /// Adds a track.
    ///
    /// Fails with [`TrackError::CapacityExceeded`] once `limit` (or `K`)
    /// tracks are held.
    pub fn spawn_track(&mut self, track: Track<D>, limit: usize) -> Result<TrackSlot> {
        if self.tracks.len() >= limit.min(K) {
            return Err(TrackError::CapacityExceeded);
        }
        self.tracks.push(track).map_err(|_| TrackError::CapacityExceeded)?;
        Ok(TrackSlot(self.tracks.len() - 1))
    }

    /// Removes a track, keeping the order of the others.
    pub fn retire_track(&mut self, slot: TrackSlot) -> Option<Track<D>> {
        if slot.0 < self.tracks.len() {
            Some(self.tracks.remove(slot.0))
        } else {
            None
        }
    }

    /// Keeps only the tracks for which `keep` is true.
    pub fn retain_tracks<F: FnMut(&Track<D>) -> bool>(&mut self, mut keep: F) {
        self.tracks.retain(|t| keep(t));
    }
}

// ============================================================================
// Hypothesis Store
// ============================================================================

/// Hypotheses of one generation.
pub type HypothesisSet<const D: usize, const K: usize> = Vec<Hypothesis<D, K>, MAXHYP>;

/// Arena of at most [`MAXHYP`] hypotheses.
///
/// The store is double-buffered: children of the current generation are
/// built into the back buffer, which then becomes the front.
#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisStore<const D: usize, const K: usize> {
    buffers: [HypothesisSet<D, K>; 2],
    front: usize,
    uids: UidGenerator,
    selected: Uid,
}

impl<const D: usize, const K: usize> HypothesisStore<D, K> {
    /// Creates an uninitialised store without hypotheses.
    pub const fn new() -> Self {
        Self {
            buffers: [Vec::new(), Vec::new()],
            front: 0,
            uids: UidGenerator::new(),
            selected: Uid::INVALID,
        }
    }

    /// Resets to a single empty hypothesis of weight 1.
    ///
    /// Clears every track, restarts uid allocation at 0 and deselects the
    /// selected uid. Calling it repeatedly yields the same state.
    pub fn initialize(&mut self, timestamp: f64) {
        for buffer in self.buffers.iter_mut() {
            buffer.clear();
        }
        self.front = 0;
        // Capacity is MAXHYP >= 1
        let _ = self.buffers[0].push(Hypothesis::new(1.0));
        self.uids = UidGenerator::new();
        self.selected = Uid::INVALID;
        debug!("Hypothesis store initialised at t={}", timestamp);
    }

    #[inline]
    fn active(&self) -> &HypothesisSet<D, K> {
        &self.buffers[self.front]
    }

    #[inline]
    fn active_mut(&mut self) -> &mut HypothesisSet<D, K> {
        &mut self.buffers[self.front]
    }

    /// Adds a hypothesis.
    pub fn spawn(&mut self, hypothesis: Hypothesis<D, K>) -> Result<HypId> {
        let set = self.active_mut();
        set.push(hypothesis).map_err(|_| TrackError::CapacityExceeded)?;
        Ok(HypId(set.len() - 1))
    }

    /// Removes a hypothesis. Ids of later hypotheses shift down by one.
    pub fn retire(&mut self, id: HypId) -> Option<Hypothesis<D, K>> {
        let set = self.active_mut();
        if id.0 < set.len() {
            Some(set.remove(id.0))
        } else {
            None
        }
    }

    /// Hypothesis by id.
    #[inline]
    pub fn get(&self, id: HypId) -> Option<&Hypothesis<D, K>> {
        self.active().get(id.0)
    }

    /// Hypothesis by id, mutably.
    #[inline]
    pub fn get_mut(&mut self, id: HypId) -> Option<&mut Hypothesis<D, K>> {
        self.active_mut().get_mut(id.0)
    }

    /// Weight of a hypothesis.
    #[inline]
    pub fn weight(&self, id: HypId) -> Option<f64> {
        self.get(id).map(Hypothesis::weight)
    }

    /// Sets the weight of a hypothesis.
    pub fn set_weight(&mut self, id: HypId, weight: f64) -> Result<()> {
        let hypothesis = self
            .get_mut(id)
            .ok_or(TrackError::InvalidParameter("hypothesis id"))?;
        hypothesis.set_weight(weight);
        Ok(())
    }

    /// Number of live hypotheses.
    #[inline]
    pub fn len(&self) -> usize {
        self.active().len()
    }

    /// True if no hypothesis is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }

    /// Live hypotheses with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (HypId, &Hypothesis<D, K>)> + '_ {
        self.active().iter().enumerate().map(|(i, h)| (HypId(i), h))
    }

    /// Live hypotheses, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Hypothesis<D, K>> + '_ {
        self.active_mut().iter_mut()
    }

    /// Live hypotheses as a slice.
    #[inline]
    pub fn hypotheses(&self) -> &[Hypothesis<D, K>] {
        self.active()
    }

    /// The heaviest hypothesis; the earliest wins ties.
    pub fn heaviest(&self) -> Option<HypId> {
        let mut best: Option<(usize, f64)> = None;
        for (i, h) in self.active().iter().enumerate() {
            match best {
                Some((_, w)) if h.weight() <= w => {}
                _ => best = Some((i, h.weight())),
            }
        }
        best.map(|(i, _)| HypId(i))
    }

    /// Largest weight among live hypotheses.
    pub fn max_weight(&self) -> Option<f64> {
        self.heaviest().and_then(|id| self.weight(id))
    }

    /// Allocates a fresh track uid.
    #[inline]
    pub fn allocate_uid(&mut self) -> Uid {
        self.uids.next_uid()
    }

    /// Uid selected for publication on the last tick.
    #[inline]
    pub fn selected_uid(&self) -> Uid {
        self.selected
    }

    /// Records the uid selected for publication.
    #[inline]
    pub fn set_selected_uid(&mut self, uid: Uid) {
        self.selected = uid;
    }

    /// Orders hypotheses by decreasing weight.
    pub fn sort_by_weight(&mut self) {
        self.active_mut().sort_unstable_by(|a, b| {
            b.weight()
                .partial_cmp(&a.weight())
                .unwrap_or(core::cmp::Ordering::Equal)
        });
    }

    /// Keeps at most `n` hypotheses.
    #[inline]
    pub fn truncate(&mut self, n: usize) {
        self.active_mut().truncate(n);
    }

    /// Keeps only the hypotheses for which `keep` is true.
    pub fn retain<F: FnMut(&Hypothesis<D, K>) -> bool>(&mut self, mut keep: F) {
        self.active_mut().retain(|h| keep(h));
    }

    /// Closes a tick for every track of every hypothesis.
    pub fn end_tick(&mut self) {
        for hypothesis in self.active_mut().iter_mut() {
            for track in hypothesis.tracks_mut() {
                track.end_tick();
            }
        }
    }

    /// Splits the store into the current generation, an emptied back buffer
    /// for the next generation, and the uid generator.
    pub(crate) fn staging(
        &mut self,
    ) -> (&HypothesisSet<D, K>, &mut HypothesisSet<D, K>, &mut UidGenerator) {
        let (first, second) = self.buffers.split_at_mut(1);
        let (front, back) = if self.front == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };
        back.clear();
        (front, back, &mut self.uids)
    }

    /// Makes the back buffer the current generation.
    pub(crate) fn swap(&mut self) {
        self.front ^= 1;
        let back = 1 - self.front;
        self.buffers[back].clear();
    }
}

impl<const D: usize, const K: usize> Default for HypothesisStore<D, K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::records::{Observation, VisionCandidate};

    type Store = HypothesisStore<2, 3>;

    fn track(uid: u64, x: f64) -> Track<2> {
        Track::spawn(Uid(uid), &Observation::from_vision(&VisionCandidate::new([x, 0.0], 0.0)))
    }

    #[test]
    fn test_initialize_single_unit_hypothesis() {
        let mut store = Store::new();
        assert!(store.is_empty());

        store.initialize(0.0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.weight(HypId(0)), Some(1.0));
        assert!(store.get(HypId(0)).unwrap().is_empty());
        assert_eq!(store.selected_uid(), Uid::INVALID);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut store = Store::new();
        store.spawn(Hypothesis::new(0.3)).unwrap();
        store.allocate_uid();
        store.set_selected_uid(Uid(4));

        store.initialize(1.0);
        let once = store.clone();
        store.initialize(1.0);

        assert_eq!(store, once);
        assert_eq!(store.allocate_uid(), Uid(0));
    }

    #[test]
    fn test_spawn_beyond_capacity() {
        let mut store = Store::new();
        for _ in 0..MAXHYP {
            assert!(store.spawn(Hypothesis::new(1.0)).is_ok());
        }
        assert_eq!(store.spawn(Hypothesis::new(1.0)), Err(TrackError::CapacityExceeded));
        assert_eq!(store.len(), MAXHYP);
    }

    #[test]
    fn test_retire_and_weights() {
        let mut store = Store::new();
        let a = store.spawn(Hypothesis::new(0.2)).unwrap();
        let b = store.spawn(Hypothesis::new(0.7)).unwrap();

        assert_eq!(store.heaviest(), Some(b));
        store.set_weight(a, 0.9).unwrap();
        assert_eq!(store.heaviest(), Some(a));
        assert_eq!(store.max_weight(), Some(0.9));

        assert!(store.retire(a).is_some());
        assert_eq!(store.len(), 1);
        assert_eq!(store.weight(HypId(0)), Some(0.7));
        assert!(store.retire(HypId(5)).is_none());
        assert!(store.set_weight(HypId(5), 1.0).is_err());
    }

    #[test]
    fn test_track_capacity() {
        let mut hypothesis: Hypothesis<2, 3> = Hypothesis::new(1.0);
        assert!(hypothesis.spawn_track(track(0, 0.0), 2).is_ok());
        assert!(hypothesis.spawn_track(track(1, 1.0), 2).is_ok());
        assert_eq!(
            hypothesis.spawn_track(track(2, 2.0), 2),
            Err(TrackError::CapacityExceeded)
        );
        // Limit above K is capped at K
        assert!(hypothesis.spawn_track(track(2, 2.0), 10).is_ok());
        assert!(hypothesis.spawn_track(track(3, 3.0), 10).is_err());

        assert_eq!(hypothesis.find(Uid(1)), Some(TrackSlot(1)));
        let retired = hypothesis.retire_track(TrackSlot(0)).unwrap();
        assert_eq!(retired.uid, Uid(0));
        assert_eq!(hypothesis.find(Uid(1)), Some(TrackSlot(0)));
    }

    #[test]
    fn test_staging_swaps_generations() {
        let mut store = Store::new();
        store.initialize(0.0);
        {
            let (front, back, uids) = store.staging();
            assert_eq!(front.len(), 1);
            let mut child = front[0].clone();
            child.spawn_track(track(uids.next_uid().0, 1.0), 3).unwrap();
            back.push(child).unwrap();
            back.push(Hypothesis::new(0.5)).unwrap();
        }
        store.swap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(HypId(0)).unwrap().len(), 1);
        assert_eq!(store.allocate_uid(), Uid(1));
    }
}
