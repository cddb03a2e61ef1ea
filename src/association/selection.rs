//! Choosing what to publish from the hypothesis set

use crate::hypothesis::{Hypothesis, HypothesisStore};
use crate::types::labels::Uid;
use crate::types::records::BallSnapshot;

/// Picks the ball: the track with the highest smoothed confidence over all
/// live hypotheses.
///
/// Ties go to the track of the heavier hypothesis, then to the previously
/// selected uid. Returns `None` when no hypothesis holds a track.
pub fn select_ball<const K: usize>(store: &HypothesisStore<3, K>) -> Option<BallSnapshot> {
    let previous = store.selected_uid();
    let mut best: Option<(f64, f64, BallSnapshot)> = None;

    for (_, hypothesis) in store.iter() {
        for track in hypothesis.tracks() {
            let confidence = track.confidence();
            let weight = hypothesis.weight();
            let better = match &best {
                None => true,
                Some((c, w, current)) => {
                    confidence > *c
                        || (confidence == *c && weight > *w)
                        || (confidence == *c
                            && weight == *w
                            && track.uid == previous
                            && current.uid != previous)
                }
            };
            if better {
                best = Some((
                    confidence,
                    weight,
                    BallSnapshot {
                        uid: track.uid,
                        position: track.position,
                        velocity: track.velocity,
                        timestamp: track.last_update,
                        confidence,
                    },
                ));
            }
        }
    }

    best.map(|(_, _, snapshot)| snapshot)
}

/// The hypothesis whose tracks are published as obstacles.
pub fn winning_hypothesis<const D: usize, const K: usize>(
    store: &HypothesisStore<D, K>,
) -> Option<&Hypothesis<D, K>> {
    store.heaviest().and_then(|id| store.get(id))
}

/// Uid of a selection, [`Uid::INVALID`] if nothing was selected.
#[inline]
pub fn selected_uid(snapshot: Option<&BallSnapshot>) -> Uid {
    snapshot.map_or(Uid::INVALID, |s| s.uid)
}
