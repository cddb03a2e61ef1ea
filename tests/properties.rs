//! Property tests over random observation sequences and weight sets

mod common;

use proptest::prelude::*;

use common::{make_ball, make_obstacle, origin};
use sctrack::hypothesis::{Hypothesis, HypothesisStore};
use sctrack::prelude::*;
use sctrack::utils::{decay_confidence, forget, prune, PruningConfig};
use sctrack::{MAXHYP, MAXNOBJ_GLOBAL, MAX_BALL_CANDIDATES};

/// Up to `max_ticks` ticks of up to `max_obs` field positions each.
fn scene(max_obs: usize, max_ticks: usize) -> impl Strategy<Value = Vec<Vec<(f64, f64)>>> {
    proptest::collection::vec(
        proptest::collection::vec((-6.0f64..6.0, -4.0f64..4.0), 0..max_obs),
        1..max_ticks,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_obstacle_tracker_stays_bounded(ticks in scene(14, 12)) {
        let mut tracker = ObstacleTracker::new();
        let params = ObstacleParams::default();

        for (i, positions) in ticks.iter().enumerate() {
            let t = i as f64 * 0.1;
            let vision: Vec<_> = positions.iter().map(|&(x, y)| make_obstacle(x, y, t)).collect();
            let output = tracker.tick(t, origin(), &vision, &[], &params).unwrap();

            prop_assert!(!output.filter_error);
            prop_assert!(tracker.context().store().len() <= MAXHYP);
            prop_assert!(tracker.context().store().len() >= 1);
            prop_assert!(output.objects.len() <= MAXNOBJ_GLOBAL);
            for object in output.objects.iter() {
                prop_assert!((0.0..=1.0).contains(&object.confidence));
            }
            for hypothesis in tracker.context().store().hypotheses() {
                prop_assert!(hypothesis.len() <= MAXNOBJ_GLOBAL);
                prop_assert!(hypothesis.weight() > 0.0 && hypothesis.weight() <= 1.0);
            }
        }
    }

    #[test]
    fn prop_ball_tracker_stays_bounded(ticks in scene(6, 12)) {
        let mut tracker = BallTracker::new();
        let params = BallParams::default();

        for (i, positions) in ticks.iter().enumerate() {
            let t = i as f64 * 0.05;
            let candidates: Vec<_> = positions.iter().map(|&(x, y)| make_ball(x, y, 0.0, t)).collect();
            let output = tracker.tick(t, &candidates, &params).unwrap();

            prop_assert!(!output.filter_error);
            for hypothesis in tracker.context().store().hypotheses() {
                prop_assert!(hypothesis.len() <= MAX_BALL_CANDIDATES);
            }
            if let Some(ball) = output.ball_now {
                prop_assert!((0.0..=1.0).contains(&ball.confidence));
                prop_assert!((ball.timestamp - t).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn prop_initialize_is_idempotent(ticks in scene(8, 6), t in 0.0f64..100.0) {
        let mut tracker = ObstacleTracker::new();
        let params = ObstacleParams::default();
        for (i, positions) in ticks.iter().enumerate() {
            let ts = i as f64 * 0.1;
            let vision: Vec<_> = positions.iter().map(|&(x, y)| make_obstacle(x, y, ts)).collect();
            tracker.tick(ts, origin(), &vision, &[], &params).unwrap();
        }

        let store = tracker.context_mut().store_mut();
        store.initialize(t);
        let once = store.clone();
        store.initialize(t);

        let mut fresh: HypothesisStore<2, MAXNOBJ_GLOBAL> = HypothesisStore::new();
        fresh.initialize(t);
        prop_assert_eq!(&once, &*store);
        prop_assert_eq!(&fresh, &*store);
    }

    #[test]
    fn prop_prune_respects_threshold(
        weights in proptest::collection::vec(1e-4f64..10.0, 1..MAXHYP),
        nkeep in 1usize..30,
        pfactor in 1.0f64..50.0,
    ) {
        let mut store: HypothesisStore<2, 4> = HypothesisStore::new();
        for &weight in weights.iter() {
            store.spawn(Hypothesis::new(weight)).unwrap();
        }
        let config = PruningConfig::new(nkeep, pfactor);

        prune(&mut store, &config).unwrap();

        prop_assert!(!store.is_empty());
        prop_assert!(store.len() <= nkeep.min(MAXHYP));
        prop_assert!((store.hypotheses()[0].weight() - 1.0).abs() < 1e-12);
        for pair in store.hypotheses().windows(2) {
            prop_assert!(pair[0].weight() >= pair[1].weight());
        }
        for hypothesis in store.hypotheses() {
            prop_assert!(hypothesis.weight() >= 1.0 / pfactor);
        }
    }

    #[test]
    fn prop_split_decay_never_exceeds_single(
        confidence in 0.0f64..=1.0,
        rate in 0.01f64..=1.0,
        dt in 0.0f64..10.0,
    ) {
        let once = decay_confidence(confidence, rate, dt);
        let twice = decay_confidence(decay_confidence(confidence, rate, dt / 2.0), rate, dt / 2.0);
        prop_assert!(twice <= once + 1e-12);
        prop_assert!(once <= confidence);
    }

    #[test]
    fn prop_decay_is_monotone_in_age(
        confidence in 0.0f64..=1.0,
        rate in 0.01f64..=1.0,
        a in 0.0f64..10.0,
        b in 0.0f64..10.0,
    ) {
        let (young, old) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(decay_confidence(confidence, rate, old) <= decay_confidence(confidence, rate, young));
    }

    #[test]
    fn prop_forget_beyond_time_to_forget(
        confidence in 0.0f64..=1.0,
        ttf in 0.0f64..5.0,
        excess in 1e-6f64..5.0,
    ) {
        prop_assert_eq!(forget(confidence, ttf + excess, ttf), 0.0);
        prop_assert_eq!(forget(confidence, ttf, ttf), confidence);
    }
}
