//! Integration tests for the obstacle tracker

mod common;

use common::{make_obstacle, make_teammate, origin, SightingGenerator};
use sctrack::prelude::*;
use sctrack::{MAXHYP, MAXNOBJ_GLOBAL, OBSERVATION_CAPACITY};

#[test]
fn test_vision_and_teammate_in_one_tick() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();

    let output = tracker
        .tick(
            1.0,
            origin(),
            &[make_obstacle(2.0, 1.0, 1.0)],
            &[make_teammate(-1.0, -3.0, 1.0)],
            &params,
        )
        .unwrap();

    assert_eq!(output.objects.len(), 2);
    let vision = output.objects.iter().find(|o| o.label() == 0).unwrap();
    let teammate = output.objects.iter().find(|o| o.label() == 1).unwrap();
    assert_ne!(vision.uid, teammate.uid);
    assert!((vision.position[0] - 2.0).abs() < 1e-9);
    assert!((teammate.position[1] + 3.0).abs() < 1e-9);
    assert_eq!(teammate.class, ObjectClass::OwnTeam);
    assert_eq!(vision.class, ObjectClass::OpposingTeam);
}

#[test]
fn test_teammate_labels_follow_index() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();
    let teammates = [
        make_teammate(-3.0, 0.0, 0.2),
        make_teammate(0.0, 3.0, 0.2),
        make_teammate(3.0, 0.0, 0.2),
    ];

    let output = tracker.tick(0.2, origin(), &[], &teammates, &params).unwrap();

    let mut labels = [0u32; 3];
    for (label, object) in labels.iter_mut().zip(output.objects.iter()) {
        *label = object.label();
    }
    assert_eq!(labels, [1, 2, 3]);
}

#[test]
fn test_teammate_seen_by_vision_stays_own_team() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();

    let mut output = ObstacleOutput::default();
    for step in 0..6 {
        let t = step as f64 * 0.1;
        output = tracker
            .tick(
                t,
                origin(),
                &[make_obstacle(1.02, 1.0, t)],
                &[make_teammate(1.0, 1.0, t)],
                &params,
            )
            .unwrap();
    }

    // Both sources describe one object
    assert_eq!(output.objects.len(), 1);
    let object = &output.objects.as_slice()[0];
    assert!(object.class != ObjectClass::OpposingTeam);
    assert!(object.confidence > 0.9);
}

#[test]
fn test_clip_radius() {
    let mut tracker = ObstacleTracker::new();
    let mut params = ObstacleParams::default();
    params.clustering.clipradius = 3.0;
    let own = Position::from_array([1.0, 0.0]);

    let output = tracker
        .tick(0.0, own, &[make_obstacle(1.0, 8.0, 0.0)], &[], &params)
        .unwrap();

    let object = &output.objects.as_slice()[0];
    assert!((object.position[0] - 1.0).abs() < 1e-9);
    assert!((object.position[1] - 3.0).abs() < 1e-9);
}

#[test]
fn test_published_objects_extrapolate_and_decay() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();

    for step in 0..5 {
        let t = step as f64 * 0.1;
        tracker
            .tick(t, origin(), &[make_obstacle(1.0 + t, 0.0, t)], &[], &params)
            .unwrap();
    }
    let seen = tracker.last_output().objects.as_slice()[0];

    let output = tracker.tick(0.9, origin(), &[], &[], &params).unwrap();
    let object = &output.objects.as_slice()[0];

    assert_eq!(object.uid, seen.uid);
    assert!((object.position[0] - (seen.position[0] + 0.5 * seen.velocity[0])).abs() < 1e-9);
    assert!((object.confidence - seen.confidence * 0.8f64.powf(0.5)).abs() < 1e-9);
    assert!((object.timestamp - 0.9).abs() < 1e-12);
}

#[test]
fn test_overflow_is_absorbed() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();
    let mut vision = [make_obstacle(0.0, 0.0, 0.0); OBSERVATION_CAPACITY + 5];
    for (i, candidate) in vision.iter_mut().enumerate() {
        candidate.position = [(i % 10) as f64 * 2.0 - 9.0, (i / 10) as f64 * 2.0 - 5.0];
    }

    let output = tracker.tick(0.0, origin(), &vision, &[], &params).unwrap();

    assert_eq!(output.dropped_observations, 5);
    assert!(output.capacity_warnings > 0);
    assert!(!output.filter_error);
    assert_eq!(output.objects.len(), MAXNOBJ_GLOBAL);
}

/// Clutter at least 2 m from every robot and from the teammate at (0, -3.5).
fn clutter_off_targets(generator: &mut SightingGenerator, robots: &[(f64, f64)]) -> [f64; 2] {
    loop {
        let [x, y] = generator.clutter();
        let clear = robots
            .iter()
            .chain(core::iter::once(&(0.0, -3.5)))
            .all(|&(rx, ry)| ((x - rx).powi(2) + (y - ry).powi(2)).sqrt() >= 2.0);
        if clear {
            return [x, y];
        }
    }
}

#[test]
fn test_randomised_scene_respects_bounds() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();
    let mut generator = SightingGenerator::new(42, 0.05);
    let robots = [(-3.0, 1.0), (2.0, -2.0), (4.0, 3.0)];

    for step in 0..60 {
        let t = step as f64 * 0.05;
        let mut vision = [make_obstacle(0.0, 0.0, t); 8];
        let mut count = 0;
        for &(x, y) in robots.iter() {
            if generator.chance(0.9) {
                vision[count].position = generator.noisy(x, y);
                count += 1;
            }
        }
        if generator.chance(0.15) {
            vision[count].position = clutter_off_targets(&mut generator, &robots);
            count += 1;
        }
        let teammates = [make_teammate(0.0, -3.5, t)];

        let output = tracker
            .tick(t, origin(), &vision[..count], &teammates, &params)
            .unwrap();

        assert!(tracker.context().store().len() <= MAXHYP);
        assert!(output.objects.len() <= MAXNOBJ_GLOBAL);
        assert!(output.objects.iter().all(|o| (0.0..=1.0).contains(&o.confidence)));
        assert!(output.objects.slots()[output.objects.len()..]
            .iter()
            .all(|o| *o == TrackedObject::default()));
    }

    // Every robot ends up published near its true position
    let output = tracker.last_output();
    for &(x, y) in robots.iter() {
        let near = output.objects.iter().any(|o| {
            let dx = o.position[0] - x;
            let dy = o.position[1] - y;
            (dx * dx + dy * dy).sqrt() < 0.3
        });
        assert!(near, "no object near ({}, {})", x, y);
    }
    let mate = output.objects.iter().find(|o| o.label() == 1).unwrap();
    assert_eq!(mate.class, ObjectClass::OwnTeam);
}

#[test]
fn test_fault_tick_republishes_last_objects() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();

    let before = tracker
        .tick(0.0, origin(), &[make_obstacle(1.0, 1.0, 0.0)], &[], &params)
        .unwrap();
    let id = tracker.context().store().heaviest().unwrap();
    tracker.context_mut().store_mut().set_weight(id, f64::NAN).unwrap();

    let faulted = tracker
        .tick(0.05, origin(), &[make_obstacle(1.0, 1.0, 0.05)], &[], &params)
        .unwrap();
    assert!(faulted.filter_error);
    assert_eq!(faulted.objects.len(), 1);
    assert_eq!(faulted.objects, before.objects);

    // Reset on the next tick, tracking resumes from an empty store
    let recovered = tracker
        .tick(0.1, origin(), &[make_obstacle(1.0, 1.0, 0.1)], &[], &params)
        .unwrap();
    assert!(!recovered.filter_error);
    assert_eq!(recovered.objects.len(), 1);
}

#[test]
fn test_teammate_report_without_valid_time_never_lingers() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();
    let teammates = [
        make_teammate(1.0, 1.0, 0.1),
        TeammateReport::new([3.0, 100.0], f64::NAN, 0.9),
    ];

    let output = tracker.tick(0.1, origin(), &[], &teammates, &params).unwrap();
    assert_eq!(output.objects.len(), 1);
    assert_eq!(output.objects.as_slice()[0].label(), 1);

    let later = tracker.tick(100.0, origin(), &[], &[], &params).unwrap();
    assert!(later.objects.is_empty());
}
