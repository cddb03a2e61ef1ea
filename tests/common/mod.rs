//! Common test helpers for tracker integration tests

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use sctrack::prelude::*;

/// Creates a ball candidate seen at `t`
pub fn make_ball(x: f64, y: f64, z: f64, t: f64) -> BallCandidate {
    BallCandidate::new([x, y, z], t)
}

/// Creates an obstacle candidate seen at `t`
pub fn make_obstacle(x: f64, y: f64, t: f64) -> ObstacleCandidate {
    ObstacleCandidate::new([x, y], t)
}

/// Creates a confident teammate report valid at `t`
pub fn make_teammate(x: f64, y: f64, t: f64) -> TeammateReport<2> {
    TeammateReport::new([x, y], t, 0.9)
}

/// The robot's own position at the field centre
pub fn origin() -> Position<2> {
    Position::from_array([0.0, 0.0])
}

/// Ball parameters with a long forget time, so decay can be observed
pub fn patient_ball_params() -> BallParams {
    BallParams {
        ball_time_to_forget: 5.0,
        ..BallParams::default()
    }
}

/// Seeded generator of noisy sightings and uniform clutter.
pub struct SightingGenerator {
    rng: StdRng,
    noise: Normal<f64>,
}

impl SightingGenerator {
    /// Creates a generator with measurement noise `sigma`.
    pub fn new(seed: u64, sigma: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: Normal::new(0.0, sigma).unwrap(),
        }
    }

    /// A noisy sighting of a point.
    pub fn noisy(&mut self, x: f64, y: f64) -> [f64; 2] {
        [
            x + self.noise.sample(&mut self.rng),
            y + self.noise.sample(&mut self.rng),
        ]
    }

    /// A uniform clutter point on a 12 m × 8 m field.
    pub fn clutter(&mut self) -> [f64; 2] {
        [
            self.rng.random_range(-6.0..6.0),
            self.rng.random_range(-4.0..4.0),
        ]
    }

    /// A clutter point at least `min_distance` away from `(x, y)`.
    pub fn clutter_away_from(&mut self, x: f64, y: f64, min_distance: f64) -> [f64; 2] {
        loop {
            let [cx, cy] = self.clutter();
            if ((cx - x).powi(2) + (cy - y).powi(2)).sqrt() >= min_distance {
                return [cx, cy];
            }
        }
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p)
    }
}
