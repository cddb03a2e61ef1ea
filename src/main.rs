//! Example usage of the sctrack library
//!
//! Runs a short deterministic scenario through the ball and obstacle
//! trackers and prints what they publish.

use sctrack::prelude::*;

fn main() {
    println!("sctrack: Sequence-Clustering Trackers");
    println!("=====================================\n");

    run_ball();
    run_obstacles();

    println!("Tracking complete!");
}

fn run_ball() {
    let mut tracker = BallTracker::new();
    let params = BallParams::default();

    // Ball rolling along x at 1 m/s, seen at 20 Hz with one clutter blob,
    // then lost for half a second
    let sightings: [(f64, &[[f64; 3]]); 6] = [
        (0.00, &[[1.00, 2.00, 0.0]]),
        (0.05, &[[1.05, 2.00, 0.0], [4.0, -3.0, 0.3]]),
        (0.10, &[[1.10, 2.01, 0.0]]),
        (0.15, &[[1.15, 2.00, 0.0]]),
        (0.40, &[]),
        (0.65, &[]),
    ];

    println!("Ball tracker");
    for (t, positions) in sightings.iter() {
        let mut candidates = [BallCandidate::new([0.0; 3], *t); 4];
        for (candidate, position) in candidates.iter_mut().zip(positions.iter()) {
            candidate.position = *position;
        }
        let output = match tracker.tick(*t, &candidates[..positions.len()], &params) {
            Ok(output) => output,
            Err(err) => {
                println!("  t={:.2}: {}", t, err);
                continue;
            }
        };

        match output.ball_now {
            Some(ball) => println!(
                "  t={:.2}: ball {} pos=({:.2}, {:.2}, {:.2}), vel=({:.2}, {:.2}, {:.2}), conf={:.3}",
                t,
                ball.uid,
                ball.position[0],
                ball.position[1],
                ball.position[2],
                ball.velocity[0],
                ball.velocity[1],
                ball.velocity[2],
                ball.confidence
            ),
            None => println!("  t={:.2}: no ball", t),
        }
    }
    println!();
}

fn run_obstacles() {
    let mut tracker = ObstacleTracker::new();
    let params = ObstacleParams::default();
    let own = Position::from_array([0.0, 0.0]);

    println!("Obstacle tracker");
    for step in 0..4 {
        let t = step as f64 * 0.1;
        // An opponent approaching, and one teammate standing still
        let vision = [ObstacleCandidate::new([3.0 - 0.2 * step as f64, 1.0], t).with_radius(0.25)];
        let teammates = [TeammateReport::new([-1.5, -2.0], t, 0.9)];

        let output = match tracker.tick(t, own, &vision, &teammates, &params) {
            Ok(output) => output,
            Err(err) => {
                println!("  t={:.2}: {}", t, err);
                continue;
            }
        };

        println!("  t={:.2}: {} objects", t, output.objects.len());
        for object in output.objects.iter() {
            println!(
                "    {} {:?} label={} pos=({:.2}, {:.2}), vel=({:.2}, {:.2}), conf={:.3}",
                object.uid,
                object.class,
                object.label(),
                object.position[0],
                object.position[1],
                object.velocity[0],
                object.velocity[1],
                object.confidence
            );
        }
    }
    println!();
}
