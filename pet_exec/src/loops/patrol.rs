//! Patrol loop - random movement while patrol mode is enabled

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Internal
use crate::mode_store::ModeStore;
use crate::motion_ctrl::MotionCtrl;
use crate::params::PatrolParams;
use gadget_if::directive::Direction;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Patrol thread entry point.
///
/// While patrol mode is enabled this picks a random non-stop direction,
/// duration and speed, issues the move without blocking, and waits out the
/// leg's nominal duration before picking the next one. While disabled it
/// re-checks the flag every idle period.
pub fn patrol_thread(modes: Arc<ModeStore>, motion: MotionCtrl, params: PatrolParams) {
    let mut rng = rand::thread_rng();

    loop {
        while modes.patrol_enabled() {
            // Draw a direction, redrawing until it is not Stop
            let direction = loop {
                match Direction::ALL.choose(&mut rng) {
                    Some(&Direction::Stop) | None => continue,
                    Some(&d) => break d,
                }
            };

            let duration_s =
                rng.gen_range(params.min_leg_duration_s..=params.max_leg_duration_s);
            let speed_pct = params
                .leg_speeds_pct
                .choose(&mut rng)
                .copied()
                .unwrap_or(50.0);

            debug!(
                "Patrol leg: {:?} for {} s at {} %",
                direction, duration_s, speed_pct
            );

            if let Err(e) = motion.move_dir(direction, duration_s as f64, speed_pct, false) {
                warn!("Patrol manoeuvre failed: {}", e);
            }

            // A new leg is never picked while the previous one is still
            // nominally running
            thread::sleep(Duration::from_secs(duration_s));
        }

        thread::sleep(Duration::from_secs_f64(params.idle_period_s));
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::MotionParams;
    use crate::test_eqpt::{DriveCall, MockDrive};

    /// Fast patrol parameters so the test does not crawl in real time.
    fn test_params() -> PatrolParams {
        PatrolParams {
            idle_period_s: 0.05,
            min_leg_duration_s: 1,
            max_leg_duration_s: 1,
            leg_speeds_pct: vec![25.0, 50.0, 75.0, 100.0],
        }
    }

    #[test]
    fn test_patrol_issues_moves_while_enabled() {
        let modes = Arc::new(ModeStore::new());
        let mock = MockDrive::new();
        let motion = MotionCtrl::new(Box::new(mock.clone()), MotionParams::default());

        modes.set_patrol_enabled(true);

        {
            let modes = modes.clone();
            let params = test_params();
            thread::spawn(move || patrol_thread(modes, motion, params));
        }

        // The first leg must be issued well within the idle period of the
        // flag being set
        thread::sleep(Duration::from_millis(500));
        assert!(mock.num_calls() >= 1);

        // Let a few legs run, then disable patrol and wait out the in-flight
        // leg's nominal duration
        thread::sleep(Duration::from_millis(2000));
        modes.set_patrol_enabled(false);
        thread::sleep(Duration::from_millis(1500));

        let count_after_disable = mock.num_calls();

        // No new commands are issued once the flag is down
        thread::sleep(Duration::from_millis(1500));
        assert_eq!(mock.num_calls(), count_after_disable);

        // Every recorded call is a timed drive (never a stop). Left/right
        // legs open with a blocking turn whose inner side is 0 %, so all
        // sides must come from the configured speed set or be zero.
        for call in mock.calls() {
            match call {
                DriveCall::DriveTimed {
                    left_pct,
                    right_pct,
                    ..
                } => {
                    for side in [left_pct.abs(), right_pct.abs()].iter() {
                        assert!([0.0, 25.0, 50.0, 75.0, 100.0].contains(side));
                    }
                }
                other => panic!("Patrol issued an unexpected call: {:?}", other),
            }
        }
    }
}
