//! Follow loop - beacon tracking while follow mode is enabled

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Internal
use crate::mode_store::ModeStore;
use crate::motion_ctrl::MotionCtrl;
use crate::params::FollowParams;
use gadget_if::eqpt::BeaconSensor;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Follow thread entry point.
///
/// Purely reactive: while follow mode is enabled the beacon heading is read
/// each poll, and if the beacon is visible a single blocking steering run is
/// made towards it. A heading of zero means no signal and only re-polls.
pub fn follow_thread(
    modes: Arc<ModeStore>,
    motion: MotionCtrl,
    mut beacon: Box<dyn BeaconSensor>,
    params: FollowParams,
) {
    loop {
        if modes.follow_enabled() {
            let heading = beacon.heading();
            trace!("Beacon heading: {}", heading);

            // Can't see the beacon
            if heading == 0 {
                thread::sleep(Duration::from_secs_f64(params.poll_period_s));
                continue;
            }

            // Steer towards the beacon, blocking for the whole run
            if let Err(e) = motion.steer_rotations(
                -(heading as f64),
                params.steer_speed_pct,
                params.steer_rotations,
                true,
            ) {
                warn!("Follow manoeuvre failed: {}", e);
            }
        }

        thread::sleep(Duration::from_secs_f64(params.poll_period_s));
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::MotionParams;
    use crate::test_eqpt::{DriveCall, MockBeacon, MockDrive};

    fn test_params() -> FollowParams {
        FollowParams {
            poll_period_s: 0.02,
            steer_speed_pct: 30.0,
            steer_rotations: 2.0,
        }
    }

    #[test]
    fn test_no_signal_issues_no_commands() {
        let modes = Arc::new(ModeStore::new());
        let mock = MockDrive::new();
        let motion = MotionCtrl::new(Box::new(mock.clone()), MotionParams::default());

        modes.set_follow_enabled(true);

        {
            let modes = modes.clone();
            let beacon = Box::new(MockBeacon::new(vec![]));
            thread::spawn(move || follow_thread(modes, motion, beacon, test_params()));
        }

        // Heading stays 0 so the loop only re-polls
        thread::sleep(Duration::from_millis(200));
        assert_eq!(mock.num_calls(), 0);
    }

    #[test]
    fn test_visible_beacon_steers_against_heading() {
        let modes = Arc::new(ModeStore::new());
        let mock = MockDrive::new();
        let motion = MotionCtrl::new(Box::new(mock.clone()), MotionParams::default());

        modes.set_follow_enabled(true);

        {
            let modes = modes.clone();
            // One visible reading then the beacon disappears
            let beacon = Box::new(MockBeacon::new(vec![15]));
            thread::spawn(move || follow_thread(modes, motion, beacon, test_params()));
        }

        thread::sleep(Duration::from_millis(200));

        let calls = mock.calls();
        assert_eq!(
            calls,
            vec![DriveCall::SteerRotations {
                steering: -15.0,
                speed_pct: 30.0,
                rotations: 2.0,
                block: true
            }]
        );
    }

    #[test]
    fn test_disabled_loop_issues_no_commands() {
        let modes = Arc::new(ModeStore::new());
        let mock = MockDrive::new();
        let motion = MotionCtrl::new(Box::new(mock.clone()), MotionParams::default());

        {
            let modes = modes.clone();
            let beacon = Box::new(MockBeacon::new(vec![20, 20, 20]));
            thread::spawn(move || follow_thread(modes, motion, beacon, test_params()));
        }

        // Follow mode was never enabled
        thread::sleep(Duration::from_millis(200));
        assert_eq!(mock.num_calls(), 0);
    }
}
