//! Motion control module
//!
//! Motion control translates high level move, turn and preset maneuver
//! requests into calls on the drive actuator, and serialises all access to
//! it. The directive processor and every control loop that moves the rover
//! go through a cloned [`MotionCtrl`] handle; the actuator itself can never
//! see two maneuvers interleaved mid-composition.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

// Internal
use crate::params::MotionParams;
use gadget_if::directive::Direction;
use gadget_if::eqpt::{ActuatorError, DriveEqpt};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle on the serialised drive actuator.
///
/// Cloning is cheap and every clone shares the same underlying actuator and
/// lock.
#[derive(Clone)]
pub struct MotionCtrl {
    drive: Arc<Mutex<Box<dyn DriveEqpt>>>,
    params: MotionParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCtrl {
    pub fn new(drive: Box<dyn DriveEqpt>, params: MotionParams) -> Self {
        Self {
            drive: Arc::new(Mutex::new(drive)),
            params,
        }
    }

    /// Run both drives at the given speeds for the given duration.
    pub fn drive_timed(
        &self,
        left_pct: f64,
        right_pct: f64,
        duration_s: f64,
        block: bool,
    ) -> Result<(), ActuatorError> {
        self.drive_eqpt()
            .drive_timed(left_pct, right_pct, duration_s, block)
    }

    /// Run both drives with a steering bias for a number of wheel rotations.
    pub fn steer_rotations(
        &self,
        steering: f64,
        speed_pct: f64,
        rotations: f64,
        block: bool,
    ) -> Result<(), ActuatorError> {
        self.drive_eqpt()
            .steer_rotations(steering, speed_pct, rotations, block)
    }

    /// Stop both drives immediately.
    pub fn stop(&self) -> Result<(), ActuatorError> {
        self.drive_eqpt().stop()
    }

    /// Perform a directional move.
    ///
    /// Forward and backward are a single timed run. Left and right first
    /// perform the fixed blocking turn sub-maneuver and only then issue the
    /// forward leg; the actuator lock is held across both steps so no other
    /// caller can slip a command in between them. Stop stops the drives.
    pub fn move_dir(
        &self,
        direction: Direction,
        duration_s: f64,
        speed_pct: f64,
        block: bool,
    ) -> Result<(), ActuatorError> {
        let mut drive = self.drive_eqpt();
        issue_move(
            drive.as_mut(),
            &self.params,
            direction,
            duration_s,
            speed_pct,
            block,
        )
    }

    /// Drive an arc by running the left side at the requested speed and the
    /// right side slowly. Non-blocking.
    pub fn drive_circle(&self, speed_pct: f64) -> Result<(), ActuatorError> {
        self.drive_eqpt().drive_timed(
            speed_pct,
            self.params.circle_inner_speed_pct,
            self.params.circle_duration_s,
            false,
        )
    }

    /// Drive a full square as sequential blocking right-hand legs.
    ///
    /// Does not return until every leg has completed. The lock is held for
    /// the whole square.
    pub fn drive_square(&self, speed_pct: f64) -> Result<(), ActuatorError> {
        let mut drive = self.drive_eqpt();

        for _ in 0..self.params.square_num_legs {
            issue_move(
                drive.as_mut(),
                &self.params,
                Direction::Right,
                self.params.square_leg_duration_s,
                speed_pct,
                true,
            )?;
        }

        Ok(())
    }

    /// Perform the two-phase sentry "shuffle" posture: a short asymmetric
    /// spin, a settle delay, then an opposite spin. Fully blocking.
    pub fn sentry_shuffle(&self) -> Result<(), ActuatorError> {
        let mut drive = self.drive_eqpt();

        drive.drive_timed(
            self.params.shuffle_spin_speed_pct,
            -self.params.shuffle_spin_speed_pct,
            self.params.shuffle_phase_duration_s,
            true,
        )?;

        thread::sleep(Duration::from_secs_f64(self.params.shuffle_settle_duration_s));

        drive.drive_timed(
            -self.params.shuffle_counter_speed_pct,
            self.params.shuffle_counter_speed_pct,
            self.params.shuffle_phase_duration_s,
            true,
        )
    }

    /// Lock the actuator.
    ///
    /// A caller panicking while holding the lock cannot leave the actuator
    /// unusable, the guard is recovered rather than the poison propagated.
    fn drive_eqpt(&self) -> MutexGuard<Box<dyn DriveEqpt>> {
        self.drive.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Issue a directional move on an already locked actuator.
///
/// Shared by [`MotionCtrl::move_dir`] and [`MotionCtrl::drive_square`] so
/// composite maneuvers keep their sub-steps under one lock acquisition.
fn issue_move(
    drive: &mut dyn DriveEqpt,
    params: &MotionParams,
    direction: Direction,
    duration_s: f64,
    speed_pct: f64,
    block: bool,
) -> Result<(), ActuatorError> {
    match direction {
        Direction::Forward => drive.drive_timed(speed_pct, speed_pct, duration_s, block),
        Direction::Backward => drive.drive_timed(-speed_pct, -speed_pct, duration_s, block),
        Direction::Left => {
            // Turn completes before the forward leg is issued
            drive.drive_timed(0.0, speed_pct, params.turn_duration_s, true)?;
            drive.drive_timed(speed_pct, speed_pct, duration_s, block)
        }
        Direction::Right => {
            drive.drive_timed(speed_pct, 0.0, params.turn_duration_s, true)?;
            drive.drive_timed(speed_pct, speed_pct, duration_s, block)
        }
        Direction::Stop => drive.stop(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_eqpt::{DriveCall, MockDrive};

    fn motion_with_mock() -> (MotionCtrl, MockDrive) {
        let mock = MockDrive::new();
        let motion = MotionCtrl::new(Box::new(mock.clone()), MotionParams::default());
        (motion, mock)
    }

    #[test]
    fn test_forward_and_backward_moves() {
        let (motion, mock) = motion_with_mock();

        motion.move_dir(Direction::Forward, 3.0, 50.0, false).unwrap();
        motion.move_dir(Direction::Backward, 2.0, 75.0, false).unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                DriveCall::DriveTimed {
                    left_pct: 50.0,
                    right_pct: 50.0,
                    duration_s: 3.0,
                    block: false
                },
                DriveCall::DriveTimed {
                    left_pct: -75.0,
                    right_pct: -75.0,
                    duration_s: 2.0,
                    block: false
                },
            ]
        );
    }

    #[test]
    fn test_left_move_turns_then_drives() {
        let (motion, mock) = motion_with_mock();

        motion.move_dir(Direction::Left, 3.0, 50.0, false).unwrap();

        // Exactly two calls: the blocking turn, then the non-blocking
        // forward leg
        assert_eq!(
            mock.calls(),
            vec![
                DriveCall::DriveTimed {
                    left_pct: 0.0,
                    right_pct: 50.0,
                    duration_s: 2.0,
                    block: true
                },
                DriveCall::DriveTimed {
                    left_pct: 50.0,
                    right_pct: 50.0,
                    duration_s: 3.0,
                    block: false
                },
            ]
        );
    }

    #[test]
    fn test_stop() {
        let (motion, mock) = motion_with_mock();

        motion.move_dir(Direction::Stop, 0.0, 0.0, false).unwrap();

        assert_eq!(mock.calls(), vec![DriveCall::Stop]);
    }

    #[test]
    fn test_square_is_four_blocking_right_moves() {
        let (motion, mock) = motion_with_mock();

        motion.drive_square(40.0).unwrap();

        let calls = mock.calls();

        // Four legs, each a blocking turn followed by a blocking forward run
        assert_eq!(calls.len(), 8);
        for leg in 0..4 {
            assert_eq!(
                calls[leg * 2],
                DriveCall::DriveTimed {
                    left_pct: 40.0,
                    right_pct: 0.0,
                    duration_s: 2.0,
                    block: true
                }
            );
            assert_eq!(
                calls[leg * 2 + 1],
                DriveCall::DriveTimed {
                    left_pct: 40.0,
                    right_pct: 40.0,
                    duration_s: 2.0,
                    block: true
                }
            );
        }
    }

    #[test]
    fn test_circle() {
        let (motion, mock) = motion_with_mock();

        motion.drive_circle(60.0).unwrap();

        assert_eq!(
            mock.calls(),
            vec![DriveCall::DriveTimed {
                left_pct: 60.0,
                right_pct: 5.0,
                duration_s: 12.0,
                block: false
            }]
        );
    }

    #[test]
    fn test_sentry_shuffle_phases() {
        let (motion, mock) = motion_with_mock();

        motion.sentry_shuffle().unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                DriveCall::DriveTimed {
                    left_pct: 80.0,
                    right_pct: -80.0,
                    duration_s: 0.2,
                    block: true
                },
                DriveCall::DriveTimed {
                    left_pct: -40.0,
                    right_pct: 40.0,
                    duration_s: 0.2,
                    block: true
                },
            ]
        );
    }

    #[test]
    fn test_fault_does_not_poison_controller() {
        let (motion, mock) = motion_with_mock();

        mock.fail_next_call();
        assert!(motion.move_dir(Direction::Forward, 1.0, 50.0, false).is_err());

        // The next maneuver must work as normal
        motion.move_dir(Direction::Forward, 1.0, 50.0, false).unwrap();
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn test_concurrent_maneuvers_never_interleave() {
        use std::thread;
        use std::time::Duration;

        let mock = MockDrive::with_call_delay(Duration::from_millis(5));
        let motion = MotionCtrl::new(Box::new(mock.clone()), MotionParams::default());

        let mut handles = vec![];
        for i in 0..4 {
            let m = motion.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..5 {
                    if i % 2 == 0 {
                        m.move_dir(Direction::Left, 0.1, 50.0, true).unwrap();
                    } else {
                        m.steer_rotations(-15.0, 30.0, 2.0, true).unwrap();
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // The mock asserts that no call begins before the previous one has
        // returned
        assert!(!mock.overlap_detected());
        assert_eq!(mock.calls().len(), 4 * 5 + 2 * 5);
    }
}
