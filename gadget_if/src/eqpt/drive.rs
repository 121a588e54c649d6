//! # Drive actuator contract

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Faults raised by the drive actuator.
///
/// These are reported to the caller only, they must never terminate a
/// control loop or corrupt the motion controller for subsequent calls.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("Drive actuator fault: {0}")]
    Fault(String),

    #[error("Drive actuator is not connected")]
    NotConnected,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The differential-drive actuator primitives.
///
/// Blocking semantics are owned by the implementation: when `block` is true
/// a call returns only once the nominal duration or rotation count has
/// completed, when false it issues the command and returns immediately while
/// the actuator continues running for the nominal duration. A non-blocking
/// caller is responsible for not issuing a conflicting command before the
/// expected completion; this timing contract is documented, not enforced.
pub trait DriveEqpt: Send {
    /// Run the left and right drives at the given speeds for the given
    /// duration.
    ///
    /// Speeds are percentages in [-100, 100].
    fn drive_timed(
        &mut self,
        left_pct: f64,
        right_pct: f64,
        duration_s: f64,
        block: bool,
    ) -> Result<(), ActuatorError>;

    /// Run both drives with a steering bias for the given number of wheel
    /// rotations.
    ///
    /// `steering` is in [-100, 100], where negative values steer left,
    /// positive values steer right and zero drives straight.
    fn steer_rotations(
        &mut self,
        steering: f64,
        speed_pct: f64,
        rotations: f64,
        block: bool,
    ) -> Result<(), ActuatorError>;

    /// Stop both drives immediately.
    fn stop(&mut self) -> Result<(), ActuatorError>;
}
