//! # Sensor collaborator contracts

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Operating modes of the light sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum LightMode {
    /// Ambient light intensity measurement.
    Ambient,

    /// Raw reflected light measurement, used when the battery is low.
    RawReflect,

    /// Colour measurement.
    Color,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Beacon (infrared seeker) sensor.
pub trait BeaconSensor: Send {
    /// Signed bearing to the tracked beacon.
    ///
    /// Zero means "no signal", negative values mean the beacon is to the
    /// left, positive to the right.
    fn heading(&mut self) -> i32;
}

/// Bump (touch) sensor.
pub trait BumpSensor: Send {
    /// Block until the sensor is bumped, then return true.
    ///
    /// The wait is level-triggered with sub-second internal poll granularity
    /// owned by the implementation. A false return indicates a spurious
    /// wakeup and carries no bump.
    fn wait_for_bump(&mut self) -> bool;
}

/// Light (colour) sensor.
pub trait LightSensor: Send {
    /// Switch the sensor's operating mode.
    fn set_mode(&mut self, mode: LightMode);

    /// Read the ambient light intensity.
    ///
    /// Only meaningful while the sensor is in [`LightMode::Ambient`].
    fn ambient_intensity(&mut self) -> f64;
}
