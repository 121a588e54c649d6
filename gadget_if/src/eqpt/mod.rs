//! # Equipment collaborator contracts
//!
//! The physical (or simulated) devices the control core drives are external
//! collaborators. This module defines the traits they must implement; the
//! drivers themselves live outside the core.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod drive;
pub mod leds;
pub mod sensors;
pub mod telemetry;

// ---------------------------------------------------------------------------
// RE-EXPORTS
// ---------------------------------------------------------------------------

pub use drive::{ActuatorError, DriveEqpt};
pub use leds::{LedColor, LedGroup, Leds};
pub use sensors::{BeaconSensor, BumpSensor, LightMode, LightSensor};
pub use telemetry::{RemoteFetchError, TelemetryApi};
