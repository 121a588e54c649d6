//! # Gadget interface library
//!
//! This library defines the interface between the pet rover and its paired
//! companion device: inbound directives, outbound events, and the contracts
//! of the equipment collaborators (drive, sensors, LEDs, telemetry API) which
//! are implemented externally.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod directive;
pub mod events;
pub mod eqpt;
