//! # Background control loops
//!
//! The five always-running control threads of the rover. Each one is spawned
//! once at startup and runs for the process lifetime; none is ever cancelled
//! individually.
//!
//! Every loop is its own fault boundary: an error during one iteration
//! (actuator fault, failed remote fetch) is logged and the loop carries on
//! with its next cycle. No loop may ever terminate the process or block
//! another loop's scheduling.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Random movement while patrol mode is enabled
pub mod patrol;

/// Beacon tracking while follow mode is enabled
pub mod follow;

/// Speech response to the touch sensor being bumped
pub mod touch;

/// Periodic ambient light sampling
pub mod light;

/// Periodic power telemetry fetch and report
pub mod power;
