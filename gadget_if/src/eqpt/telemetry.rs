//! # Remote telemetry API contract

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Failure of a single remote property fetch.
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    #[error("Telemetry API request failed: {0}")]
    RequestFailed(String),

    #[error("\"{0}\" is not a known telemetry property")]
    UnknownProperty(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Remote telemetry property store, hosted by the power-monitoring cloud
/// service.
///
/// Each property is a named scalar (voltage, current). Fetches are
/// independent: one property failing says nothing about the others.
pub trait TelemetryApi: Send {
    /// Fetch the last reported value of the given property.
    fn fetch_property(&mut self, property_id: &str) -> Result<f64, RemoteFetchError>;
}
