//! # Outbound event module
//!
//! Events are fire-and-forget notifications sent from the rover to the
//! companion device. Delivery guarantees belong to the transport
//! collaborator, which implements [`EventSender`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Namespace under which all gadget events are emitted.
pub const GADGET_NAMESPACE: &str = "Custom.Pet.Gadget";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The custom event names sent by the gadget.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventName {
    Sentry,
    Proximity,
    Speech,
    Power,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An event to be emitted to the companion device.
///
/// Constructed, emitted once, not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// The name of the event.
    pub name: EventName,

    /// JSON object payload of the event.
    pub payload: Value,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Outbound event boundary.
///
/// Implementations forward the event to the companion device under
/// [`GADGET_NAMESPACE`]. Sends are fire-and-forget: there is no
/// acknowledgement and no retry.
pub trait EventSender: Send + Sync {
    fn send_event(&self, event: Event);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EventName {
    /// The wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Sentry => "Sentry",
            EventName::Proximity => "Proximity",
            EventName::Speech => "Speech",
            EventName::Power => "Power",
        }
    }
}

impl Event {
    pub fn new(name: EventName, payload: Value) -> Self {
        Self { name, payload }
    }

    /// Build a speech event which the companion device will read out.
    pub fn speech(text: &str) -> Self {
        Self::new(EventName::Speech, json!({ "speechOut": text }))
    }

    /// Build a power report event bundling the latest telemetry readings and
    /// light intensity.
    pub fn power(voltage: f64, load_current: f64, charge_current: f64, light: f64) -> Self {
        Self::new(
            EventName::Power,
            json!({
                "voltage": voltage,
                "load_current": load_current,
                "charge_current": charge_current,
                "light": light
            }),
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(EventName::Sentry.as_str(), "Sentry");
        assert_eq!(EventName::Power.as_str(), "Power");
    }

    #[test]
    fn test_speech_event() {
        let event = Event::speech("Sentry mode activated");

        assert_eq!(event.name, EventName::Speech);
        assert_eq!(event.payload["speechOut"], "Sentry mode activated");
    }

    #[test]
    fn test_power_event() {
        let event = Event::power(3.862, 0.2, 0.0, 31.0);

        assert_eq!(event.name, EventName::Power);
        assert_eq!(event.payload["voltage"], 3.862);
        assert_eq!(event.payload["load_current"], 0.2);
        assert_eq!(event.payload["charge_current"], 0.0);
        assert_eq!(event.payload["light"], 31.0);
    }
}
