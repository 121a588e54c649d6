//! Power loop - periodic telemetry fetch and report

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Internal
use crate::mode_store::ModeStore;
use crate::params::TelemetryParams;
use gadget_if::eqpt::TelemetryApi;
use gadget_if::events::{Event, EventSender};
use util::maths::round_dp;
use util::session;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Power telemetry thread entry point.
///
/// After a short startup delay each cycle fetches the battery voltage, load
/// current and charge current from the remote telemetry store, waits out the
/// report period, and emits a single power event bundling the three readings
/// with the latest light intensity. A failed fetch is logged and the
/// reading carries its previous value (0.0 before the first success); the
/// cycle is never retried early and the loop never terminates on failure.
pub fn power_thread(
    modes: Arc<ModeStore>,
    mut api: Box<dyn TelemetryApi>,
    events: Arc<dyn EventSender>,
    params: TelemetryParams,
) {
    thread::sleep(Duration::from_secs_f64(params.startup_delay_s));

    let mut voltage = 0.0;
    let mut load_current = 0.0;
    let mut charge_current = 0.0;

    loop {
        match api.fetch_property(&params.batt_voltage_id) {
            Ok(v) => {
                voltage = round_dp(v, 3);
                modes.set_batt_voltage(voltage);
                debug!("Battery voltage: {} V", voltage);
            }
            Err(e) => warn!("Could not fetch battery voltage: {}", e),
        }

        match api.fetch_property(&params.load_current_id) {
            Ok(v) => {
                load_current = round_dp(v, 1);
                debug!("Load current: {} A", load_current);
            }
            Err(e) => warn!("Could not fetch load current: {}", e),
        }

        match api.fetch_property(&params.charge_current_id) {
            Ok(v) => {
                charge_current = round_dp(v, 1);
                debug!("Charge current: {} A", charge_current);
            }
            Err(e) => warn!("Could not fetch charge current: {}", e),
        }

        thread::sleep(Duration::from_secs_f64(params.report_period_s));

        let event = Event::power(
            voltage,
            load_current,
            charge_current,
            modes.light_intensity(),
        );

        // Archive the bundle alongside the session logs before sending it
        session::save_with_timestamp("telemetry/power.json", event.payload.clone());

        events.send_event(event);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_eqpt::{MockTelemetry, RecordingEventSender};
    use gadget_if::events::EventName;

    fn test_params() -> TelemetryParams {
        TelemetryParams {
            startup_delay_s: 0.01,
            report_period_s: 0.03,
            batt_voltage_id: String::from("batt_voltage"),
            load_current_id: String::from("load_current"),
            charge_current_id: String::from("charge_current"),
        }
    }

    #[test]
    fn test_report_cycle() {
        let modes = Arc::new(ModeStore::new());
        let events = RecordingEventSender::new();
        let api = MockTelemetry::new();

        api.set_value("batt_voltage", 3.8624);
        api.set_value("load_current", 0.24);
        api.set_value("charge_current", 0.06);

        modes.set_light_intensity(31.0);

        {
            let modes = modes.clone();
            let api = Box::new(api.clone());
            let events: Arc<dyn EventSender> = Arc::new(events.clone());
            thread::spawn(move || power_thread(modes, api, events, test_params()));
        }

        thread::sleep(Duration::from_millis(250));

        // The voltage has been rounded and stored for the other loops
        assert_eq!(modes.batt_voltage(), 3.862);

        let recorded = events.events();
        assert!(recorded.len() >= 2);

        let event = &recorded[0];
        assert_eq!(event.name, EventName::Power);
        assert_eq!(event.payload["voltage"], 3.862);
        assert_eq!(event.payload["load_current"], 0.2);
        assert_eq!(event.payload["charge_current"], 0.1);
        assert_eq!(event.payload["light"], 31.0);
    }

    #[test]
    fn test_failed_fetch_carries_previous_value_and_keeps_reporting() {
        let modes = Arc::new(ModeStore::new());
        let events = RecordingEventSender::new();
        let api = MockTelemetry::new();

        api.set_value("batt_voltage", 3.9);
        api.set_value("charge_current", 0.0);

        // The load current fetch fails on every cycle
        api.set_failing("load_current");

        {
            let modes = modes.clone();
            let api = Box::new(api.clone());
            let events: Arc<dyn EventSender> = Arc::new(events.clone());
            thread::spawn(move || power_thread(modes, api, events, test_params()));
        }

        thread::sleep(Duration::from_millis(250));

        // Reports keep flowing at the normal cadence despite the failure
        let recorded = events.events();
        assert!(recorded.len() >= 2);

        for event in recorded {
            assert_eq!(event.name, EventName::Power);
            assert_eq!(event.payload["voltage"], 3.9);

            // Stale carry: the value never fetched stays at its initial 0.0
            assert_eq!(event.payload["load_current"], 0.0);
        }
    }
}
