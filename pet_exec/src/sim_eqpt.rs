//! # Simulated equipment
//!
//! Simulated backends for every equipment collaborator, used for testing and
//! development of the control core without the physical rover. All devices
//! read from one shared [`SimVars`] store, so a bench harness can poke
//! values (beacon heading, touch state) while the exec runs.
//!
//! The real drivers implement the same `gadget_if::eqpt` traits and are out
//! of scope here.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Internal
use gadget_if::eqpt::{
    ActuatorError, BeaconSensor, BumpSensor, DriveEqpt, LedColor, LedGroup, Leds, LightMode,
    LightSensor, RemoteFetchError, TelemetryApi,
};
use gadget_if::events::{Event, EventSender, GADGET_NAMESPACE};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Poll period of the simulated bump sensor's blocking wait.
const BUMP_POLL_PERIOD_S: f64 = 0.1;

/// Wheel rotations per second the simulated drive manages at 100 % speed,
/// used to turn a rotation count into a blocking duration.
const SIM_MAX_RPS: f64 = 2.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared simulation variables, the single place a bench harness pokes to
/// stimulate the sensors.
#[derive(Default)]
pub struct SimVars {
    /// Simulated heading to the beacon, 0 meaning not visible.
    pub beacon_heading: AtomicI32,

    /// True while the simulated touch sensor is pressed.
    pub touch_bump: AtomicBool,

    /// Simulated ambient light intensity, stored as f64 bits.
    ambient_light_bits: AtomicU64,
}

impl SimVars {
    pub fn new() -> Arc<Self> {
        let vars = SimVars::default();
        vars.set_ambient_light(30.0);
        Arc::new(vars)
    }

    pub fn ambient_light(&self) -> f64 {
        f64::from_bits(self.ambient_light_bits.load(Ordering::Relaxed))
    }

    pub fn set_ambient_light(&self, intensity: f64) {
        self.ambient_light_bits
            .store(intensity.to_bits(), Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// DRIVE
// ---------------------------------------------------------------------------

/// Simulated differential drive. Commands are logged, blocking calls wait
/// out their nominal duration.
pub struct SimDrive;

impl SimDrive {
    pub fn new() -> Self {
        SimDrive
    }
}

impl DriveEqpt for SimDrive {
    fn drive_timed(
        &mut self,
        left_pct: f64,
        right_pct: f64,
        duration_s: f64,
        block: bool,
    ) -> Result<(), ActuatorError> {
        debug!(
            "Drive: left {} %, right {} % for {} s ({})",
            left_pct,
            right_pct,
            duration_s,
            if block { "blocking" } else { "non-blocking" }
        );

        if block {
            thread::sleep(Duration::from_secs_f64(duration_s));
        }

        Ok(())
    }

    fn steer_rotations(
        &mut self,
        steering: f64,
        speed_pct: f64,
        rotations: f64,
        block: bool,
    ) -> Result<(), ActuatorError> {
        debug!(
            "Steer: bias {} at {} % for {} rotations ({})",
            steering,
            speed_pct,
            rotations,
            if block { "blocking" } else { "non-blocking" }
        );

        if block && speed_pct != 0.0 {
            let duration_s = rotations / (speed_pct.abs() / 100.0 * SIM_MAX_RPS);
            thread::sleep(Duration::from_secs_f64(duration_s));
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        debug!("Drive: stop");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SENSORS
// ---------------------------------------------------------------------------

/// Simulated infrared beacon seeker.
pub struct SimBeacon {
    vars: Arc<SimVars>,
}

impl SimBeacon {
    pub fn new(vars: Arc<SimVars>) -> Self {
        SimBeacon { vars }
    }
}

impl BeaconSensor for SimBeacon {
    fn heading(&mut self) -> i32 {
        self.vars.beacon_heading.load(Ordering::Relaxed)
    }
}

/// Simulated touch sensor, polling the shared touch state.
pub struct SimBump {
    vars: Arc<SimVars>,
}

impl SimBump {
    pub fn new(vars: Arc<SimVars>) -> Self {
        SimBump { vars }
    }
}

impl BumpSensor for SimBump {
    fn wait_for_bump(&mut self) -> bool {
        while !self.vars.touch_bump.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_secs_f64(BUMP_POLL_PERIOD_S));
        }

        true
    }
}

/// Simulated colour sensor.
pub struct SimLight {
    vars: Arc<SimVars>,
    mode: LightMode,
}

impl SimLight {
    pub fn new(vars: Arc<SimVars>) -> Self {
        SimLight {
            vars,
            mode: LightMode::Ambient,
        }
    }
}

impl LightSensor for SimLight {
    fn set_mode(&mut self, mode: LightMode) {
        self.mode = mode;
    }

    fn ambient_intensity(&mut self) -> f64 {
        if self.mode != LightMode::Ambient {
            debug!("Ambient intensity read while in {:?} mode", self.mode);
        }

        self.vars.ambient_light()
    }
}

// ---------------------------------------------------------------------------
// LEDS
// ---------------------------------------------------------------------------

/// Simulated status LEDs, changes are just logged.
pub struct SimLeds;

impl SimLeds {
    pub fn new() -> Self {
        SimLeds
    }
}

impl Leds for SimLeds {
    fn set_color(&mut self, group: LedGroup, color: LedColor, brightness_pct: f64) {
        debug!("LED {:?}: {:?} at {}", group, color, brightness_pct);
    }
}

// ---------------------------------------------------------------------------
// TELEMETRY
// ---------------------------------------------------------------------------

/// Simulated remote telemetry store with plausible power readings.
///
/// Every `FAIL_EVERY_NTH` fetch fails, exercising the stale-carry path of
/// the power loop.
pub struct SimTelemetry {
    num_fetches: u64,
}

const FAIL_EVERY_NTH: u64 = 7;

impl SimTelemetry {
    pub fn new() -> Self {
        SimTelemetry { num_fetches: 0 }
    }
}

impl TelemetryApi for SimTelemetry {
    fn fetch_property(&mut self, property_id: &str) -> Result<f64, RemoteFetchError> {
        self.num_fetches += 1;

        if self.num_fetches % FAIL_EVERY_NTH == 0 {
            return Err(RemoteFetchError::RequestFailed(String::from(
                "simulated outage",
            )));
        }

        match property_id {
            "batt_voltage" => Ok(3.862),
            "load_current" => Ok(0.24),
            "charge_current" => Ok(0.06),
            other => Err(RemoteFetchError::UnknownProperty(String::from(other))),
        }
    }
}

// ---------------------------------------------------------------------------
// EVENTS
// ---------------------------------------------------------------------------

/// Event sender which logs the serialized event instead of forwarding it.
///
/// Stands in for the companion-device transport, which is out of scope for
/// the control core.
pub struct LogEventSender;

impl LogEventSender {
    pub fn new() -> Self {
        LogEventSender
    }
}

impl EventSender for LogEventSender {
    fn send_event(&self, event: Event) {
        info!(
            "Event {}/{}: {}",
            GADGET_NAMESPACE,
            event.name.as_str(),
            event.payload
        );
    }
}
