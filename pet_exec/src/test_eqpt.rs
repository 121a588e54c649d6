//! Mock equipment used by the test suites.
//!
//! Every mock records what was asked of it behind an `Arc` so a test can
//! hold one clone while the code under test owns the other. `MockDrive`
//! additionally checks the serialisation contract: it trips an overlap flag
//! if any call begins before the previous one has returned.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// Internal
use gadget_if::eqpt::{
    ActuatorError, BeaconSensor, BumpSensor, DriveEqpt, LedColor, LedGroup, Leds, LightMode,
    LightSensor, RemoteFetchError, TelemetryApi,
};
use gadget_if::events::{Event, EventSender};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// Shared ordering journal, used by tests that need to assert the relative
/// order of actions across different mocks.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

// ---------------------------------------------------------------------------
// DRIVE
// ---------------------------------------------------------------------------

/// One recorded drive actuator call.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveCall {
    DriveTimed {
        left_pct: f64,
        right_pct: f64,
        duration_s: f64,
        block: bool,
    },
    SteerRotations {
        steering: f64,
        speed_pct: f64,
        rotations: f64,
        block: bool,
    },
    Stop,
}

#[derive(Clone)]
pub struct MockDrive {
    calls: Arc<Mutex<Vec<DriveCall>>>,
    journal: Option<Journal>,
    call_delay: Duration,
    in_call: Arc<AtomicBool>,
    overlap: Arc<AtomicBool>,
    fail_next: Arc<AtomicBool>,
}

impl MockDrive {
    pub fn new() -> Self {
        Self::with_call_delay(Duration::from_secs(0))
    }

    /// A mock whose calls take `call_delay` to return, making overlapping
    /// use from concurrent callers detectable.
    pub fn with_call_delay(call_delay: Duration) -> Self {
        MockDrive {
            calls: Arc::new(Mutex::new(Vec::new())),
            journal: None,
            call_delay,
            in_call: Arc::new(AtomicBool::new(false)),
            overlap: Arc::new(AtomicBool::new(false)),
            fail_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach an ordering journal; every successful call appends `"drive"`.
    pub fn with_journal(journal: Journal) -> Self {
        let mut mock = Self::new();
        mock.journal = Some(journal);
        mock
    }

    pub fn calls(&self) -> Vec<DriveCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn num_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Make the next call fail with an actuator fault.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// True if any call began before the previous one returned.
    pub fn overlap_detected(&self) -> bool {
        self.overlap.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        if self.in_call.swap(true, Ordering::SeqCst) {
            self.overlap.store(true, Ordering::SeqCst);
        }
        if self.call_delay > Duration::from_secs(0) {
            thread::sleep(self.call_delay);
        }
    }

    fn exit(&self) {
        self.in_call.store(false, Ordering::SeqCst);
    }

    fn record(&self, call: DriveCall) -> Result<(), ActuatorError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ActuatorError::Fault(String::from("injected fault")));
        }

        self.calls.lock().unwrap().push(call);

        if let Some(ref journal) = self.journal {
            journal.lock().unwrap().push(String::from("drive"));
        }

        Ok(())
    }
}

impl DriveEqpt for MockDrive {
    fn drive_timed(
        &mut self,
        left_pct: f64,
        right_pct: f64,
        duration_s: f64,
        block: bool,
    ) -> Result<(), ActuatorError> {
        self.enter();
        let res = self.record(DriveCall::DriveTimed {
            left_pct,
            right_pct,
            duration_s,
            block,
        });
        self.exit();
        res
    }

    fn steer_rotations(
        &mut self,
        steering: f64,
        speed_pct: f64,
        rotations: f64,
        block: bool,
    ) -> Result<(), ActuatorError> {
        self.enter();
        let res = self.record(DriveCall::SteerRotations {
            steering,
            speed_pct,
            rotations,
            block,
        });
        self.exit();
        res
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        self.enter();
        let res = self.record(DriveCall::Stop);
        self.exit();
        res
    }
}

// ---------------------------------------------------------------------------
// EVENTS
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct RecordingEventSender {
    events: Arc<Mutex<Vec<Event>>>,
    journal: Option<Journal>,
}

impl RecordingEventSender {
    pub fn new() -> Self {
        RecordingEventSender {
            events: Arc::new(Mutex::new(Vec::new())),
            journal: None,
        }
    }

    /// Attach an ordering journal; every send appends `"event:{name}"`.
    pub fn with_journal(journal: Journal) -> Self {
        let mut sender = Self::new();
        sender.journal = Some(journal);
        sender
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn num_events(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSender for RecordingEventSender {
    fn send_event(&self, event: Event) {
        if let Some(ref journal) = self.journal {
            journal
                .lock()
                .unwrap()
                .push(format!("event:{}", event.name.as_str()));
        }

        self.events.lock().unwrap().push(event);
    }
}

// ---------------------------------------------------------------------------
// LEDS
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockLeds {
    calls: Arc<Mutex<Vec<(LedGroup, LedColor, f64)>>>,
}

impl MockLeds {
    pub fn new() -> Self {
        MockLeds {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<(LedGroup, LedColor, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Leds for MockLeds {
    fn set_color(&mut self, group: LedGroup, color: LedColor, brightness_pct: f64) {
        self.calls.lock().unwrap().push((group, color, brightness_pct));
    }
}

// ---------------------------------------------------------------------------
// SENSORS
// ---------------------------------------------------------------------------

/// Beacon returning a scripted sequence of headings, then 0 forever.
#[derive(Clone)]
pub struct MockBeacon {
    headings: Arc<Mutex<VecDeque<i32>>>,
}

impl MockBeacon {
    pub fn new(headings: Vec<i32>) -> Self {
        MockBeacon {
            headings: Arc::new(Mutex::new(headings.into_iter().collect())),
        }
    }
}

impl BeaconSensor for MockBeacon {
    fn heading(&mut self) -> i32 {
        self.headings.lock().unwrap().pop_front().unwrap_or(0)
    }
}

/// Bump sensor asserting a fixed number of bumps, then never again.
#[derive(Clone)]
pub struct MockBump {
    bumps_remaining: Arc<Mutex<usize>>,
}

impl MockBump {
    pub fn new(num_bumps: usize) -> Self {
        MockBump {
            bumps_remaining: Arc::new(Mutex::new(num_bumps)),
        }
    }
}

impl BumpSensor for MockBump {
    fn wait_for_bump(&mut self) -> bool {
        {
            let mut remaining = self.bumps_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return true;
            }
        }

        // Out of scripted bumps, block like a real idle sensor
        loop {
            thread::sleep(Duration::from_secs(3600));
        }
    }
}

#[derive(Clone)]
pub struct MockLight {
    intensity: f64,
    modes_set: Arc<Mutex<Vec<LightMode>>>,
}

impl MockLight {
    pub fn new(intensity: f64) -> Self {
        MockLight {
            intensity,
            modes_set: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn modes_set(&self) -> Vec<LightMode> {
        self.modes_set.lock().unwrap().clone()
    }
}

impl LightSensor for MockLight {
    fn set_mode(&mut self, mode: LightMode) {
        self.modes_set.lock().unwrap().push(mode);
    }

    fn ambient_intensity(&mut self) -> f64 {
        self.intensity
    }
}

// ---------------------------------------------------------------------------
// TELEMETRY
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockTelemetry {
    values: Arc<Mutex<HashMap<String, f64>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockTelemetry {
    pub fn new() -> Self {
        MockTelemetry {
            values: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn set_value(&self, property_id: &str, value: f64) {
        self.values
            .lock()
            .unwrap()
            .insert(String::from(property_id), value);
    }

    /// Make every fetch of the given property fail until further notice.
    pub fn set_failing(&self, property_id: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(String::from(property_id));
    }
}

impl TelemetryApi for MockTelemetry {
    fn fetch_property(&mut self, property_id: &str) -> Result<f64, RemoteFetchError> {
        if self.failing.lock().unwrap().contains(property_id) {
            return Err(RemoteFetchError::RequestFailed(String::from(
                "injected failure",
            )));
        }

        self.values
            .lock()
            .unwrap()
            .get(property_id)
            .copied()
            .ok_or_else(|| RemoteFetchError::UnknownProperty(String::from(property_id)))
    }
}
