//! Parameters structure for the pet rover executable
//!
//! Every loop period and maneuver constant used by the control core lives in
//! this one table, loaded from `params/pet_exec.toml`. The `Default`
//! implementations carry the calibrated values so the exec can still come up
//! when no parameter file is present.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the pet rover executable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    pub motion: MotionParams,
    pub patrol: PatrolParams,
    pub follow: FollowParams,
    pub light: LightParams,
    pub telemetry: TelemetryParams,
}

/// Parameters for motion control maneuver composition.
#[derive(Debug, Clone, Deserialize)]
pub struct MotionParams {
    /// Duration of the fixed turn sub-maneuver performed before the forward
    /// leg of a left/right move. Calibrated for hard smooth surface.
    ///
    /// Units: seconds
    pub turn_duration_s: f64,

    /// Speed of the inner (slow) side during a circle maneuver.
    ///
    /// Units: percent
    pub circle_inner_speed_pct: f64,

    /// Duration of the circle arc.
    ///
    /// Units: seconds
    pub circle_duration_s: f64,

    /// Number of legs driven for a square maneuver.
    pub square_num_legs: usize,

    /// Duration of each forward leg of the square.
    ///
    /// Units: seconds
    pub square_leg_duration_s: f64,

    /// Speed of the first (fast) spin of the sentry shuffle posture.
    ///
    /// Units: percent
    pub shuffle_spin_speed_pct: f64,

    /// Speed of the second (counter) spin of the sentry shuffle posture.
    ///
    /// Units: percent
    pub shuffle_counter_speed_pct: f64,

    /// Duration of each spin phase of the shuffle.
    ///
    /// Units: seconds
    pub shuffle_phase_duration_s: f64,

    /// Settle delay between the two spin phases of the shuffle.
    ///
    /// Units: seconds
    pub shuffle_settle_duration_s: f64,
}

/// Parameters for the patrol loop.
#[derive(Debug, Clone, Deserialize)]
pub struct PatrolParams {
    /// Period between checks of the patrol flag while patrol is disabled.
    ///
    /// Units: seconds
    pub idle_period_s: f64,

    /// Minimum duration of one random patrol leg.
    ///
    /// Units: seconds (integer, legs are whole seconds)
    pub min_leg_duration_s: u64,

    /// Maximum duration of one random patrol leg.
    ///
    /// Units: seconds (integer, legs are whole seconds)
    pub max_leg_duration_s: u64,

    /// The set of speeds a patrol leg may be driven at.
    ///
    /// Units: percent
    pub leg_speeds_pct: Vec<f64>,
}

/// Parameters for the beacon-follow loop.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowParams {
    /// Period between polls of the follow flag and beacon.
    ///
    /// Units: seconds
    pub poll_period_s: f64,

    /// Speed of the steering run towards the beacon.
    ///
    /// Units: percent
    pub steer_speed_pct: f64,

    /// Number of wheel rotations per steering run.
    pub steer_rotations: f64,
}

/// Parameters for the light monitor loop.
#[derive(Debug, Clone, Deserialize)]
pub struct LightParams {
    /// Settle delay between switching the sensor to ambient mode and taking
    /// the reading.
    ///
    /// Units: seconds
    pub settle_duration_s: f64,

    /// Period between the end of one reading and the start of the next
    /// cycle.
    ///
    /// Units: seconds
    pub read_period_s: f64,

    /// Battery voltage below which the sensor is put into raw-reflect mode
    /// for the next cycle.
    ///
    /// Units: volts
    pub low_batt_threshold_v: f64,
}

/// Parameters for the telemetry (power report) loop.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryParams {
    /// Delay before the first fetch cycle, giving the API client time to
    /// come up.
    ///
    /// Units: seconds
    pub startup_delay_s: f64,

    /// Period of the fetch-and-report cycle.
    ///
    /// Units: seconds
    pub report_period_s: f64,

    /// Remote property id of the battery voltage.
    pub batt_voltage_id: String,

    /// Remote property id of the load current.
    pub load_current_id: String,

    /// Remote property id of the charge current.
    pub charge_current_id: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionParams {
    fn default() -> Self {
        MotionParams {
            turn_duration_s: 2.0,
            circle_inner_speed_pct: 5.0,
            circle_duration_s: 12.0,
            square_num_legs: 4,
            square_leg_duration_s: 2.0,
            shuffle_spin_speed_pct: 80.0,
            shuffle_counter_speed_pct: 40.0,
            shuffle_phase_duration_s: 0.2,
            shuffle_settle_duration_s: 0.3,
        }
    }
}

impl Default for PatrolParams {
    fn default() -> Self {
        PatrolParams {
            idle_period_s: 1.0,
            min_leg_duration_s: 1,
            max_leg_duration_s: 5,
            leg_speeds_pct: vec![25.0, 50.0, 75.0, 100.0],
        }
    }
}

impl Default for FollowParams {
    fn default() -> Self {
        FollowParams {
            poll_period_s: 1.0,
            steer_speed_pct: 30.0,
            steer_rotations: 2.0,
        }
    }
}

impl Default for LightParams {
    fn default() -> Self {
        LightParams {
            settle_duration_s: 0.5,
            read_period_s: 5.0,
            low_batt_threshold_v: 3.6,
        }
    }
}

impl Default for TelemetryParams {
    fn default() -> Self {
        TelemetryParams {
            startup_delay_s: 2.0,
            report_period_s: 15.0,
            batt_voltage_id: String::from("batt_voltage"),
            load_current_id: String::from("load_current"),
            charge_current_id: String::from("charge_current"),
        }
    }
}
