//! # Mode store
//!
//! Process-lifetime store of the rover's mode flags and latest sensor
//! readings, shared by the directive processor and all five control loops.
//!
//! Every field is an independent atomic: a reader never sees a torn value
//! and no cross-field ordering is implied, which matches how the modes are
//! actually used (each flag gates one loop, each reading is a latest-value
//! cell). Relaxed ordering is sufficient for that.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared mode and reading store.
///
/// Note that `patrol` and `follow` are deliberately not mutually exclusive,
/// both loops may be active at once and the motion controller arbitrates
/// their actuator access.
#[derive(Default)]
pub struct ModeStore {
    /// True while the patrol loop should perform random movement.
    patrol_enabled: AtomicBool,

    /// True while the follow loop should track the beacon.
    follow_enabled: AtomicBool,

    /// True once sentry mode has been activated.
    sentry_enabled: AtomicBool,

    /// Latest battery voltage, stored as f64 bits.
    batt_voltage_bits: AtomicU64,

    /// Latest ambient light intensity, stored as f64 bits.
    light_intensity_bits: AtomicU64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl ModeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patrol_enabled(&self) -> bool {
        self.patrol_enabled.load(Ordering::Relaxed)
    }

    pub fn set_patrol_enabled(&self, enabled: bool) {
        let was = self.patrol_enabled.swap(enabled, Ordering::Relaxed);
        if was != enabled {
            info!(
                "Patrol mode {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }

    pub fn follow_enabled(&self) -> bool {
        self.follow_enabled.load(Ordering::Relaxed)
    }

    pub fn set_follow_enabled(&self, enabled: bool) {
        let was = self.follow_enabled.swap(enabled, Ordering::Relaxed);
        if was != enabled {
            info!(
                "Follow mode {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }

    pub fn sentry_enabled(&self) -> bool {
        self.sentry_enabled.load(Ordering::Relaxed)
    }

    pub fn set_sentry_enabled(&self, enabled: bool) {
        let was = self.sentry_enabled.swap(enabled, Ordering::Relaxed);
        if was != enabled {
            info!(
                "Sentry mode {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }

    /// Latest battery voltage in volts, 0.0 before the first telemetry
    /// fetch has succeeded.
    pub fn batt_voltage(&self) -> f64 {
        f64::from_bits(self.batt_voltage_bits.load(Ordering::Relaxed))
    }

    pub fn set_batt_voltage(&self, voltage: f64) {
        self.batt_voltage_bits
            .store(voltage.to_bits(), Ordering::Relaxed);
    }

    /// Latest ambient light intensity, 0.0 before the first reading.
    pub fn light_intensity(&self) -> f64 {
        f64::from_bits(self.light_intensity_bits.load(Ordering::Relaxed))
    }

    pub fn set_light_intensity(&self, intensity: f64) {
        self.light_intensity_bits
            .store(intensity.to_bits(), Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flags_are_independent() {
        let modes = ModeStore::new();

        assert!(!modes.patrol_enabled());
        assert!(!modes.follow_enabled());
        assert!(!modes.sentry_enabled());

        // Both patrol and follow may be enabled at once
        modes.set_patrol_enabled(true);
        modes.set_follow_enabled(true);
        assert!(modes.patrol_enabled());
        assert!(modes.follow_enabled());
        assert!(!modes.sentry_enabled());

        // Clearing one leaves the others untouched
        modes.set_patrol_enabled(false);
        assert!(!modes.patrol_enabled());
        assert!(modes.follow_enabled());
    }

    #[test]
    fn test_readings_round_trip() {
        let modes = ModeStore::new();

        assert_eq!(modes.batt_voltage(), 0.0);
        assert_eq!(modes.light_intensity(), 0.0);

        modes.set_batt_voltage(3.862);
        modes.set_light_intensity(27.5);

        assert_eq!(modes.batt_voltage(), 3.862);
        assert_eq!(modes.light_intensity(), 27.5);
    }
}
