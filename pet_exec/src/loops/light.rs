//! Light loop - periodic ambient light sampling

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Internal
use crate::mode_store::ModeStore;
use crate::params::LightParams;
use gadget_if::eqpt::{LightMode, LightSensor};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Light monitor thread entry point.
///
/// Each cycle switches the sensor to ambient mode, lets it settle, stores
/// the intensity reading, then reconfigures the sensor for the next cycle
/// based on the battery voltage: raw-reflect when the battery is low, colour
/// otherwise. The mode branch never gates the reading already taken.
pub fn light_thread(modes: Arc<ModeStore>, mut light: Box<dyn LightSensor>, params: LightParams) {
    loop {
        light.set_mode(LightMode::Ambient);
        thread::sleep(Duration::from_secs_f64(params.settle_duration_s));

        let intensity = light.ambient_intensity();
        modes.set_light_intensity(intensity);
        debug!("Light intensity: {}", intensity);

        if modes.batt_voltage() < params.low_batt_threshold_v {
            light.set_mode(LightMode::RawReflect);
        } else {
            light.set_mode(LightMode::Color);
        }

        thread::sleep(Duration::from_secs_f64(params.read_period_s));
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_eqpt::MockLight;

    fn test_params() -> LightParams {
        LightParams {
            settle_duration_s: 0.01,
            read_period_s: 0.02,
            low_batt_threshold_v: 3.6,
        }
    }

    #[test]
    fn test_reading_is_stored_and_mode_follows_battery() {
        let modes = Arc::new(ModeStore::new());
        let mock = MockLight::new(42.0);

        // Healthy battery to begin with
        modes.set_batt_voltage(4.0);

        {
            let modes = modes.clone();
            let light = Box::new(mock.clone());
            thread::spawn(move || light_thread(modes, light, test_params()));
        }

        thread::sleep(Duration::from_millis(100));

        // The reading has landed in the mode store
        assert_eq!(modes.light_intensity(), 42.0);

        // Healthy battery cycles go Ambient then Color
        let seen = mock.modes_set();
        assert!(seen.len() >= 2);
        assert_eq!(seen[0], LightMode::Ambient);
        assert_eq!(seen[1], LightMode::Color);

        // Drop the battery below the threshold, later cycles must switch to
        // raw-reflect instead
        modes.set_batt_voltage(3.0);
        thread::sleep(Duration::from_millis(100));

        let seen = mock.modes_set();
        assert!(seen.contains(&LightMode::RawReflect));
    }
}
