//! behavior.rs — Behavior label from current telemetry
//!
//! Priority chain, first match wins. No memory of the previous label, so the
//! result can flip from one tick to the next.

use rover_types::{Behavior, TelemetryState};

/// Below this the rover heads home
pub const LOW_BATTERY_PCT: u8 = 20;
/// Obstacle closer than this triggers avoidance
pub const OBSTACLE_DISTANCE_CM: i32 = 30;
/// Gas above this triggers avoidance
pub const GAS_HAZARD_PPM: f64 = 5.0;

pub fn classify(state: &TelemetryState, autonomous: bool) -> Behavior {
    if !autonomous {
        Behavior::Idle
    } else if state.battery_pct < LOW_BATTERY_PCT {
        Behavior::Return
    } else if state.distance_cm < OBSTACLE_DISTANCE_CM || state.gas_ppm > GAS_HAZARD_PPM {
        Behavior::Avoid
    } else {
        Behavior::Explore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reading(battery_pct: u8, distance_cm: i32, gas_ppm: f64) -> TelemetryState {
        TelemetryState { battery_pct, distance_cm, gas_ppm, ..TelemetryState::default() }
    }

    #[test]
    fn low_battery_beats_obstacle() {
        assert_eq!(classify(&reading(10, 100, 0.0), true), Behavior::Return);
        assert_eq!(classify(&reading(10, 5, 9.0), true), Behavior::Return);
    }

    #[test]
    fn close_obstacle_or_gas_means_avoid() {
        assert_eq!(classify(&reading(50, 10, 0.0), true), Behavior::Avoid);
        assert_eq!(classify(&reading(50, 100, 6.0), true), Behavior::Avoid);
    }

    #[test]
    fn clear_path_means_explore() {
        assert_eq!(classify(&reading(50, 100, 0.0), true), Behavior::Explore);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(classify(&reading(20, 30, 5.0), true), Behavior::Explore);
        assert_eq!(classify(&reading(19, 30, 5.0), true), Behavior::Return);
        assert_eq!(classify(&reading(20, 29, 5.0), true), Behavior::Avoid);
        assert_eq!(classify(&reading(20, 30, 5.01), true), Behavior::Avoid);
    }

    proptest! {
        #[test]
        fn manual_control_is_always_idle(
            battery in 0u8..=100,
            distance in -100i32..1_000,
            gas in -10.0f64..50.0,
        ) {
            prop_assert_eq!(classify(&reading(battery, distance, gas), false), Behavior::Idle);
        }
    }
}
