//! profiles.rs — Named drift constant sets for the telemetry random walk
//!
//! The dashboard loop and the component store evolved separate copies of the
//! walk with different constants. Both are kept as explicit presets; `dashboard`
//! is the default and the one the main tick loop runs unless told otherwise.

use rover_types::ProfileName;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftProfile {
    pub name: ProfileName,
    /// Generator never reports a distance below this
    pub distance_floor_cm: i32,
    /// Full width of the distance step (±half per tick)
    pub distance_step_cm: f64,
    /// Scale on the upward-biased gas step
    pub gas_step_ppm: f64,
    /// Fraction of 100 % the battery may lose in one tick
    pub battery_drain_rate: f64,
}

impl Default for DriftProfile {
    fn default() -> Self {
        preset_dashboard()
    }
}

impl DriftProfile {
    pub fn preset(name: ProfileName) -> Self {
        match name {
            ProfileName::Dashboard => preset_dashboard(),
            ProfileName::Store => preset_store(),
        }
    }
}

pub fn preset_dashboard() -> DriftProfile {
    DriftProfile {
        name: ProfileName::Dashboard,
        distance_floor_cm: 5,
        distance_step_cm: 6.0,
        gas_step_ppm: 0.5,
        battery_drain_rate: 0.02,
    }
}

pub fn preset_store() -> DriftProfile {
    DriftProfile {
        name: ProfileName::Store,
        distance_floor_cm: 10,
        distance_step_cm: 4.0,
        gas_step_ppm: 0.4,
        battery_drain_rate: 0.005,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_is_the_default() {
        assert_eq!(DriftProfile::default(), preset_dashboard());
        assert_eq!(DriftProfile::preset(ProfileName::default()).distance_floor_cm, 5);
    }

    #[test]
    fn store_preset_keeps_its_own_constants() {
        let p = DriftProfile::preset(ProfileName::Store);
        assert_eq!(p.distance_floor_cm, 10);
        assert_eq!(p.battery_drain_rate, 0.005);
        assert_eq!(p.name, ProfileName::Store);
    }
}
