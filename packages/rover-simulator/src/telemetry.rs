//! telemetry.rs — Synthetic sensor random walk
//!
//! Advances the telemetry record by one bounded random step per tick. Each field
//! has its own bias: temperature and gas drift upward, battery only ever drains.
//!
//! Draw order is fixed (temperature, distance, gas, battery, signal, heading),
//! six draws per tick, so a given source always yields the same trajectory.

use rover_types::{SensorOverride, TelemetryState};
use tracing::warn;

use crate::profiles::DriftProfile;
use crate::random::UnitSource;

pub const TEMPERATURE_BIAS: f64 = 0.48;
pub const TEMPERATURE_STEP_C: f64 = 0.6;
pub const GAS_BIAS: f64 = 0.4;
pub const SIGNAL_STEP_DBM: f64 = 4.0;
pub const SIGNAL_MIN_DBM: f64 = -95.0;
pub const SIGNAL_MAX_DBM: f64 = -20.0;
pub const HEADING_STEP_DEG: f64 = 30.0;

// ── Generator ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TelemetryGenerator {
    profile: DriftProfile,
}

impl TelemetryGenerator {
    pub fn new(profile: DriftProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &DriftProfile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: DriftProfile) {
        self.profile = profile;
    }

    /// One telemetry tick. Behavior and mode are carried over untouched.
    pub fn advance(&self, state: &TelemetryState, src: &mut dyn UnitSource) -> TelemetryState {
        let p = &self.profile;

        let temperature_c = round_dp(
            state.temperature_c + (src.next_unit() - TEMPERATURE_BIAS) * TEMPERATURE_STEP_C,
            1,
        );

        let distance_cm = round_cm(
            state.distance_cm as f64 + (src.next_unit() - 0.5) * p.distance_step_cm,
        )
        .max(p.distance_floor_cm);

        // No floor on gas: the walk may go negative
        let gas_ppm = round_dp(state.gas_ppm + (src.next_unit() - GAS_BIAS) * p.gas_step_ppm, 2);

        let drained =
            (state.battery_pct as f64 - src.next_unit() * p.battery_drain_rate * 100.0).round();
        let battery_pct = drained.clamp(0.0, 100.0) as u8;

        let signal_dbm = (state.signal_dbm + (src.next_unit() - 0.5) * SIGNAL_STEP_DBM)
            .clamp(SIGNAL_MIN_DBM, SIGNAL_MAX_DBM);

        let heading_deg =
            normalize_heading(state.heading_deg + (src.next_unit() - 0.5) * HEADING_STEP_DEG);

        TelemetryState {
            temperature_c,
            distance_cm,
            gas_ppm,
            battery_pct,
            signal_dbm,
            heading_deg,
            behavior: state.behavior,
            mode: state.mode,
        }
    }
}

// ── Operator actions ──────────────────────────────────────────────────────────

/// Which override fields took effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideOutcome {
    pub applied: Vec<&'static str>,
    pub ignored: Vec<&'static str>,
}

/// Write operator-entered values straight over the state. Malformed fields keep
/// their previous value.
pub fn apply_override(state: &mut TelemetryState, ov: &SensorOverride) -> OverrideOutcome {
    let mut out = OverrideOutcome::default();

    let mut field = |name: &'static str, value: &Option<rover_types::OverrideValue>| {
        let raw = value.as_ref()?;
        match raw.parse() {
            Some(v) => {
                out.applied.push(name);
                Some(v)
            }
            None => {
                warn!("Override: ignoring malformed {name} value {raw:?}");
                out.ignored.push(name);
                None
            }
        }
    };

    if let Some(v) = field("temperature", &ov.temperature) {
        state.temperature_c = v;
    }
    if let Some(v) = field("distance", &ov.distance) {
        state.distance_cm = round_cm(v);
    }
    if let Some(v) = field("gas", &ov.gas) {
        state.gas_ppm = v;
    }
    if let Some(v) = field("battery", &ov.battery) {
        state.battery_pct = v.round().clamp(0.0, 100.0) as u8;
    }
    if let Some(v) = field("signal", &ov.signal) {
        state.signal_dbm = v;
    }
    if let Some(v) = field("heading", &ov.heading) {
        state.heading_deg = normalize_heading(v);
    }

    out
}

/// Jump the four primary sensors to fresh plausible values.
pub fn randomize(state: &mut TelemetryState, src: &mut dyn UnitSource) {
    state.temperature_c = round_dp(src.uniform(20.0, 50.0), 1);
    state.distance_cm = round_cm(src.uniform(20.0, 420.0));
    state.gas_ppm = round_dp(src.uniform(0.0, 8.0), 2);
    state.battery_pct = src.uniform(20.0, 100.0).round().clamp(0.0, 100.0) as u8;
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn round_dp(v: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (v * scale).round() / scale
}

fn round_cm(v: f64) -> i32 {
    v.round() as i32
}

/// Wrap into [0, 360).
pub fn normalize_heading(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}
