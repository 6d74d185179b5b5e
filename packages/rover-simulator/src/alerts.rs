//! alerts.rs — Operator alert log and threshold watch
//!
//! `SensorWatch` is edge-triggered: a condition fires once when it starts to hold
//! and has to clear before it can fire again. Otherwise a hot rover would raise
//! the same warning every tick.

use std::collections::VecDeque;

use rover_types::{Alert, AlertLevel, TelemetryState};
use tracing::info;

pub const DEFAULT_ALERT_CAPACITY: usize = 50;

pub const TEMPERATURE_WARN_C: f64 = 40.0;
pub const GAS_WARN_PPM: f64 = 5.0;
pub const BATTERY_WARN_PCT: u8 = 20;

// ── Log ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AlertLog {
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CAPACITY)
    }
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self { alerts: VecDeque::new(), capacity: capacity.max(1) }
    }

    pub fn raise(&mut self, level: AlertLevel, message: impl Into<String>) -> Alert {
        let alert = Alert::new(level, message);
        info!("🚨 [{:?}] {}", alert.level, alert.message);
        self.alerts.push_front(alert.clone());
        self.alerts.truncate(self.capacity);
        alert
    }

    /// Newest first.
    pub fn list(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}

// ── Threshold watch ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SensorWatch {
    hot: bool,
    gas: bool,
    low_battery: bool,
}

impl SensorWatch {
    /// Conditions that started holding with this reading.
    pub fn check(&mut self, state: &TelemetryState) -> Vec<(AlertLevel, String)> {
        let mut fired = Vec::new();

        if rising(&mut self.hot, state.temperature_c > TEMPERATURE_WARN_C) {
            fired.push((
                AlertLevel::Warning,
                format!("Temperature high: {:.1} °C", state.temperature_c),
            ));
        }
        if rising(&mut self.gas, state.gas_ppm > GAS_WARN_PPM) {
            fired.push((AlertLevel::Warning, format!("Gas level rising: {:.2} PPM", state.gas_ppm)));
        }
        if rising(&mut self.low_battery, state.battery_pct < BATTERY_WARN_PCT) {
            fired.push((AlertLevel::Warning, format!("Battery low: {} %", state.battery_pct)));
        }

        fired
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn rising(latch: &mut bool, now: bool) -> bool {
    let fired = now && !*latch;
    *latch = now;
    fired
}
