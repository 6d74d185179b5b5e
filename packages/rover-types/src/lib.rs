//! # rover-types
//!
//! Shared data model and wire messages for the rover telemetry simulator.
//!
//! These types are used by:
//! - `rover-simulator`: generator, classifier and the control WebSocket
//! - dashboards: every JSON message on the control socket is one of
//!   [`ServerMessage`] (server → client) or [`ControlCommand`] (client → server)
//!
//! ## Units
//!
//! - temperature: °C
//! - distance: cm (integer)
//! - gas: PPM
//! - battery: % (integer, 0–100)
//! - signal: dBm
//! - heading: degrees, always in [0, 360)

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_TEMPERATURE_C: f64 = 22.6;
pub const DEFAULT_DISTANCE_CM: i32 = 120;
pub const DEFAULT_GAS_PPM: f64 = 3.0;
pub const DEFAULT_BATTERY_PCT: u8 = 88;
pub const DEFAULT_SIGNAL_DBM: f64 = -60.0;
pub const DEFAULT_HEADING_DEG: f64 = 0.0;

// ── Behavior ──────────────────────────────────────────────────────────────────

/// Discrete operating label derived from telemetry each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Autonomous mode is off
    #[default]
    Idle,
    /// Nothing in the way, wander
    Explore,
    /// Obstacle close or gas hazard
    Avoid,
    /// Battery low, head back to base
    Return,
}

impl Behavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Explore => "explore",
            Self::Avoid => "avoid",
            Self::Return => "return",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-selected drive mode. Only ever set by an explicit operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorMode {
    Manual,
    Autonomous,
}

// ── Telemetry state ───────────────────────────────────────────────────────────

/// The single telemetry record of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryState {
    pub temperature_c: f64,
    pub distance_cm: i32,
    pub gas_ppm: f64,
    pub battery_pct: u8,
    pub signal_dbm: f64,
    pub heading_deg: f64,
    pub behavior: Behavior,
    /// Absent until the operator first picks a mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<OperatorMode>,
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self {
            temperature_c: DEFAULT_TEMPERATURE_C,
            distance_cm: DEFAULT_DISTANCE_CM,
            gas_ppm: DEFAULT_GAS_PPM,
            battery_pct: DEFAULT_BATTERY_PCT,
            signal_dbm: DEFAULT_SIGNAL_DBM,
            heading_deg: DEFAULT_HEADING_DEG,
            behavior: Behavior::Idle,
            mode: None,
        }
    }
}

// ── Operator overrides ────────────────────────────────────────────────────────

/// One operator-entered value. Form inputs arrive as text, scripts send numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Number(f64),
    Text(String),
}

impl OverrideValue {
    /// Finite numeric value, or `None` when the input is malformed.
    pub fn parse(&self) -> Option<f64> {
        let v = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for OverrideValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for OverrideValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Partial field set written directly over the telemetry state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<OverrideValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<OverrideValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<OverrideValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<OverrideValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<OverrideValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<OverrideValue>,
}

// ── Drift profiles ────────────────────────────────────────────────────────────

/// Named random-walk constant sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    /// Primary 1200 ms dashboard loop
    #[default]
    Dashboard,
    /// Component store variant: higher distance floor, slower drain
    Store,
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => f.write_str("dashboard"),
            Self::Store => f.write_str("store"),
        }
    }
}

// ── Frames ────────────────────────────────────────────────────────────────────

/// One published telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    /// Ticks applied since session start (uptime counter)
    pub tick: u64,
    /// Unix ms at which the frame was produced
    pub timestamp_ms: i64,
    pub autonomous: bool,
    pub paused: bool,
    pub state: TelemetryState,
}

// ── Alerts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub level: AlertLevel,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

// ── Control socket messages ───────────────────────────────────────────────────

/// Server → client. Serialized as `{ "type": "...", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Telemetry(TelemetryFrame),
    History { frames: Vec<TelemetryFrame> },
    Status { paused: bool, autonomous: bool, profile: ProfileName },
    Alert(Alert),
    Alerts { alerts: Vec<Alert> },
    AlertsCleared,
}

/// Client → server. Serialized as `{ "cmd": "...", "args": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "args", rename_all = "snake_case")]
pub enum ControlCommand {
    Pause,
    Resume,
    TogglePause,
    SetAutonomous { enabled: bool },
    SetMode { mode: OperatorMode },
    Override(SensorOverride),
    Randomize,
    Reset,
    EmergencyStop,
    ClearAlerts,
    SetProfile { name: ProfileName },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_state_matches_session_start_values() {
        let s = TelemetryState::default();
        assert_eq!(s.temperature_c, 22.6);
        assert_eq!(s.distance_cm, 120);
        assert_eq!(s.gas_ppm, 3.0);
        assert_eq!(s.battery_pct, 88);
        assert_eq!(s.heading_deg, 0.0);
        assert_eq!(s.behavior, Behavior::Idle);
        assert!(s.mode.is_none());
    }

    #[test]
    fn behavior_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Behavior::Return).unwrap(), json!("return"));
        assert_eq!(Behavior::Avoid.to_string(), "avoid");
    }

    #[test]
    fn absent_mode_is_omitted_on_the_wire() {
        let v = serde_json::to_value(TelemetryState::default()).unwrap();
        assert!(v.get("mode").is_none());
        assert_eq!(v["behavior"], json!("idle"));
    }

    #[test]
    fn override_values_parse_numbers_and_text() {
        assert_eq!(OverrideValue::from(41.5).parse(), Some(41.5));
        assert_eq!(OverrideValue::from(" 12.25 ").parse(), Some(12.25));
        assert_eq!(OverrideValue::from("0").parse(), Some(0.0));
        assert_eq!(OverrideValue::from("warm").parse(), None);
        assert_eq!(OverrideValue::from("").parse(), None);
        assert_eq!(OverrideValue::from("inf").parse(), None);
        assert_eq!(OverrideValue::Number(f64::NAN).parse(), None);
    }

    #[test]
    fn commands_decode_with_and_without_args() {
        let c: ControlCommand = serde_json::from_value(json!({ "cmd": "pause" })).unwrap();
        assert_eq!(c, ControlCommand::Pause);

        let c: ControlCommand =
            serde_json::from_value(json!({ "cmd": "set_autonomous", "args": { "enabled": true } }))
                .unwrap();
        assert_eq!(c, ControlCommand::SetAutonomous { enabled: true });

        let c: ControlCommand = serde_json::from_value(json!({
            "cmd": "override",
            "args": { "temperature": "31.5", "battery": 15 }
        }))
        .unwrap();
        let ControlCommand::Override(ov) = c else { panic!("expected override") };
        assert_eq!(ov.temperature, Some(OverrideValue::Text("31.5".into())));
        assert_eq!(ov.battery, Some(OverrideValue::Number(15.0)));
        assert!(ov.gas.is_none());

        let c: ControlCommand =
            serde_json::from_value(json!({ "cmd": "set_profile", "args": { "name": "store" } }))
                .unwrap();
        assert_eq!(c, ControlCommand::SetProfile { name: ProfileName::Store });
    }

    #[test]
    fn server_messages_are_type_tagged() {
        let v = serde_json::to_value(ServerMessage::AlertsCleared).unwrap();
        assert_eq!(v, json!({ "type": "alerts_cleared" }));

        let frame = TelemetryFrame {
            tick: 3,
            timestamp_ms: 0,
            autonomous: true,
            paused: false,
            state: TelemetryState::default(),
        };
        let v = serde_json::to_value(ServerMessage::Telemetry(frame)).unwrap();
        assert_eq!(v["type"], json!("telemetry"));
        assert_eq!(v["tick"], json!(3));
        assert_eq!(v["state"]["distance_cm"], json!(120));
    }
}
