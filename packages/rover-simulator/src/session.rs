//! session.rs — The one owned rover record and everything that mutates it
//!
//! A session owns the telemetry state, the generator and its random source, the
//! pause/autonomous flags, history and alerts. The host holds it behind a single
//! lock, so each tick or command runs to completion before the next.

use chrono::Utc;
use rover_types::{
    Alert, AlertLevel, ControlCommand, OperatorMode, ProfileName, SensorOverride,
    ServerMessage, TelemetryFrame, TelemetryState,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::alerts::{AlertLog, SensorWatch};
use crate::behavior::classify;
use crate::config::{ConfigError, FullConfig};
use crate::history::TelemetryHistory;
use crate::profiles::DriftProfile;
use crate::random::UnitSource;
use crate::telemetry::{self, OverrideOutcome, TelemetryGenerator};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("malformed control command: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode a raw control-socket message.
pub fn parse_command(raw: &str) -> Result<ControlCommand, CommandError> {
    Ok(serde_json::from_str(raw)?)
}

/// Result of one applied tick.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub frame: TelemetryFrame,
    pub alerts: Vec<Alert>,
}

pub struct RoverSession {
    state: TelemetryState,
    generator: TelemetryGenerator,
    source: Box<dyn UnitSource + Send + Sync>,
    paused: bool,
    autonomous: bool,
    tick: u64,
    history: TelemetryHistory,
    alerts: AlertLog,
    watch: SensorWatch,
}

impl RoverSession {
    pub fn new(profile: DriftProfile, source: Box<dyn UnitSource + Send + Sync>) -> Self {
        Self {
            state: TelemetryState::default(),
            generator: TelemetryGenerator::new(profile),
            source,
            paused: false,
            autonomous: false,
            tick: 0,
            history: TelemetryHistory::default(),
            alerts: AlertLog::default(),
            watch: SensorWatch::default(),
        }
    }

    pub fn from_config(cfg: &FullConfig) -> Result<Self, ConfigError> {
        let mut session = Self::new(
            DriftProfile::preset(cfg.telemetry.profile),
            cfg.source.build()?,
        );
        session.autonomous = cfg.telemetry.autonomous;
        session.history = TelemetryHistory::new(cfg.telemetry.history_len);
        session.alerts = AlertLog::new(cfg.alerts.capacity);
        Ok(session)
    }

    // ── Tick ──────────────────────────────────────────────────────────────────

    /// Advance one step. Paused sessions return `None` and leave state alone.
    pub fn tick(&mut self) -> Option<TickOutput> {
        if self.paused {
            return None;
        }

        let mut next = self.generator.advance(&self.state, self.source.as_mut());
        next.behavior = classify(&next, self.autonomous);
        self.state = next;
        self.tick += 1;

        let frame = self.snapshot();
        self.history.push(frame.clone());

        let alerts = self
            .watch
            .check(&self.state)
            .into_iter()
            .map(|(level, msg)| self.alerts.raise(level, msg))
            .collect();

        debug!(
            "tick={} T={:.1}°C d={}cm gas={:.2} batt={}% sig={:.1}dBm hdg={:.0}° → {}",
            self.tick,
            self.state.temperature_c,
            self.state.distance_cm,
            self.state.gas_ppm,
            self.state.battery_pct,
            self.state.signal_dbm,
            self.state.heading_deg,
            self.state.behavior,
        );

        Some(TickOutput { frame, alerts })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TelemetryFrame {
        TelemetryFrame {
            tick: self.tick,
            timestamp_ms: Utc::now().timestamp_millis(),
            autonomous: self.autonomous,
            paused: self.paused,
            state: self.state.clone(),
        }
    }

    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    pub fn history(&self) -> &TelemetryHistory {
        &self.history
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_autonomous(&self) -> bool {
        self.autonomous
    }

    pub fn profile(&self) -> ProfileName {
        self.generator.profile().name
    }

    pub fn status(&self) -> ServerMessage {
        ServerMessage::Status {
            paused: self.paused,
            autonomous: self.autonomous,
            profile: self.profile(),
        }
    }

    // ── Operator actions ──────────────────────────────────────────────────────

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Takes effect on the next tick.
    pub fn set_autonomous(&mut self, enabled: bool) {
        self.autonomous = enabled;
    }

    pub fn set_mode(&mut self, mode: OperatorMode) {
        self.state.mode = Some(mode);
    }

    pub fn set_profile(&mut self, name: ProfileName) {
        self.generator.set_profile(DriftProfile::preset(name));
    }

    pub fn apply_override(&mut self, ov: &SensorOverride) -> OverrideOutcome {
        telemetry::apply_override(&mut self.state, ov)
    }

    pub fn randomize(&mut self) {
        telemetry::randomize(&mut self.state, self.source.as_mut());
    }

    /// Back to session-start values. Tick count, history and alerts survive.
    pub fn reset(&mut self) {
        self.state = TelemetryState::default();
        self.watch.reset();
    }

    pub fn emergency_stop(&mut self) -> Alert {
        self.alerts.raise(AlertLevel::Critical, "Emergency STOP engaged")
    }

    pub fn clear_alerts(&mut self) {
        self.alerts.clear();
    }

    // ── Command dispatch ──────────────────────────────────────────────────────

    /// Apply a control command; returns the messages to broadcast.
    pub fn apply(&mut self, cmd: ControlCommand) -> Vec<ServerMessage> {
        match cmd {
            ControlCommand::Pause => {
                self.set_paused(true);
                info!("⏸ Telemetry paused");
                vec![self.status()]
            }
            ControlCommand::Resume => {
                self.set_paused(false);
                info!("▶ Telemetry resumed");
                vec![self.status()]
            }
            ControlCommand::TogglePause => {
                let paused = self.toggle_pause();
                info!("{} Telemetry {}", if paused { "⏸" } else { "▶" }, if paused { "paused" } else { "resumed" });
                vec![self.status()]
            }
            ControlCommand::SetAutonomous { enabled } => {
                self.set_autonomous(enabled);
                info!("🧭 Autonomous mode {}", if enabled { "on" } else { "off" });
                vec![self.status()]
            }
            ControlCommand::SetMode { mode } => {
                self.set_mode(mode);
                info!("🕹 Operator mode set to {mode:?}");
                vec![ServerMessage::Telemetry(self.snapshot())]
            }
            ControlCommand::Override(ov) => {
                let out = self.apply_override(&ov);
                info!("✍ Override applied: {:?} (ignored: {:?})", out.applied, out.ignored);
                vec![ServerMessage::Telemetry(self.snapshot())]
            }
            ControlCommand::Randomize => {
                self.randomize();
                info!("🎲 Sensors randomized");
                vec![ServerMessage::Telemetry(self.snapshot())]
            }
            ControlCommand::Reset => {
                self.reset();
                info!("↺ Sensors reset to defaults");
                vec![ServerMessage::Telemetry(self.snapshot())]
            }
            ControlCommand::EmergencyStop => vec![ServerMessage::Alert(self.emergency_stop())],
            ControlCommand::ClearAlerts => {
                self.clear_alerts();
                vec![ServerMessage::AlertsCleared]
            }
            ControlCommand::SetProfile { name } => {
                self.set_profile(name);
                info!("🎭 Drift profile '{name}' loaded");
                vec![self.status()]
            }
        }
    }
}
