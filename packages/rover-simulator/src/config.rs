//! config.rs — config.toml model
//!
//! Every section is optional; missing keys fall back to the values the dashboard
//! has always run with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rover_types::ProfileName;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::alerts::DEFAULT_ALERT_CAPACITY;
use crate::history::DEFAULT_HISTORY_LEN;
use crate::random::{RngSource, ScriptedSource, UnitSource};

/// Shipped next to the crate and compiled in as the fallback.
pub const BUNDLED_CONFIG: &str = include_str!("../config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("telemetry.tick_ms must be greater than zero")]
    ZeroTickPeriod,
    #[error("scripted source needs at least one value")]
    EmptyScript,
    #[error("scripted source value {0} is outside [0, 1)")]
    ScriptValueOutOfRange(f64),
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FullConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub source: SourceConfig,
    pub alerts: AlertsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub ctrl_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), ctrl_port: 9191 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub tick_ms: u64,
    pub profile: ProfileName,
    pub autonomous: bool,
    pub history_len: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1200,
            profile: ProfileName::Dashboard,
            autonomous: false,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl TelemetryConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Scripted values win over a seed; with neither the source is entropy-seeded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub seed: Option<u64>,
    pub scripted: Option<Vec<f64>>,
}

impl SourceConfig {
    pub fn build(&self) -> Result<Box<dyn UnitSource + Send + Sync>, ConfigError> {
        if let Some(values) = &self.scripted {
            info!("🎞 Scripted random source ({} values)", values.len());
            return Ok(Box::new(ScriptedSource::new(values.clone())?));
        }
        match self.seed {
            Some(seed) => {
                info!("🎲 Seeded random source (seed={seed})");
                Ok(Box::new(RngSource::seeded(seed)))
            }
            None => Ok(Box::new(RngSource::from_entropy())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub capacity: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_ALERT_CAPACITY }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl FullConfig {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read `path`, or the bundled config when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("{} not found, using bundled config", path.display());
            return Self::from_toml(BUNDLED_CONFIG);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if let Some(values) = &self.source.scripted {
            ScriptedSource::new(values.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn bundled_config_parses() {
        let cfg = FullConfig::from_toml(BUNDLED_CONFIG).unwrap();
        assert_eq!(cfg.telemetry.tick_ms, 1200);
        assert_eq!(cfg.telemetry.profile, ProfileName::Dashboard);
        assert_eq!(cfg.telemetry.history_len, 30);
        assert!(!cfg.telemetry.autonomous);
    }

    #[test]
    fn empty_file_means_defaults() {
        let cfg = FullConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.ctrl_port, 9191);
        assert_eq!(cfg.alerts.capacity, DEFAULT_ALERT_CAPACITY);
        assert!(cfg.source.seed.is_none());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = FullConfig::from_toml(
            r#"
            [telemetry]
            profile = "store"
            autonomous = true

            [source]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(cfg.telemetry.profile, ProfileName::Store);
        assert!(cfg.telemetry.autonomous);
        assert_eq!(cfg.telemetry.tick_ms, 1200);
        assert_eq!(cfg.source.seed, Some(42));
    }

    #[test]
    fn rejects_zero_tick_and_bad_script() {
        assert!(matches!(
            FullConfig::from_toml("[telemetry]\ntick_ms = 0"),
            Err(ConfigError::ZeroTickPeriod)
        ));
        assert!(matches!(
            FullConfig::from_toml("[source]\nscripted = [0.5, 2.0]"),
            Err(ConfigError::ScriptValueOutOfRange(_))
        ));
        assert!(matches!(
            FullConfig::from_toml("[telemetry]\nprofile = \"turbo\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_disk_and_falls_back_when_missing() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nctrl_port = 7000").unwrap();
        let cfg = FullConfig::load(file.path()).unwrap();
        assert_eq!(cfg.server.ctrl_port, 7000);

        let cfg = FullConfig::load(Path::new("/nonexistent/rover/config.toml")).unwrap();
        assert_eq!(cfg.telemetry.tick_ms, 1200);
    }

    #[test]
    fn scripted_source_takes_priority_over_seed() {
        let src = SourceConfig { seed: Some(1), scripted: Some(vec![0.25]) };
        let mut built = src.build().unwrap();
        assert_eq!(built.next_unit(), 0.25);
        assert_eq!(built.next_unit(), 0.25);
    }
}
