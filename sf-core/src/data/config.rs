//! Configuration management
//!
//! Loads the controller configuration from a JSON file. Values not present
//! in the file use defaults; `SYNOFAN_PASSWORD` takes precedence over the
//! password stored in the file. The loaded configuration is validated before
//! it is handed to the reconciler.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{api, env, paths, timing};
use crate::data::types::{FanMode, TempSource, Thresholds};
use crate::data::validation::{validate_config, validate_file_size};
use crate::error::{Result, SynofanError};

/// Top-level controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    #[serde(default)]
    pub dsm: DsmConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Where the last applied mode is persisted
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Root of the hwmon class directory
    #[serde(default = "default_hwmon_base")]
    pub hwmon_base: PathBuf,
    /// Read exactly this sensor file instead of scanning `hwmon_base`
    #[serde(default)]
    pub hwmon_sensor: Option<PathBuf>,
    /// Temperature sources in fallback order
    #[serde(default = "default_sources")]
    pub sources: Vec<TempSource>,
    /// Re-apply an unchanged mode once the last application is this old
    #[serde(default)]
    pub force_refresh_secs: Option<u64>,
    /// Defer mode changes until the last application is at least this old
    #[serde(default)]
    pub min_change_interval_secs: Option<u64>,
}

/// Management API connection settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DsmConfig {
    /// Base URL, e.g. `https://nas.example.com:5001`
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default = "default_session_name")]
    pub session_name: String,
    /// Bound on every network call (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub fan_modes: ModeNames,
}

// Keep the password out of logs and panic messages.
impl fmt::Debug for DsmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DsmConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("verify_ssl", &self.verify_ssl)
            .field("session_name", &self.session_name)
            .field("timeout_secs", &self.timeout_secs)
            .field("fan_modes", &self.fan_modes)
            .finish()
    }
}

/// Names the appliance uses for each fan mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeNames {
    #[serde(default = "default_quiet_name")]
    pub quiet: String,
    #[serde(default = "default_cool_name")]
    pub cool: String,
    #[serde(default = "default_full_name")]
    pub full: String,
}

impl ModeNames {
    pub fn name(&self, mode: FanMode) -> &str {
        match mode {
            FanMode::Quiet => &self.quiet,
            FanMode::Cool => &self.cool,
            FanMode::Full => &self.full,
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from(paths::STATE_FILE)
}

fn default_hwmon_base() -> PathBuf {
    PathBuf::from(paths::HWMON_BASE)
}

fn default_sources() -> Vec<TempSource> {
    TempSource::DEFAULT_ORDER.to_vec()
}

fn default_verify_ssl() -> bool {
    true
}

fn default_session_name() -> String {
    api::DEFAULT_SESSION_NAME.to_string()
}

fn default_timeout_secs() -> u64 {
    timing::DEFAULT_CALL_TIMEOUT_SECS
}

fn default_quiet_name() -> String {
    FanMode::Quiet.default_wire_name().to_string()
}

fn default_cool_name() -> String {
    FanMode::Cool.default_wire_name().to_string()
}

fn default_full_name() -> String {
    FanMode::Full.default_wire_name().to_string()
}

impl Default for ModeNames {
    fn default() -> Self {
        Self {
            quiet: default_quiet_name(),
            cool: default_cool_name(),
            full: default_full_name(),
        }
    }
}

impl Default for DsmConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            password: String::new(),
            verify_ssl: default_verify_ssl(),
            session_name: default_session_name(),
            timeout_secs: default_timeout_secs(),
            fan_modes: ModeNames::default(),
        }
    }
}

impl DsmConfig {
    /// Per-call timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            dsm: DsmConfig::default(),
            thresholds: Thresholds::default(),
            state_file: default_state_file(),
            hwmon_base: default_hwmon_base(),
            hwmon_sensor: None,
            sources: default_sources(),
            force_refresh_secs: None,
            min_change_interval_secs: None,
        }
    }
}

/// Pick the config path: explicit argument, then `SYNOFAN_CONFIG`, then the default
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(env::CONFIG_PATH) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => paths::default_config_path(),
    }
}

/// Parse a configuration document without touching the environment
pub fn parse_config(contents: &str) -> Result<ControllerConfig> {
    let config: ControllerConfig = serde_json::from_str(contents)?;
    Ok(config)
}

/// Load, apply environment overrides and validate the configuration at `path`
pub fn load_config(path: &Path) -> Result<ControllerConfig> {
    if !path.exists() {
        return Err(SynofanError::config(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    validate_file_size(path)?;

    let contents = fs::read_to_string(path).map_err(|e| SynofanError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config = parse_config(&contents)?;

    if let Ok(password) = std::env::var(env::PASSWORD) {
        if !password.is_empty() {
            debug!("Using management API password from {}", env::PASSWORD);
            config.dsm.password = password;
        }
    }

    validate_config(&config)?;

    info!(
        path = %path.display(),
        quiet_max = config.thresholds.quiet_max,
        cool_max = config.thresholds.cool_max,
        sources = config.sources.len(),
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"{
        "dsm": { "host": "https://nas.local:5001", "user": "fan", "password": "secret" }
    }"#;

    #[test]
    fn test_defaults_applied_to_minimal_config() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.thresholds, Thresholds::default());
        assert_eq!(config.sources, TempSource::DEFAULT_ORDER.to_vec());
        assert!(config.dsm.verify_ssl);
        assert_eq!(config.dsm.timeout_secs, 10);
        assert_eq!(config.dsm.session_name, "fancontrol");
        assert_eq!(config.dsm.fan_modes.name(FanMode::Cool), "coolfan");
        assert_eq!(config.state_file, PathBuf::from(paths::STATE_FILE));
        assert!(config.force_refresh_secs.is_none());
        assert!(config.min_change_interval_secs.is_none());
    }

    #[test]
    fn test_custom_order_and_thresholds() {
        let json = r#"{
            "dsm": { "host": "https://nas.local:5001", "user": "fan" },
            "thresholds": { "quiet_max": 38.5, "cool_max": 50.0 },
            "sources": ["hwmon", "thermal_api"],
            "force_refresh_secs": 300
        }"#;
        let config = parse_config(json).unwrap();
        assert_eq!(config.thresholds.quiet_max, 38.5);
        assert_eq!(config.sources, vec![TempSource::Hwmon, TempSource::ThermalApi]);
        assert_eq!(config.force_refresh_secs, Some(300));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{ "thresholdz": {} }"#;
        assert!(parse_config(json).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = parse_config(MINIMAL).unwrap();
        let rendered = format!("{:?}", config.dsm);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_rejects_inverted_thresholds() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "dsm": {{ "host": "https://nas.local", "user": "u" }},
                 "thresholds": {{ "quiet_max": 60.0, "cool_max": 50.0 }} }}"#
        )
        .unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, SynofanError::InvalidThresholds { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/synofan.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_resolve_explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/x.json")));
        assert_eq!(path, PathBuf::from("/tmp/x.json"));
    }
}
