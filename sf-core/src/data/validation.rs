//! Input validation for Synofan
//!
//! Every configuration is validated before a run executes, and every
//! temperature is checked for plausibility before it can drive a mode.

use std::collections::HashSet;
use std::path::Path;

use crate::constants::{limits, temperature, timing};
use crate::data::config::ControllerConfig;
use crate::data::types::{FanMode, Thresholds};
use crate::error::{Result, SynofanError};

/// Validates that a temperature is finite and within the plausible range
pub fn validate_temperature(value: f32) -> Result<f32> {
    if !value.is_finite()
        || !(temperature::MIN_PLAUSIBLE..=temperature::MAX_PLAUSIBLE).contains(&value)
    {
        return Err(SynofanError::ImplausibleTemperature { value });
    }
    Ok(value)
}

/// Validates that thresholds are finite, plausible and strictly ordered
pub fn validate_thresholds(thresholds: &Thresholds) -> Result<()> {
    for (field, value) in [
        ("thresholds.quiet_max", thresholds.quiet_max),
        ("thresholds.cool_max", thresholds.cool_max),
    ] {
        if validate_temperature(value).is_err() {
            return Err(SynofanError::invalid_config(
                field,
                format!(
                    "{} is outside {}-{}°C",
                    value,
                    temperature::MIN_PLAUSIBLE,
                    temperature::MAX_PLAUSIBLE
                ),
            ));
        }
    }

    if thresholds.quiet_max >= thresholds.cool_max {
        return Err(SynofanError::InvalidThresholds {
            quiet_max: thresholds.quiet_max,
            cool_max: thresholds.cool_max,
        });
    }

    Ok(())
}

/// Validates a whole controller configuration
pub fn validate_config(config: &ControllerConfig) -> Result<()> {
    validate_thresholds(&config.thresholds)?;

    if config.dsm.host.trim().is_empty() {
        return Err(SynofanError::invalid_config("dsm.host", "must not be empty"));
    }
    if !config.dsm.host.starts_with("http://") && !config.dsm.host.starts_with("https://") {
        return Err(SynofanError::invalid_config(
            "dsm.host",
            "must start with http:// or https://",
        ));
    }
    if config.dsm.user.trim().is_empty() {
        return Err(SynofanError::invalid_config("dsm.user", "must not be empty"));
    }
    if config.dsm.timeout_secs == 0 || config.dsm.timeout_secs > timing::MAX_CALL_TIMEOUT_SECS {
        return Err(SynofanError::invalid_config(
            "dsm.timeout_secs",
            format!("must be between 1 and {}", timing::MAX_CALL_TIMEOUT_SECS),
        ));
    }

    for mode in FanMode::ALL {
        if config.dsm.fan_modes.name(mode).trim().is_empty() {
            return Err(SynofanError::invalid_config(
                format!("dsm.fan_modes.{}", mode),
                "must not be empty",
            ));
        }
    }

    if config.sources.is_empty() {
        return Err(SynofanError::invalid_config(
            "sources",
            "at least one temperature source is required",
        ));
    }
    let mut seen = HashSet::new();
    for source in &config.sources {
        if !seen.insert(*source) {
            return Err(SynofanError::invalid_config(
                "sources",
                format!("{} listed more than once", source),
            ));
        }
    }

    if let Some(sensor) = &config.hwmon_sensor {
        validate_temp_path(sensor)?;
    }

    Ok(())
}

/// Validates that a path names a hwmon temperature input file (`tempN_input`)
pub fn validate_temp_path(path: &Path) -> Result<()> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SynofanError::invalid_path(path, "invalid filename"))?;

    if !filename.starts_with("temp") || !filename.ends_with("_input") {
        return Err(SynofanError::invalid_path(
            path,
            "not a temperature sensor file",
        ));
    }

    if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(SynofanError::invalid_path(path, "path traversal detected"));
    }

    Ok(())
}

/// Validates config file size
pub fn validate_file_size(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        SynofanError::config(format!("cannot read file metadata: {}", e))
    })?;

    if metadata.len() > limits::MAX_CONFIG_SIZE {
        return Err(SynofanError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: limits::MAX_CONFIG_SIZE,
        });
    }

    Ok(())
}
