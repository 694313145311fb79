//! Core data types for Synofan
//!
//! Defines the primary data structures shared by the sources, the classifier,
//! the state store and the reconciler.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{modes, state, thresholds};

/// Fan operating mode of the appliance
///
/// Ordered by cooling intensity: `Quiet < Cool < Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    Quiet,
    Cool,
    Full,
}

impl FanMode {
    pub const ALL: [FanMode; 3] = [FanMode::Quiet, FanMode::Cool, FanMode::Full];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Cool => "cool",
            Self::Full => "full",
        }
    }

    /// Default name the appliance uses for this mode
    pub fn default_wire_name(self) -> &'static str {
        match self {
            Self::Quiet => modes::QUIET,
            Self::Cool => modes::COOL,
            Self::Full => modes::FULL,
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of a temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempSource {
    /// Management API thermal endpoint
    ThermalApi,
    /// Management API system-info endpoint
    SysinfoApi,
    /// Direct hwmon sensor file
    Hwmon,
}

impl TempSource {
    /// Default fallback order, most authoritative first
    pub const DEFAULT_ORDER: [TempSource; 3] =
        [TempSource::ThermalApi, TempSource::SysinfoApi, TempSource::Hwmon];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThermalApi => "THERMAL_API",
            Self::SysinfoApi => "SYSINFO_API",
            Self::Hwmon => "HWMON",
        }
    }
}

impl fmt::Display for TempSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single temperature reading produced by one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Degrees Celsius
    pub value: f32,
    pub source: TempSource,
    /// Concrete origin, e.g. the API name or the sysfs path
    pub detail: String,
}

impl TemperatureReading {
    pub fn new(value: f32, source: TempSource, detail: impl Into<String>) -> Self {
        Self {
            value,
            source,
            detail: detail.into(),
        }
    }
}

/// Mode thresholds in degrees Celsius
///
/// Invariant (checked by [`crate::validate_thresholds`]): `quiet_max < cool_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this: quiet mode
    pub quiet_max: f32,
    /// Below this: cool mode, at or above: full mode
    pub cool_max: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            quiet_max: thresholds::DEFAULT_QUIET_MAX,
            cool_max: thresholds::DEFAULT_COOL_MAX,
        }
    }
}

/// Last applied fan mode, persisted across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default = "default_version")]
    pub version: u32,
    pub mode: FanMode,
    /// Last time a run confirmed or applied `mode`
    pub timestamp: DateTime<Utc>,
    /// Last time `mode` was actually sent to the appliance
    #[serde(default)]
    pub applied_at: DateTime<Utc>,
    #[serde(default)]
    pub last_temp: Option<f32>,
    #[serde(default)]
    pub source: Option<TempSource>,
}

fn default_version() -> u32 {
    state::VERSION
}

impl PersistedState {
    /// State recording a successful application of `mode` at `at`
    pub fn applied(mode: FanMode, at: DateTime<Utc>) -> Self {
        Self {
            version: state::VERSION,
            mode,
            timestamp: at,
            applied_at: at,
            last_temp: None,
            source: None,
        }
    }

    /// Same mode, timestamp moved forward to `at` (never backwards)
    pub fn refreshed(&self, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: self.timestamp.max(at),
            ..self.clone()
        }
    }

    /// Attach the reading that led to this state
    pub fn with_reading(mut self, reading: &TemperatureReading) -> Self {
        self.last_temp = Some(reading.value);
        self.source = Some(reading.source);
        self
    }
}
