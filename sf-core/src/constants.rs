//! Constants and configuration values for Synofan
//!
//! Centralizes all magic numbers, paths, and configuration defaults.
//! Never use magic numbers in other files - add them here first.

use std::time::Duration;

/// System paths
pub mod paths {
    /// Base path for hwmon devices
    pub const HWMON_BASE: &str = "/sys/class/hwmon";

    /// Configuration directory
    pub const CONFIG_DIR: &str = "/etc/synofan";

    /// Configuration file name inside [`CONFIG_DIR`]
    pub const CONFIG_FILE: &str = "config.json";

    /// Default location of the persisted fan state
    pub const STATE_FILE: &str = "/var/lib/synofan/fanstate.json";

    /// Default config file path
    pub fn default_config_path() -> std::path::PathBuf {
        std::path::Path::new(CONFIG_DIR).join(CONFIG_FILE)
    }
}

/// Environment variables consulted at startup
pub mod env {
    /// Overrides the config file location
    pub const CONFIG_PATH: &str = "SYNOFAN_CONFIG";

    /// Overrides the management API password from the config file
    pub const PASSWORD: &str = "SYNOFAN_PASSWORD";

    /// Log filter (trace, debug, info, warn, error)
    pub const LOG: &str = "SYNOFAN_LOG";
}

/// Temperature handling
pub mod temperature {
    /// Temperature readings are in millidegrees, divide by this to get Celsius
    pub const MILLIDEGREE_DIVISOR: f32 = 1000.0;

    /// Lowest reading accepted from any source (Celsius)
    pub const MIN_PLAUSIBLE: f32 = 0.0;

    /// Highest reading accepted from any source (Celsius)
    pub const MAX_PLAUSIBLE: f32 = 120.0;
}

/// Default mode thresholds
pub mod thresholds {
    /// Below this: quiet mode
    pub const DEFAULT_QUIET_MAX: f32 = 40.0;

    /// Below this: cool mode, at or above: full mode
    pub const DEFAULT_COOL_MAX: f32 = 55.0;
}

/// Wire names of the appliance fan modes
pub mod modes {
    pub const QUIET: &str = "quietfan";
    pub const COOL: &str = "coolfan";
    pub const FULL: &str = "fullfan";
}

/// Management API names used in status output
pub mod api {
    pub const AUTH: &str = "SYNO.API.Auth";
    pub const THERMAL: &str = "SYNO.Core.Hardware.Thermal";
    pub const SYSTEM: &str = "SYNO.Core.System";
    pub const FAN_SPEED: &str = "SYNO.Core.Hardware.FanSpeed";

    /// Default session name sent on login
    pub const DEFAULT_SESSION_NAME: &str = "fancontrol";
}

/// Timing constants
pub mod timing {
    use super::*;

    /// Default per-call timeout for network-bound operations
    pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;

    /// Upper bound on a configured per-call timeout
    pub const MAX_CALL_TIMEOUT_SECS: u64 = 300;

    /// Default per-call timeout as a Duration
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS);
}

/// State file format
pub mod state {
    /// Current persisted state schema version
    pub const VERSION: u32 = 1;

    /// Suffix appended to the state path for the write-then-rename temp file
    pub const TEMP_SUFFIX: &str = "tmp";
}

/// File size limits
pub mod limits {
    /// Maximum config file size (1MB)
    pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

    /// Maximum state file size; anything larger is treated as corrupt
    pub const MAX_STATE_SIZE: u64 = 64 * 1024;

    /// Maximum number of hwmon sensor files inspected per run
    pub const MAX_HWMON_SENSORS: usize = 256;
}
