//! Synofan Core Library
//!
//! Fan mode reconciliation for Synology-style storage appliances.
//!
//! Each run reads one temperature from a prioritized list of sources, maps it
//! onto one of three fan modes and sends that mode to the appliance only when
//! it differs from the last mode persisted on disk.
//!
//! # Module Structure
//!
//! - `data/` - Data types, configuration, validation, state persistence
//! - `hw/` - Direct hwmon sensor access
//! - `engine/` - Sources, sequencer, classifier and reconciler
//! - `api` - Management API trait implemented by transport crates
//!
//! # Example
//!
//! ```no_run
//! use sf_core::{classify, FanMode, Thresholds};
//!
//! let mode = classify(47.0, &Thresholds::default());
//! assert_eq!(mode, FanMode::Cool);
//! ```

// Grouped modules
pub mod data;
pub mod engine;
pub mod hw;

// Standalone modules
pub mod api;
pub mod constants;
pub mod display;
pub mod error;

// Re-export primary types from data/
pub use data::{
    load_config, parse_config, resolve_config_path, ControllerConfig, DsmConfig, FanMode,
    ModeNames, PersistedState, TempSource, TemperatureReading, Thresholds,
};

// Re-export validation functions from data/
pub use data::{
    validate_config, validate_file_size, validate_temp_path, validate_temperature,
    validate_thresholds,
};

// Re-export persistence types from data/
pub use data::{JsonStateStore, MemoryStateStore, StateStore};

// Re-export error types
pub use error::{ErrorKind, Result, SynofanError};

// Re-export API types
pub use api::{Credentials, ManagementApi, Session, SystemInfo, ThermalInfo};

// Re-export engine types
pub use engine::{
    build_sources, classify, run_once, with_timeout, Acquisition, ApiSession, FanActuator,
    HwmonSource, ReconcilePolicy, ReconcileReport, Reconciler, RunWarning, SourceFailure,
    SourceSequencer, SysinfoApiSource, TemperatureSource, ThermalApiSource,
};

// Re-export hardware functions from hw/
pub use hw::{read_millidegrees, HwmonReader};

// Re-export display formatting functions
pub use display::{format_temp, mode_label, outcome_line, render_report, status_line, warning_lines};
