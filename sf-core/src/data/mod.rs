//! Data types, configuration, validation and persistence modules
//!
//! Contains all core data structures and configuration management.

mod config;
mod persistence;
mod types;
mod validation;

pub use config::{
    load_config, parse_config, resolve_config_path, ControllerConfig, DsmConfig, ModeNames,
};
pub use persistence::{JsonStateStore, MemoryStateStore, StateStore};
pub use types::{FanMode, PersistedState, TempSource, TemperatureReading, Thresholds};
pub use validation::{
    validate_config, validate_file_size, validate_temp_path, validate_temperature,
    validate_thresholds,
};
