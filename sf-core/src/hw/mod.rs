//! Hardware interaction modules
//!
//! Contains the low-level sysfs access used as the last-resort temperature source.

mod hwmon;

pub use hwmon::{extract_index, read_millidegrees, HwmonReader};
