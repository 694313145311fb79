//! Mode classifier
//!
//! Maps a temperature onto a fan mode using two thresholds:
//!
//! ```text
//!   temp <  quiet_max             -> Quiet
//!   quiet_max <= temp < cool_max  -> Cool
//!   temp >= cool_max              -> Full
//! ```
//!
//! A temperature exactly on a threshold belongs to the higher mode. No
//! dead-band: repeated identical decisions are suppressed by the reconciler
//! comparing against persisted state.

use crate::data::{FanMode, Thresholds};

/// Desired fan mode for `temp` (°C)
///
/// Total over `f32`: a NaN compares false against both thresholds and
/// therefore maps to [`FanMode::Full`].
pub fn classify(temp: f32, thresholds: &Thresholds) -> FanMode {
    if temp < thresholds.quiet_max {
        FanMode::Quiet
    } else if temp < thresholds.cool_max {
        FanMode::Cool
    } else {
        FanMode::Full
    }
}
