//! Direct hwmon temperature reading
//!
//! Linux exposes sensors under `/sys/class/hwmon/hwmonN/tempM_input`, each
//! holding an integer in millidegrees Celsius (e.g., 45000 = 45.0°C). This is
//! the lowest-common-denominator source used when the management API is
//! unreachable.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::constants::{limits, temperature};
use crate::data::validate_temperature;
use crate::error::{Result, SynofanError};

/// Reads chassis/CPU temperature from hwmon sysfs files
#[derive(Debug, Clone)]
pub struct HwmonReader {
    base: PathBuf,
    sensor: Option<PathBuf>,
}

impl HwmonReader {
    /// Scan every `hwmon*/temp*_input` below `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            sensor: None,
        }
    }

    /// Read only `sensor` instead of scanning
    pub fn with_sensor(mut self, sensor: Option<PathBuf>) -> Self {
        self.sensor = sensor;
        self
    }

    /// First plausible temperature in scan order, with the file it came from
    pub fn read_temperature(&self) -> Result<(f32, PathBuf)> {
        let candidates = match &self.sensor {
            Some(sensor) => vec![sensor.clone()],
            None => self.candidate_paths()?,
        };

        if candidates.is_empty() {
            return Err(SynofanError::TemperatureRead {
                path: self.base.clone(),
                reason: "no temp*_input files found".into(),
            });
        }

        let mut last_error = None;
        for path in candidates.iter().take(limits::MAX_HWMON_SENSORS) {
            match read_millidegrees(path).and_then(validate_temperature) {
                Ok(celsius) => {
                    debug!(path = ?path, celsius, "Read hwmon temperature");
                    return Ok((celsius, path.clone()));
                }
                Err(e) => {
                    trace!(path = ?path, error = %e, "Skipping hwmon sensor");
                    last_error = Some(e);
                }
            }
        }

        Err(SynofanError::TemperatureRead {
            path: self.sensor.clone().unwrap_or_else(|| self.base.clone()),
            reason: match last_error {
                Some(e) if candidates.len() == 1 => e.to_string(),
                _ => format!("none of {} sensors gave a plausible reading", candidates.len()),
            },
        })
    }

    /// `hwmonN/tempM_input` paths ordered by N then M
    fn candidate_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.base).map_err(|e| SynofanError::TemperatureRead {
            path: self.base.clone(),
            reason: format!("cannot list: {}", e),
        })?;

        let mut found = Vec::new();
        for entry in entries.flatten() {
            let chip_name = entry.file_name().to_string_lossy().to_string();
            let Some(chip_idx) = extract_index(&chip_name, "hwmon", "") else {
                continue;
            };
            let Ok(files) = fs::read_dir(entry.path()) else {
                continue;
            };
            for file in files.flatten() {
                let fname = file.file_name().to_string_lossy().to_string();
                if let Some(temp_idx) = extract_index(&fname, "temp", "_input") {
                    found.push((chip_idx, temp_idx, file.path()));
                }
            }
        }

        found.sort_by_key(|(chip, temp, _)| (*chip, *temp));
        trace!(count = found.len(), base = ?self.base, "Found hwmon temperature inputs");
        Ok(found.into_iter().map(|(_, _, path)| path).collect())
    }
}

/// Read one millidegree sensor file and convert to Celsius
pub fn read_millidegrees(path: &Path) -> Result<f32> {
    let content = fs::read_to_string(path).map_err(|e| SynofanError::TemperatureRead {
        path: path.to_path_buf(),
        reason: format!("Failed to read: {}", e),
    })?;

    content
        .trim()
        .parse::<i64>()
        .map(|millidegrees| millidegrees as f32 / temperature::MILLIDEGREE_DIVISOR)
        .map_err(|e| SynofanError::TemperatureRead {
            path: path.to_path_buf(),
            reason: format!("Failed to parse '{}': {}", content.trim(), e),
        })
}

/// Numeric index between `prefix` and `suffix`, e.g. `temp3_input` -> 3
pub fn extract_index(fname: &str, prefix: &str, suffix: &str) -> Option<usize> {
    if fname.len() > prefix.len() + suffix.len()
        && fname.starts_with(prefix)
        && fname.ends_with(suffix)
    {
        let mid = &fname[prefix.len()..fname.len() - suffix.len()];
        mid.parse().ok()
    } else {
        None
    }
}
