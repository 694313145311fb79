//! Source fallback sequencer
//!
//! Tries temperature sources in priority order and returns the first
//! reading. A failing source is recorded and skipped; sources after a
//! success are never invoked. Nothing is cached between runs.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::{TempSource, TemperatureReading};
use crate::engine::session::with_timeout;
use crate::engine::sources::TemperatureSource;
use crate::error::SynofanError;

/// Why one source did not produce a reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub source: TempSource,
    pub reason: String,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

impl From<&SourceFailure> for SynofanError {
    fn from(failure: &SourceFailure) -> Self {
        SynofanError::SourceUnavailable {
            source_name: failure.source.to_string(),
            reason: failure.reason.clone(),
        }
    }
}

/// A successful acquisition and the sources that failed before it
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub reading: TemperatureReading,
    pub failures: Vec<SourceFailure>,
}

/// Aggregate error for a run where every source failed
pub fn no_source_error(failures: &[SourceFailure]) -> SynofanError {
    SynofanError::NoTemperatureSource {
        failures: failures.iter().map(ToString::to_string).collect(),
    }
}

/// Tries sources in order until one succeeds
pub struct SourceSequencer {
    sources: Vec<Box<dyn TemperatureSource>>,
    timeout: Duration,
}

impl SourceSequencer {
    /// `timeout` bounds each individual source
    pub fn new(sources: Vec<Box<dyn TemperatureSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    pub fn order(&self) -> Vec<TempSource> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// First successful reading, or every failure if none succeeded
    pub async fn acquire(&self) -> Result<Acquisition, Vec<SourceFailure>> {
        let mut failures = Vec::new();

        for source in &self.sources {
            let kind = source.kind();
            debug!(source = %kind, "Trying temperature source");

            let what = format!("{} read", kind);
            match with_timeout(&what, self.timeout, source.acquire()).await {
                Ok(reading) => {
                    info!(
                        source = %kind,
                        temp = reading.value,
                        skipped = failures.len(),
                        "Temperature acquired"
                    );
                    return Ok(Acquisition { reading, failures });
                }
                Err(e) => {
                    let failure = SourceFailure {
                        source: kind,
                        reason: e.to_string(),
                    };
                    warn!("{}", SynofanError::from(&failure));
                    failures.push(failure);
                }
            }
        }

        Err(failures)
    }
}
