//! Mode reconciler
//!
//! One invocation: acquire a temperature, classify the desired mode, compare
//! it with the persisted mode and actuate only when they differ. Actuation is
//! never attempted without a reading, and persisted state only changes after
//! a successful actuation (or a timestamp refresh when nothing changed).
//!
//! Per-mode state machine across runs:
//!
//! ```text
//!   UNKNOWN --apply ok--> QUIET | COOL | FULL
//!   QUIET/COOL/FULL --apply ok--> QUIET | COOL | FULL
//! ```
//!
//! UNKNOWN has no self-loop: every run that starts there attempts an apply.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::data::{
    ControllerConfig, FanMode, PersistedState, StateStore, TempSource, TemperatureReading,
    Thresholds,
};
use crate::engine::classifier::classify;
use crate::engine::sequencer::{no_source_error, SourceFailure, SourceSequencer};
use crate::engine::session::{with_timeout, FanActuator};
use crate::error::{ErrorKind, SynofanError};

/// Knobs that shape reconciliation
#[derive(Debug, Clone)]
pub struct ReconcilePolicy {
    pub thresholds: Thresholds,
    /// Bound on the actuation call
    pub actuation_timeout: Duration,
    /// Re-apply an unchanged mode once the last application is this old
    pub force_refresh: Option<chrono::Duration>,
    /// Defer mode changes while the last application is younger than this
    pub min_change_interval: Option<chrono::Duration>,
}

impl ReconcilePolicy {
    pub fn new(thresholds: Thresholds, actuation_timeout: Duration) -> Self {
        Self {
            thresholds,
            actuation_timeout,
            force_refresh: None,
            min_change_interval: None,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            actuation_timeout: config.dsm.timeout(),
            force_refresh: config.force_refresh_secs.map(secs_to_duration),
            min_change_interval: config.min_change_interval_secs.map(secs_to_duration),
        }
    }
}

// Clamped to the largest span chrono can represent.
fn secs_to_duration(secs: u64) -> chrono::Duration {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
    chrono::Duration::seconds(secs)
}

/// Non-fatal problem noticed during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunWarning {
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one reconciliation, for reporting only
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub measured_temp: Option<f32>,
    pub source: Option<TempSource>,
    /// Concrete origin of the reading (API name or sensor path)
    pub source_detail: Option<String>,
    /// Mode from persisted state; `None` means unknown
    pub current_mode: Option<FanMode>,
    pub desired_mode: Option<FanMode>,
    /// The appliance's mode was changed by this run
    pub changed: bool,
    /// An actuation call was made and succeeded (includes forced re-applies)
    pub applied: bool,
    /// A needed change was postponed by the minimum change interval
    pub deferred: bool,
    pub error: Option<ErrorKind>,
    pub error_detail: Option<String>,
    pub warnings: Vec<RunWarning>,
    pub source_failures: Vec<SourceFailure>,
}

impl ReconcileReport {
    /// Run succeeded unless it ended in a fatal error kind
    pub fn is_success(&self) -> bool {
        !self.error.map(ErrorKind::is_fatal).unwrap_or(false)
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    fn fail(&mut self, err: &SynofanError) {
        self.error = Some(err.kind());
        self.error_detail = Some(err.to_string());
    }

    fn warn(&mut self, err: &SynofanError) {
        self.warnings.push(RunWarning {
            kind: err.kind(),
            message: err.to_string(),
        });
    }
}

/// What to do with the appliance this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    /// Desired mode already active
    Keep,
    /// Send the desired mode
    Apply,
    /// Desired mode differs but the last change is too recent
    Defer,
}

fn decide(
    previous: Option<&PersistedState>,
    desired: FanMode,
    now: DateTime<Utc>,
    policy: &ReconcilePolicy,
) -> Decision {
    let Some(previous) = previous else {
        return Decision::Apply;
    };
    let since_applied = now - previous.applied_at;

    if previous.mode == desired {
        return match policy.force_refresh {
            Some(refresh) if since_applied >= refresh => Decision::Apply,
            _ => Decision::Keep,
        };
    }

    match policy.min_change_interval {
        Some(min) if since_applied >= chrono::Duration::zero() && since_applied < min => {
            Decision::Defer
        }
        _ => Decision::Apply,
    }
}

/// Orchestrates one reconciliation run
pub struct Reconciler {
    sequencer: SourceSequencer,
    store: Arc<dyn StateStore>,
    actuator: Arc<dyn FanActuator>,
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(
        sequencer: SourceSequencer,
        store: Arc<dyn StateStore>,
        actuator: Arc<dyn FanActuator>,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            sequencer,
            store,
            actuator,
            policy,
        }
    }

    pub async fn reconcile(&self) -> ReconcileReport {
        self.reconcile_at(Utc::now()).await
    }

    /// Run with an explicit clock
    pub async fn reconcile_at(&self, now: DateTime<Utc>) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // 1. Temperature, or nothing happens at all.
        let acquisition = match self.sequencer.acquire().await {
            Ok(acquisition) => acquisition,
            Err(failures) => {
                let err = no_source_error(&failures);
                error!("{}", err);
                report.fail(&err);
                report.source_failures = failures;
                return report;
            }
        };
        let reading = acquisition.reading;
        report.measured_temp = Some(reading.value);
        report.source = Some(reading.source);
        report.source_detail = Some(reading.detail.clone());
        report.source_failures = acquisition.failures;

        // 2. Desired mode.
        let desired = classify(reading.value, &self.policy.thresholds);
        report.desired_mode = Some(desired);

        // 3. Known mode; corruption degrades to unknown.
        let previous = match self.store.read() {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Persisted state unusable, treating mode as unknown: {}", e);
                report.warn(&e);
                None
            }
        };
        report.current_mode = previous.as_ref().map(|s| s.mode);

        debug!(
            temp = reading.value,
            desired = %desired,
            current = ?report.current_mode,
            "Reconciling fan mode"
        );

        match decide(previous.as_ref(), desired, now, &self.policy) {
            Decision::Keep | Decision::Defer => {
                let Some(previous) = previous else {
                    return report;
                };
                if previous.mode != desired {
                    info!(current = %previous.mode, desired = %desired, "Mode change deferred");
                    report.deferred = true;
                } else {
                    debug!(mode = %desired, "Fan mode already active");
                }
                // 4. Still refresh the timestamp so the store shows it is live.
                let refreshed = previous.refreshed(now).with_reading(&reading);
                self.persist(&refreshed, &mut report);
            }
            Decision::Apply => {
                self.apply(desired, previous.as_ref(), &reading, now, &mut report)
                    .await;
            }
        }

        report
    }

    async fn apply(
        &self,
        desired: FanMode,
        previous: Option<&PersistedState>,
        reading: &TemperatureReading,
        now: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) {
        match previous {
            None => info!(mode = %desired, "No known fan mode, forcing apply"),
            Some(p) if p.mode == desired => info!(mode = %desired, "Re-applying fan mode"),
            Some(p) => info!(from = %p.mode, to = %desired, "Changing fan mode"),
        }

        // 5. Actuate; on failure leave the state alone so the next run retries.
        let result = with_timeout(
            "set_fan_mode",
            self.policy.actuation_timeout,
            self.actuator.set_fan_mode(desired),
        )
        .await;

        if let Err(e) = result {
            let err = SynofanError::ActuationFailed {
                mode: desired.to_string(),
                reason: e.to_string(),
            };
            error!("{}", err);
            report.fail(&err);
            return;
        }

        report.applied = true;
        report.changed = previous.map(|p| p.mode) != Some(desired);

        // 6. Record it; a failure here does not undo the actuation.
        let state = PersistedState::applied(desired, now).with_reading(reading);
        self.persist(&state, report);
    }

    fn persist(&self, state: &PersistedState, report: &mut ReconcileReport) {
        if let Err(e) = self.store.save(state) {
            let err = match e {
                SynofanError::PersistFailed(_) => e,
                other => SynofanError::PersistFailed(other.to_string()),
            };
            warn!("{}", err);
            report.warn(&err);
        }
    }
}
