//! Mode-decision engine
//!
//! Temperature acquisition with fallback, threshold classification and
//! reconciliation against the persisted mode.

mod classifier;
mod reconciler;
mod sequencer;
mod session;
mod sources;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing::debug;

use crate::api::{Credentials, ManagementApi};
use crate::data::{ControllerConfig, StateStore};

pub use classifier::classify;
pub use reconciler::{ReconcilePolicy, ReconcileReport, Reconciler, RunWarning};
pub use sequencer::{no_source_error, Acquisition, SourceFailure, SourceSequencer};
pub use session::{with_timeout, ApiSession, FanActuator};
pub use sources::{
    build_sources, HwmonSource, SysinfoApiSource, TemperatureSource, ThermalApiSource,
};

/// Perform one complete reconciliation run against `api` and `store`
pub async fn run_once(
    config: &ControllerConfig,
    api: Arc<dyn ManagementApi>,
    store: Arc<dyn StateStore>,
) -> ReconcileReport {
    let timeout = config.dsm.timeout();
    let session = Arc::new(ApiSession::new(
        api,
        Credentials::from(&config.dsm),
        timeout,
    ));

    let sequencer = SourceSequencer::new(build_sources(config, session.clone()), timeout);
    debug!(order = ?sequencer.order(), "Source order");

    let reconciler = Reconciler::new(
        sequencer,
        store,
        session.clone(),
        ReconcilePolicy::from_config(config),
    );
    let report = reconciler.reconcile().await;

    session.close().await;
    report
}
