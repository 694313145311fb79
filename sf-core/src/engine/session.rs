//! Per-run management API session
//!
//! Both API temperature sources and the actuation call share one session.
//! Login happens lazily on first use and at most once per run; a failed login
//! is remembered so later users fail fast with the same reason.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::api::{Credentials, ManagementApi, Session};
use crate::data::FanMode;
use crate::error::{Result, SynofanError};

/// Bound `fut` by `timeout`, turning expiry into [`SynofanError::Timeout`]
pub async fn with_timeout<T, F>(what: &str, timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(SynofanError::Timeout(format!(
            "{} did not complete within {}s",
            what,
            timeout.as_secs_f32()
        ))),
    }
}

/// Something that can put the appliance into a fan mode
#[async_trait]
pub trait FanActuator: Send + Sync {
    async fn set_fan_mode(&self, mode: FanMode) -> Result<()>;
}

/// Lazily authenticated management API session
pub struct ApiSession {
    api: Arc<dyn ManagementApi>,
    credentials: Credentials,
    timeout: Duration,
    session: OnceCell<std::result::Result<Session, String>>,
}

impl ApiSession {
    pub fn new(api: Arc<dyn ManagementApi>, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            api,
            credentials,
            timeout,
            session: OnceCell::new(),
        }
    }

    pub fn api(&self) -> &dyn ManagementApi {
        self.api.as_ref()
    }

    /// Per-call timeout applied to every API request
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The session, logging in on first call
    pub async fn get(&self) -> Result<&Session> {
        let outcome = self
            .session
            .get_or_init(|| async {
                debug!(host = %self.credentials.host, user = %self.credentials.user, "Logging in");
                match with_timeout("login", self.timeout, self.api.login(&self.credentials)).await {
                    Ok(session) => {
                        info!(host = %session.host, "Management API session established");
                        Ok(session)
                    }
                    Err(e) => {
                        warn!("Management API login failed: {}", e);
                        Err(e.to_string())
                    }
                }
            })
            .await;

        outcome
            .as_ref()
            .map_err(|reason| SynofanError::Login(reason.clone()))
    }

    /// Whether a login succeeded during this run
    pub fn is_established(&self) -> bool {
        matches!(self.session.get(), Some(Ok(_)))
    }

    /// Log out if a session was established; failures are only logged
    pub async fn close(&self) {
        if let Some(Ok(session)) = self.session.get() {
            match with_timeout("logout", self.timeout, self.api.logout(session)).await {
                Ok(()) => debug!("Management API session closed"),
                Err(e) => warn!("Logout failed: {}", e),
            }
        }
    }
}

#[async_trait]
impl FanActuator for ApiSession {
    async fn set_fan_mode(&self, mode: FanMode) -> Result<()> {
        let session = self.get().await?;
        with_timeout("set_fan_mode", self.timeout, self.api.set_fan_mode(session, mode)).await
    }
}
