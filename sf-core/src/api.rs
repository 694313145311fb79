//! Management API abstraction
//!
//! The appliance's web API is reached through [`ManagementApi`]. The core only
//! ever talks to this trait, so it can run against a fake in tests and never
//! sees transport-specific error types.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::{DsmConfig, FanMode};
use crate::error::Result;

/// Login credentials for the management API
#[derive(Clone)]
pub struct Credentials {
    /// Base URL of the appliance
    pub host: String,
    pub user: String,
    pub password: String,
    pub session_name: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("session_name", &self.session_name)
            .finish()
    }
}

impl From<&DsmConfig> for Credentials {
    fn from(config: &DsmConfig) -> Self {
        Self {
            host: config.host.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            session_name: config.session_name.clone(),
        }
    }
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Base URL the session was opened against
    pub host: String,
    /// Session id
    pub sid: String,
}

/// Payload of the thermal status endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermalInfo {
    #[serde(default)]
    pub cpu_temp: Option<f32>,
    #[serde(default)]
    pub system_temp: Option<f32>,
}

impl ThermalInfo {
    /// CPU temperature, falling back to the system temperature
    pub fn temperature(&self) -> Option<f32> {
        self.cpu_temp.or(self.system_temp)
    }
}

/// Payload of the system info endpoint (only the fields we use)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default, alias = "sys_temp")]
    pub temp: Option<f32>,
}

/// Client for the appliance management API
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session>;

    async fn get_thermal_info(&self, session: &Session) -> Result<ThermalInfo>;

    async fn get_system_info(&self, session: &Session) -> Result<SystemInfo>;

    async fn set_fan_mode(&self, session: &Session, mode: FanMode) -> Result<()>;

    async fn logout(&self, session: &Session) -> Result<()>;
}
