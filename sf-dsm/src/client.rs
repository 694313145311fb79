//! DSM Web API client
//!
//! Speaks the appliance's query-string API over HTTP(S). One request per
//! call; no retries, no keep-alive assumptions. Request timeouts come from
//! the configuration and are also enforced by the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use sf_core::constants::api;
use sf_core::{
    Credentials, DsmConfig, FanMode, ManagementApi, ModeNames, Session, SystemInfo, ThermalInfo,
};
use sf_error::{Result, SynofanError};

use crate::protocol::{
    ApiEnvelope, LoginData, TokenData, AUTH_PATH, AUTH_VERSION, CORE_VERSION, ENTRY_PATH,
};

/// Management API client for DSM
pub struct DsmClient {
    http: Client,
    base: String,
    names: ModeNames,
    session_name: String,
}

impl DsmClient {
    /// Build a client from configuration
    pub fn new(config: &DsmConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("synofan/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| SynofanError::config(format!("Failed to create HTTP client: {}", e)))?;

        if !config.verify_ssl {
            warn!(host = %config.host, "TLS certificate verification disabled");
        }

        Ok(Self::with_client(http, config))
    }

    /// Build a client around an existing `reqwest::Client`
    pub fn with_client(http: Client, config: &DsmConfig) -> Self {
        Self {
            http,
            base: config.host.trim_end_matches('/').to_string(),
            names: config.fan_modes.clone(),
            session_name: config.session_name.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    async fn call(&self, path: &str, api_name: &str, params: &[(&str, &str)]) -> Result<ApiEnvelope> {
        let url = format!("{}{}", self.base, path);
        debug!(api = api_name, method = ?lookup(params, "method"), "DSM request");

        let response = self
            .http
            .get(&url)
            .query(&[("api", api_name)])
            .query(params)
            .send()
            .await
            .map_err(|e| SynofanError::api(api_name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynofanError::api(api_name, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SynofanError::api(api_name, e.to_string()))?;

        ApiEnvelope::parse(api_name, &body)?.check(api_name)
    }

    async fn call_data<T: DeserializeOwned>(
        &self,
        api_name: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        self.call(ENTRY_PATH, api_name, params)
            .await?
            .data(api_name)
    }

    async fn fetch_token(&self, session: &Session) -> Option<String> {
        let params = [
            ("version", CORE_VERSION),
            ("method", "get"),
            ("_sid", session.sid.as_str()),
        ];
        match self.call_data::<TokenData>(api::FAN_SPEED, &params).await {
            Ok(data) => data.syno_token,
            Err(e) => {
                debug!("SynoToken unavailable, continuing without it: {}", e);
                None
            }
        }
    }
}

fn lookup<'a>(params: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[async_trait]
impl ManagementApi for DsmClient {
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let params = [
            ("version", AUTH_VERSION),
            ("method", "login"),
            ("account", credentials.user.as_str()),
            ("passwd", credentials.password.as_str()),
            ("session", credentials.session_name.as_str()),
            ("format", "sid"),
        ];

        let login: LoginData = self
            .call(AUTH_PATH, api::AUTH, &params)
            .await
            .and_then(|env| env.data(api::AUTH))
            .map_err(|e| SynofanError::Login(e.to_string()))?;

        if login.sid.is_empty() {
            return Err(SynofanError::Login("empty session id".into()));
        }

        Ok(Session {
            host: self.base.clone(),
            sid: login.sid,
        })
    }

    async fn get_thermal_info(&self, session: &Session) -> Result<ThermalInfo> {
        let params = [
            ("version", CORE_VERSION),
            ("method", "status"),
            ("_sid", session.sid.as_str()),
        ];
        self.call_data(api::THERMAL, &params).await
    }

    async fn get_system_info(&self, session: &Session) -> Result<SystemInfo> {
        let params = [
            ("version", CORE_VERSION),
            ("method", "info"),
            ("_sid", session.sid.as_str()),
        ];
        self.call_data(api::SYSTEM, &params).await
    }

    async fn set_fan_mode(&self, session: &Session, mode: FanMode) -> Result<()> {
        let token = self.fetch_token(session).await;
        let wire_name = self.names.name(mode);

        let mut params = vec![
            ("version", CORE_VERSION),
            ("method", "set"),
            ("dual_fan_speed", wire_name),
            ("_sid", session.sid.as_str()),
        ];
        if let Some(token) = token.as_deref() {
            params.push(("SynoToken", token));
        }

        self.call(ENTRY_PATH, api::FAN_SPEED, &params).await?;
        debug!(mode = wire_name, "Fan mode set");
        Ok(())
    }

    async fn logout(&self, session: &Session) -> Result<()> {
        let params = [
            ("version", AUTH_VERSION),
            ("method", "logout"),
            ("session", self.session_name.as_str()),
            ("_sid", session.sid.as_str()),
        ];
        self.call(AUTH_PATH, api::AUTH, &params).await?;
        Ok(())
    }
}
