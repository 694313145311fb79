//! Scriptable management API for unit tests

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::{Credentials, ManagementApi, Session, SystemInfo, ThermalInfo};
use crate::data::FanMode;
use crate::error::{Result, SynofanError};

pub(crate) struct FakeApi {
    login_fails: bool,
    thermal: Option<f32>,
    thermal_fails: bool,
    sysinfo: Option<f32>,
    sysinfo_fails: bool,
    set_fails: bool,
    set_delay: Option<Duration>,
    calls: Mutex<Vec<&'static str>>,
    applied: Mutex<Vec<FanMode>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            login_fails: false,
            thermal: Some(45.0),
            thermal_fails: false,
            sysinfo: Some(45.0),
            sysinfo_fails: false,
            set_fails: false,
            set_delay: None,
            calls: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn credentials() -> Credentials {
        Credentials {
            host: "https://nas.test:5001".into(),
            user: "fan".into(),
            password: "pw".into(),
            session_name: "fancontrol".into(),
        }
    }

    pub(crate) fn with_login_failure(mut self) -> Self {
        self.login_fails = true;
        self
    }

    pub(crate) fn with_thermal(mut self, temp: Option<f32>) -> Self {
        self.thermal = temp;
        self
    }

    pub(crate) fn with_thermal_failure(mut self) -> Self {
        self.thermal_fails = true;
        self
    }

    pub(crate) fn with_sysinfo(mut self, temp: Option<f32>) -> Self {
        self.sysinfo = temp;
        self
    }

    pub(crate) fn with_sysinfo_failure(mut self) -> Self {
        self.sysinfo_fails = true;
        self
    }

    pub(crate) fn with_set_failure(mut self) -> Self {
        self.set_fails = true;
        self
    }

    pub(crate) fn with_set_delay(mut self, delay: Duration) -> Self {
        self.set_delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == name).count()
    }

    pub(crate) fn applied(&self) -> Vec<FanMode> {
        self.applied.lock().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().push(name);
    }
}

#[async_trait]
impl ManagementApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        self.record("login");
        if self.login_fails {
            return Err(SynofanError::Login("invalid password".into()));
        }
        Ok(Session {
            host: credentials.host.clone(),
            sid: "sid-1".into(),
        })
    }

    async fn get_thermal_info(&self, _session: &Session) -> Result<ThermalInfo> {
        self.record("get_thermal_info");
        if self.thermal_fails {
            return Err(SynofanError::api("thermal", "connection reset"));
        }
        Ok(ThermalInfo {
            cpu_temp: self.thermal,
            system_temp: None,
        })
    }

    async fn get_system_info(&self, _session: &Session) -> Result<SystemInfo> {
        self.record("get_system_info");
        if self.sysinfo_fails {
            return Err(SynofanError::api("system", "HTTP 500"));
        }
        Ok(SystemInfo { temp: self.sysinfo })
    }

    async fn set_fan_mode(&self, _session: &Session, mode: FanMode) -> Result<()> {
        self.record("set_fan_mode");
        if let Some(delay) = self.set_delay {
            tokio::time::sleep(delay).await;
        }
        if self.set_fails {
            return Err(SynofanError::api("fan", "error code 105"));
        }
        self.applied.lock().push(mode);
        Ok(())
    }

    async fn logout(&self, _session: &Session) -> Result<()> {
        self.record("logout");
        Ok(())
    }
}
