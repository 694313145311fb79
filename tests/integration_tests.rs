/*
 * Integration tests for Synofan
 *
 * These tests drive complete runs through the CLI handlers with a scripted
 * management API, a JSON state file and a fake hwmon tree on disk.
 */

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serial_test::serial;
use sf_core::constants::env;
use sf_core::{
    load_config, Credentials, FanMode, JsonStateStore, ManagementApi, PersistedState, Session,
    StateStore, SynofanError, SystemInfo, ThermalInfo,
};
use synofan::cli::{cmd_run, cmd_state, EXIT_FAILURE, EXIT_OK};
use tempfile::TempDir;

// Test utilities
#[derive(Default)]
struct ScriptedApi {
    thermal: Option<f32>,
    sysinfo: Option<f32>,
    reject_set: bool,
    sets: Mutex<Vec<FanMode>>,
    logins: AtomicUsize,
}

impl ScriptedApi {
    fn thermal(temp: f32) -> Self {
        Self {
            thermal: Some(temp),
            ..Default::default()
        }
    }

    fn unreachable() -> Self {
        Self::default()
    }

    fn sets(&self) -> Vec<FanMode> {
        self.sets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManagementApi for ScriptedApi {
    async fn login(&self, credentials: &Credentials) -> sf_core::Result<Session> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        if self.thermal.is_none() && self.sysinfo.is_none() {
            return Err(SynofanError::Login("connection refused".into()));
        }
        Ok(Session {
            host: credentials.host.clone(),
            sid: "sid".into(),
        })
    }

    async fn get_thermal_info(&self, _session: &Session) -> sf_core::Result<ThermalInfo> {
        Ok(ThermalInfo {
            cpu_temp: self.thermal,
            system_temp: None,
        })
    }

    async fn get_system_info(&self, _session: &Session) -> sf_core::Result<SystemInfo> {
        Ok(SystemInfo { temp: self.sysinfo })
    }

    async fn set_fan_mode(&self, _session: &Session, mode: FanMode) -> sf_core::Result<()> {
        if self.reject_set {
            return Err(SynofanError::ApiStatus {
                api: "SYNO.Core.Hardware.FanSpeed".into(),
                code: 105,
            });
        }
        self.sets.lock().unwrap().push(mode);
        Ok(())
    }

    async fn logout(&self, _session: &Session) -> sf_core::Result<()> {
        Ok(())
    }
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn state_path(&self) -> std::path::PathBuf {
        self.dir.path().join("state").join("fanstate.json")
    }

    fn hwmon_base(&self) -> std::path::PathBuf {
        self.dir.path().join("hwmon")
    }

    fn add_sensor(&self, hwmon: &str, file: &str, millidegrees: &str) {
        let chip = self.hwmon_base().join(hwmon);
        fs::create_dir_all(&chip).unwrap();
        fs::write(chip.join(file), millidegrees).unwrap();
    }

    fn write_config(&self, extra: &str) -> std::path::PathBuf {
        let path = self.dir.path().join("config.json");
        let json = format!(
            r#"{{
                "dsm": {{ "host": "https://nas.test:5001", "user": "fan", "password": "from-file" }},
                "state_file": "{}",
                "hwmon_base": "{}"{}
            }}"#,
            self.state_path().display(),
            self.hwmon_base().display(),
            extra
        );
        fs::write(&path, json).unwrap();
        path
    }

    fn store(&self) -> Arc<JsonStateStore> {
        Arc::new(JsonStateStore::new(self.state_path()))
    }
}

fn run(config_path: &Path, api: Arc<ScriptedApi>, store: Arc<JsonStateStore>) -> (i32, String) {
    let config = load_config(config_path).unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let mut out = Vec::new();
    let code = runtime.block_on(cmd_run(&mut out, &config, api, store));
    (code, String::from_utf8(out).unwrap())
}

#[test]
#[serial]
fn test_first_run_applies_and_second_run_is_quiet() {
    let fx = Fixture::new();
    let config = fx.write_config("");
    let api = Arc::new(ScriptedApi::thermal(47.0));

    let (code, output) = run(&config, api.clone(), fx.store());
    assert_eq!(code, EXIT_OK);
    assert!(output.contains("Current mode: unknown | Desired mode: coolfan | Changed: Yes"));
    assert!(output.contains("[SUCCESS] Fan mode changed to coolfan"));
    assert_eq!(api.sets(), vec![FanMode::Cool]);

    let (code, output) = run(&config, api.clone(), fx.store());
    assert_eq!(code, EXIT_OK);
    assert!(output.contains(
        "[STATUS] Temp=47.0°C (from THERMAL_API: SYNO.Core.Hardware.Thermal) \
         | Current mode: coolfan | Desired mode: coolfan | Changed: No"
    ));
    assert_eq!(api.sets().len(), 1);

    let state = fx.store().read().unwrap().unwrap();
    assert_eq!(state.mode, FanMode::Cool);
    assert!(state.timestamp >= state.applied_at);
}

#[test]
#[serial]
fn test_hwmon_fallback_when_api_unreachable() {
    let fx = Fixture::new();
    fx.add_sensor("hwmon0", "temp1_input", "999000");
    fx.add_sensor("hwmon1", "temp1_input", "61500");
    let config = fx.write_config("");
    let api = Arc::new(ScriptedApi::unreachable());

    let (code, output) = run(&config, api.clone(), fx.store());

    // Login fails, so actuation fails even though a reading was found.
    assert_eq!(code, EXIT_FAILURE);
    assert!(output.contains("Temp=61.5°C (from HWMON:"));
    assert!(output.contains("Desired mode: fullfan"));
    assert!(output.contains("[WARNING] Source THERMAL_API unavailable"));
    assert!(output.contains("[ERROR] Failed to set fan mode"));
    assert_eq!(api.logins.load(Ordering::SeqCst), 1);
    assert!(fx.store().read().unwrap().is_none());
}

#[test]
#[serial]
fn test_no_source_leaves_state_untouched() {
    let fx = Fixture::new();
    let config = fx.write_config("");
    let store = fx.store();
    let before = PersistedState::applied(FanMode::Quiet, chrono::Utc::now());
    store.save(&before).unwrap();

    let (code, output) = run(&config, Arc::new(ScriptedApi::unreachable()), store.clone());

    assert_eq!(code, EXIT_FAILURE);
    assert!(output.contains("[ERROR] No temperature source available"));
    assert_eq!(store.read().unwrap().unwrap(), before);
}

#[test]
#[serial]
fn test_actuation_failure_keeps_previous_mode() {
    let fx = Fixture::new();
    let config = fx.write_config("");
    let store = fx.store();
    store
        .save(&PersistedState::applied(FanMode::Quiet, chrono::Utc::now()))
        .unwrap();
    let api = Arc::new(ScriptedApi {
        reject_set: true,
        ..ScriptedApi::thermal(70.0)
    });

    let (code, output) = run(&config, api, store.clone());

    assert_eq!(code, EXIT_FAILURE);
    assert!(output.contains("Current mode: quietfan | Desired mode: fullfan | Changed: No"));
    assert_eq!(store.read().unwrap().unwrap().mode, FanMode::Quiet);
}

#[test]
#[serial]
fn test_corrupt_state_recovers_as_unknown() {
    let fx = Fixture::new();
    let config = fx.write_config("");
    fs::create_dir_all(fx.state_path().parent().unwrap()).unwrap();
    fs::write(fx.state_path(), "{ not json").unwrap();
    let api = Arc::new(ScriptedApi::thermal(30.0));

    let (code, output) = run(&config, api.clone(), fx.store());

    assert_eq!(code, EXIT_OK);
    assert!(output.contains("[WARNING] State file"));
    assert!(output.contains("Current mode: unknown"));
    assert_eq!(api.sets(), vec![FanMode::Quiet]);
    assert_eq!(fx.store().read().unwrap().unwrap().mode, FanMode::Quiet);
}

#[test]
#[serial]
fn test_custom_thresholds_from_file() {
    let fx = Fixture::new();
    let config = fx.write_config(r#", "thresholds": { "quiet_max": 30.0, "cool_max": 45.0 }"#);
    let api = Arc::new(ScriptedApi::thermal(47.0));

    let (_, output) = run(&config, api.clone(), fx.store());

    assert!(output.contains("Desired mode: fullfan"));
    assert_eq!(api.sets(), vec![FanMode::Full]);
}

#[test]
#[serial]
fn test_password_env_override() {
    let fx = Fixture::new();
    let config = fx.write_config("");

    std::env::set_var(env::PASSWORD, "from-env");
    let loaded = load_config(&config);
    std::env::remove_var(env::PASSWORD);

    assert_eq!(loaded.unwrap().dsm.password, "from-env");
    assert_eq!(load_config(&config).unwrap().dsm.password, "from-file");
}

#[test]
#[serial]
fn test_invalid_thresholds_rejected_before_run() {
    let fx = Fixture::new();
    let config = fx.write_config(r#", "thresholds": { "quiet_max": 55.0, "cool_max": 55.0 }"#);

    let err = load_config(&config).unwrap_err();
    assert!(matches!(err, SynofanError::InvalidThresholds { .. }));
}

#[test]
#[serial]
fn test_state_command_reads_written_file() {
    let fx = Fixture::new();
    let config = fx.write_config("");
    run(&config, Arc::new(ScriptedApi::thermal(52.0)), fx.store());

    let mut out = Vec::new();
    let code = cmd_state(&mut out, fx.store().as_ref()).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(code, EXIT_OK);
    assert!(text.contains("\"mode\": \"cool\""));
    assert!(text.contains("\"last_temp\": 52.0"));
}
