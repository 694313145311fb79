//! Persistence of the last applied fan mode
//!
//! The state record survives between scheduler invocations. A missing or
//! unparsable record is never fatal: it reads as "unknown prior state",
//! which makes the next run apply its mode unconditionally.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::{limits, state};
use crate::data::types::PersistedState;
use crate::error::{Result, SynofanError};

/// Storage for the last applied fan mode
pub trait StateStore: Send + Sync {
    /// Read the stored record
    ///
    /// `Ok(None)` means no record exists. A record that exists but cannot be
    /// understood is reported as [`SynofanError::StateCorrupt`].
    fn read(&self) -> Result<Option<PersistedState>>;

    /// Replace the stored record
    fn save(&self, state: &PersistedState) -> Result<()>;

    /// Stored record, with corruption folded into "no record"
    fn load(&self) -> Option<PersistedState> {
        match self.read() {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring persisted state: {}", e);
                None
            }
        }
    }
}

/// JSON file backed state store
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl Into<String>) -> SynofanError {
        SynofanError::StateCorrupt {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(state::TEMP_SUFFIX);
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonStateStore {
    fn read(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            debug!("No state file at {:?}", self.path);
            return Ok(None);
        }

        let size = fs::metadata(&self.path)
            .map_err(|e| self.corrupt(format!("cannot stat: {}", e)))?
            .len();
        if size > limits::MAX_STATE_SIZE {
            return Err(self.corrupt(format!("{} bytes exceeds {}", size, limits::MAX_STATE_SIZE)));
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| self.corrupt(format!("cannot read: {}", e)))?;

        let record: PersistedState =
            serde_json::from_str(&contents).map_err(|e| self.corrupt(e.to_string()))?;

        if record.version > state::VERSION {
            return Err(self.corrupt(format!(
                "unsupported version {} (expected <= {})",
                record.version,
                state::VERSION
            )));
        }

        debug!(mode = %record.mode, timestamp = %record.timestamp, "Loaded persisted state");
        Ok(Some(record))
    }

    fn save(&self, record: &PersistedState) -> Result<()> {
        // Timestamps never move backwards relative to what is on disk.
        let mut record = record.clone();
        if let Ok(Some(previous)) = self.read() {
            record.timestamp = record.timestamp.max(previous.timestamp);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SynofanError::FileWrite {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&record)?;

        // Atomic write - write to temp file then rename
        let temp_path = self.temp_path();

        let mut file = fs::File::create(&temp_path)
            .map_err(|e| SynofanError::FileWrite { path: temp_path.clone(), source: e })?;

        file.write_all(json.as_bytes())
            .map_err(|e| SynofanError::FileWrite { path: temp_path.clone(), source: e })?;

        file.sync_all()
            .map_err(|e| SynofanError::FileWrite { path: temp_path.clone(), source: e })?;

        drop(file);

        fs::rename(&temp_path, &self.path)
            .map_err(|e| SynofanError::FileWrite { path: self.path.clone(), source: e })?;

        debug!(mode = %record.mode, path = ?self.path, "Saved state");
        Ok(())
    }
}

/// In-memory state store
///
/// Holds the record for the lifetime of the value. Saves can be made to fail
/// to exercise the persist-failure path.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    record: Mutex<Option<PersistedState>>,
    fail_saves: bool,
    saves: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(record: PersistedState) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            ..Self::default()
        }
    }

    /// A store whose `save` always fails
    pub fn failing(record: Option<PersistedState>) -> Self {
        Self {
            record: Mutex::new(record),
            fail_saves: true,
            saves: Mutex::new(0),
        }
    }

    /// Current record, without going through the trait
    pub fn snapshot(&self) -> Option<PersistedState> {
        self.record.lock().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self) -> Result<Option<PersistedState>> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, record: &PersistedState) -> Result<()> {
        if self.fail_saves {
            return Err(SynofanError::PersistFailed("in-memory store is read-only".into()));
        }
        let mut guard = self.record.lock();
        let mut record = record.clone();
        if let Some(previous) = guard.as_ref() {
            record.timestamp = record.timestamp.max(previous.timestamp);
        }
        *guard = Some(record);
        *self.saves.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::FanMode;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonStateStore {
        JsonStateStore::new(dir.path().join("state").join("fanstate.json"))
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.read().unwrap().is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();

        store.save(&PersistedState::applied(FanMode::Cool, now)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.mode, FanMode::Cool);
        assert_eq!(loaded.timestamp, now);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_timestamps_non_decreasing_across_saves() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let now = Utc::now();

        store.save(&PersistedState::applied(FanMode::Quiet, now)).unwrap();
        store
            .save(&PersistedState::applied(FanMode::Full, now - Duration::minutes(5)))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.mode, FanMode::Full);
        assert!(loaded.timestamp >= now);
    }

    #[test]
    fn test_corrupt_file_reads_as_unknown() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.read(), Err(SynofanError::StateCorrupt { .. })));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_unknown_mode_reads_as_unknown() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{"mode":"turbo","timestamp":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_overwrites_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "garbage").unwrap();

        store.save(&PersistedState::applied(FanMode::Quiet, Utc::now())).unwrap();
        assert_eq!(store.load().unwrap().mode, FanMode::Quiet);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStateStore::new();
        assert!(store.load().is_none());
        store.save(&PersistedState::applied(FanMode::Full, Utc::now())).unwrap();
        assert_eq!(store.snapshot().unwrap().mode, FanMode::Full);
        assert_eq!(store.save_count(), 1);

        let failing = MemoryStateStore::failing(None);
        assert!(failing.save(&PersistedState::applied(FanMode::Full, Utc::now())).is_err());
        assert!(failing.snapshot().is_none());
    }
}
