//! Persisted preference storage.
//!
//! A thin key-value port over raw JSON strings. Every failure — missing
//! key, unreadable file, undecodable value, failed write — is swallowed:
//! loads fall back to the caller's default and saves drop the value. The
//! dashboard degrades to defaults rather than surfacing storage problems.

use anyhow::{Result, anyhow};
use directories::ProjectDirs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{fs, io};

/// Key-value port over raw JSON strings.
pub trait PrefStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
}

/// Read and JSON-decode a preference; absence or decode failure returns the
/// default.
pub fn load_pref<T: DeserializeOwned>(store: &dyn PrefStore, key: &str, default: T) -> T {
    let Some(raw) = store.get(key) else {
        return default;
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(key, %err, "ignoring undecodable preference");
            default
        }
    }
}

/// JSON-encode and write a preference; encode or write failure is dropped.
pub fn save_pref<T: Serialize>(store: &dyn PrefStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.put(key, &raw),
        Err(err) => tracing::debug!(key, %err, "failed to encode preference"),
    }
}

/// Preferences persisted as one JSON object in a file under the platform
/// config directory.
#[derive(Debug)]
pub struct FilePrefs {
    path: PathBuf,
}

impl FilePrefs {
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(Self::with_path(dirs.config_dir().join("prefs.json")))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> HashMap<String, Value> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(path = %self.path.display(), %err, "failed to read preferences");
                }
                return HashMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(map) => map,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "ignoring corrupt preferences file");
                HashMap::new()
            }
        }
    }

    fn write_all(&self, map: &HashMap<String, Value>) {
        if let Some(parent) = self.path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            tracing::debug!(path = %parent.display(), %err, "failed to create preferences directory");
            return;
        }

        let contents = match serde_json::to_string_pretty(map) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(%err, "failed to encode preferences");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, contents) {
            tracing::debug!(path = %self.path.display(), %err, "failed to write preferences");
        }
    }
}

impl PrefStore for FilePrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().get(key).map(Value::to_string)
    }

    fn put(&self, key: &str, value: &str) {
        let parsed: Value = match serde_json::from_str(value) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(key, %err, "refusing to store non-JSON preference");
                return;
            }
        };

        let mut map = self.read_all();
        map.insert(key.to_string(), parsed);
        self.write_all(&map);
    }
}

/// In-memory store for tests and as a fallback when the platform config
/// directory is unavailable. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    map: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl PrefStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        if self.fail_writes.load(Ordering::SeqCst) {
            tracing::debug!(key, "dropping preference write");
            return;
        }
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitSystem;

    #[test]
    fn load_returns_default_when_absent() {
        let store = MemoryPrefs::new();
        let units = load_pref(&store, "units", UnitSystem::Metric);
        assert_eq!(units, UnitSystem::Metric);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let store = MemoryPrefs::new();
        save_pref(&store, "units", &UnitSystem::Imperial);

        assert_eq!(store.get("units").as_deref(), Some("\"imperial\""));
        let units = load_pref(&store, "units", UnitSystem::Metric);
        assert_eq!(units, UnitSystem::Imperial);
    }

    #[test]
    fn undecodable_value_falls_back_to_default() {
        let store = MemoryPrefs::new();
        store.put("units", "\"furlongs\"");

        let units = load_pref(&store, "units", UnitSystem::Metric);
        assert_eq!(units, UnitSystem::Metric);
    }

    #[test]
    fn failed_write_is_silent_and_leaves_store_unchanged() {
        let store = MemoryPrefs::new();
        store.fail_writes(true);
        save_pref(&store, "units", &UnitSystem::Imperial);

        assert!(store.get("units").is_none());
        let units = load_pref(&store, "units", UnitSystem::Metric);
        assert_eq!(units, UnitSystem::Metric);
    }

    #[test]
    fn file_prefs_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePrefs::with_path(dir.path().join("prefs.json"));

        save_pref(&store, "units", &UnitSystem::Imperial);
        let units = load_pref(&store, "units", UnitSystem::Metric);
        assert_eq!(units, UnitSystem::Imperial);

        // A second key does not clobber the first.
        save_pref(&store, "greeting", &"hello".to_string());
        let units = load_pref(&store, "units", UnitSystem::Metric);
        assert_eq!(units, UnitSystem::Imperial);
    }

    #[test]
    fn file_prefs_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePrefs::with_path(dir.path().join("nope.json"));

        assert!(store.get("units").is_none());
        let units = load_pref(&store, "units", UnitSystem::Metric);
        assert_eq!(units, UnitSystem::Metric);
    }

    #[test]
    fn file_prefs_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").expect("write");

        let store = FilePrefs::with_path(path);
        assert!(store.get("units").is_none());
    }

    #[test]
    fn file_prefs_unwritable_path_is_silent() {
        let dir = tempfile::tempdir().expect("tempdir");
        // The path is a directory, so the write must fail; it must not panic.
        let store = FilePrefs::with_path(dir.path().to_path_buf());
        save_pref(&store, "units", &UnitSystem::Imperial);
        assert!(store.get("units").is_none());
    }
}
