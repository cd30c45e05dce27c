//! JSON state file
//!
//! Loading a missing file yields empty state. Saving bumps the serial,
//! stamps the provider version, and replaces the file atomically through a
//! sibling temp file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{Result, StateError};
use crate::lifecycle::ResourceState;

/// State file format understood by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Persisted state of every managed instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    /// Format version, checked on load
    pub format_version: u32,
    /// Incremented on every save
    pub serial: u64,
    /// Provider version that last wrote the file
    #[serde(default)]
    pub provider_version: Option<String>,
    /// Managed instances keyed by resource name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            serial: 0,
            provider_version: None,
            resources: BTreeMap::new(),
        }
    }
}

impl StateFile {
    /// Returns the stored state for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceState> {
        self.resources.get(name)
    }

    /// Returns `true` if `name` is managed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Stores `state` for `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, state: ResourceState) {
        self.resources.insert(name.into(), state);
    }

    /// Removes and returns the state for `name`.
    pub fn remove(&mut self, name: &str) -> Option<ResourceState> {
        self.resources.remove(name)
    }

    /// Returns `true` if no instance is managed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// File-backed store for a [`StateFile`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store for the state file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads state. A missing file is empty state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Corrupt`] for unparseable content,
    /// [`StateError::UnsupportedVersion`] for a foreign format version, or
    /// an I/O error if the file exists but cannot be read.
    pub fn load(&self) -> Result<StateFile> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file, starting empty");
                return Ok(StateFile::default());
            }
            Err(e) => return Err(e.into()),
        };

        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| self.corrupt(&e))?;

        let found = value
            .get("format_version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| StateError::Corrupt {
                path: self.path.clone(),
                message: "missing format_version".to_string(),
            })?;
        if found != u64::from(FORMAT_VERSION) {
            return Err(StateError::UnsupportedVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: FORMAT_VERSION,
            }
            .into());
        }

        let state: StateFile = serde_json::from_value(value).map_err(|e| self.corrupt(&e))?;
        debug!(
            path = %self.path.display(),
            serial = state.serial,
            resources = state.resources.len(),
            "state loaded"
        );
        Ok(state)
    }

    /// Saves state, bumping its serial and stamping the provider version.
    ///
    /// # Errors
    ///
    /// Returns an I/O or JSON error if the file cannot be written.
    pub fn save(&self, state: &mut StateFile, provider: &ProviderConfig) -> Result<()> {
        state.serial += 1;
        state.provider_version = Some(provider.version.clone());

        let mut json = serde_json::to_string_pretty(state)?;
        json.push('\n');

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), serial = state.serial, "state saved");
        Ok(())
    }

    fn corrupt(&self, err: &serde_json::Error) -> StateError {
        StateError::Corrupt {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhaserError;
    use crate::phase::Phase;

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("phaser.state.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = store();
        let state = store.load().unwrap();
        assert!(state.is_empty());
        assert_eq!(state.serial, 0);
    }

    #[test]
    fn test_round_trip_bumps_serial() {
        let (_dir, store) = store();
        let mut state = StateFile::default();
        state.insert(
            "rollout",
            ResourceState {
                phase: Phase::from("ready"),
                phases: None,
            },
        );
        store.save(&mut state, &ProviderConfig::new("1.0.0")).unwrap();
        store.save(&mut state, &ProviderConfig::new("1.0.0")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.serial, 2);
        assert_eq!(loaded.provider_version.as_deref(), Some("1.0.0"));
        assert_eq!(loaded.get("rollout").unwrap().phase, "ready");
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(
            store.load().unwrap_err(),
            PhaserError::State(StateError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let (_dir, store) = store();
        std::fs::write(store.path(), r#"{"format_version": 7, "serial": 1}"#).unwrap();
        assert!(matches!(
            store.load().unwrap_err(),
            PhaserError::State(StateError::UnsupportedVersion { found: 7, expected: 1 })
        ));
    }

    #[test]
    fn test_missing_version_is_corrupt() {
        let (_dir, store) = store();
        std::fs::write(store.path(), r#"{"serial": 1}"#).unwrap();
        assert!(matches!(
            store.load().unwrap_err(),
            PhaserError::State(StateError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_remove() {
        let mut state = StateFile::default();
        state.insert(
            "a",
            ResourceState {
                phase: Phase::from("x"),
                phases: None,
            },
        );
        assert!(state.contains("a"));
        assert!(state.remove("a").is_some());
        assert!(state.remove("a").is_none());
    }
}
