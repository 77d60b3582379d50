//! Persisted settings blob.
//!
//! Settings live in a single JSON object stored under a fixed key. The core
//! does not define a schema for it. A blob that cannot be read or parsed is
//! logged and replaced by defaults; it never stops the tester.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key the settings blob is stored under.
pub const SETTINGS_KEY: &str = "monitorTesterSettings";

/// Opaque settings object. Currently always empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    entries: serde_json::Map<String, serde_json::Value>,
}

impl Settings {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File-backed key-value store holding the settings blob.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store the blob inside `dir`, as `<dir>/monitorTesterSettings.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", SETTINGS_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the blob, falling back to defaults on any failure.
    pub fn load(&self) -> Settings {
        match self.try_load() {
            Ok(Some(settings)) => {
                debug!("Loaded settings from {:?}", self.path);
                settings
            }
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<Settings>, SettingsError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| SettingsError::ReadFailed {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Persist the blob. Failures are logged; returns whether it was written.
    pub fn save(&self, settings: &Settings) -> bool {
        match self.try_save(settings) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save settings: {}", e);
                false
            }
        }
    }

    fn try_save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string(settings)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::WriteFailed)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(SettingsError::WriteFailed)?;
        fs::rename(&temp_path, &self.path).map_err(SettingsError::WriteFailed)?;
        Ok(())
    }
}
