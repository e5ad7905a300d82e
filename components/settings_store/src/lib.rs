// components/settings_store/src/lib.rs
//! Flat-file persistence for user settings.
//!
//! One JSON file holding the last-used download folder, read once at startup
//! and overwritten at the start of every run. No locking: at most one run is
//! active at a time, so there is never a concurrent writer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base directory of the most recent run; empty when never set.
    #[serde(default)]
    pub last_folder: String,
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the settings file. A missing file or missing key yields the
    /// default (empty last folder); a malformed file is an error.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the settings file in full.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let raw = serde_json::to_string(settings)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
