//! JSON file configuration store.
//!
//! Implements [`ConfigPort`] over a single JSON document.
//!
//! - Validation: every load and save runs [`SystemConfig::validate`];
//!   an invalid document is never returned or persisted.
//! - Atomic writes: the document is written to a sibling temp file and
//!   renamed over the original.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Apply a partial JSON object on top of the stored config and persist
    /// the result.
    pub fn apply_patch(&self, patch: &serde_json::Value) -> Result<SystemConfig, ConfigError> {
        let updated = self.load()?.with_patch(patch)?;
        self.save(&updated)?;
        Ok(updated)
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let config: SystemConfig =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        info!("Config loaded from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|_| ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("Config saved to {}", self.path.display());
        Ok(())
    }
}
