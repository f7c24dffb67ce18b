//! Persisted settings
//!
//! The settings bridge: a small toml file holding the user's preferred
//! speaking rate, readable and writable by external settings surfaces. The
//! controller receives `speech_rate` as its initial rate. Environment
//! variables prefixed `READALOUD_` override the file on load.

use crate::surface::RATE_RANGE;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Playback rate multiplier applied to new sessions
    pub speech_rate: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { speech_rate: 1.0 }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when missing
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, String> {
        let mut builder = Config::builder();

        // Defaults keep deserialization working with a partial or absent file.
        builder = builder
            .set_default("speech_rate", 1.0)
            .map_err(|e| format!("failed to set defaults: {e}"))?;

        builder = builder.add_source(File::from(path.as_ref()).required(false));

        // Environment variables override the file's settings.
        builder = builder.add_source(Environment::with_prefix("READALOUD"));

        let config = builder
            .build()
            .map_err(|e| format!("failed to build config: {e}"))?;

        let mut settings: Settings = config
            .try_deserialize()
            .map_err(|e| format!("failed to deserialize settings: {e}"))?;

        settings.validate();
        Ok(settings)
    }

    /// Write settings back to `path`, creating parent directories as needed
    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        let rendered =
            toml::to_string_pretty(self).map_err(|e| format!("failed to render settings: {e}"))?;
        std::fs::write(path, rendered)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))
    }

    /// Repair out-of-range values instead of rejecting the whole file
    fn validate(&mut self) {
        if !self.speech_rate.is_finite() || !RATE_RANGE.contains(&self.speech_rate) {
            tracing::warn!(
                "invalid speech_rate {}, defaulting to 1.0",
                self.speech_rate
            );
            self.speech_rate = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let settings = Settings { speech_rate: 1.5 };
        settings.store(&path).unwrap();
        assert_eq!(Settings::from_path(&path).unwrap(), settings);
    }

    #[test]
    fn out_of_range_rate_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "speech_rate = 9.0\n").unwrap();
        let settings = Settings::from_path(&path).unwrap();
        assert_eq!(settings.speech_rate, 1.0);
    }

    #[test]
    fn store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/settings.toml");
        Settings::default().store(&path).unwrap();
        assert!(path.exists());
    }
}
