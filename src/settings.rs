//! Layered settings.
//!
//! Settings come from three layers: an optional settings file, environment
//! variables prefixed `VITALWATCH`, and command-line flags (applied by the
//! caller, which wins). The Settings view writes JSON that the loader
//! reads back on the next start.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::AlertThresholds;

/// On-disk settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL; the CLI flag overrides this when given.
    pub server: Option<String>,
    /// Alert thresholds, editable from the Settings view.
    pub alerts: AlertThresholds,
}

/// Load settings from an optional file plus environment overrides.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let cfg = Config::builder()
        .add_source(File::from(path.to_path_buf()).required(false))
        .add_source(
            Environment::with_prefix("VITALWATCH")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to load settings")?;

    cfg.try_deserialize().context("invalid settings")
}

/// Persist settings as JSON readable by [`load_settings`].
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write settings to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(&dir.path().join("absent.json")).unwrap();
        assert!(settings.server.is_none());
        assert_eq!(settings.alerts.heart_rate_min, 60.0);
        assert!(settings.alerts.fall_detection);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vitalwatch.json");

        let mut settings = Settings::default();
        settings.server = Some("http://ward-3.local:8000".to_string());
        settings.alerts.heart_rate_max = 110.0;
        settings.alerts.fall_detection = false;

        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();

        assert_eq!(loaded.server.as_deref(), Some("http://ward-3.local:8000"));
        assert_eq!(loaded.alerts.heart_rate_max, 110.0);
        assert!(!loaded.alerts.fall_detection);
        // Untouched fields keep their defaults
        assert_eq!(loaded.alerts.spo2_min, 95.0);
    }
}
