//! Host settings (JSON file, all fields optional).

use std::fs;
use std::path::Path;

use captio_core::CaptionConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    pub sample_rate: u32,
    pub block_size: usize,
    pub window_secs: f64,
    pub poll_interval_ms: u64,
    /// Display label for the translation target (the stub translator only
    /// tags text; a real backend would read this).
    pub target_language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            block_size: 1_024,
            window_secs: 2.0,
            poll_interval_ms: 500,
            target_language: "zh".into(),
        }
    }
}

impl AppSettings {
    /// Clamp out-of-range values to usable bounds.
    pub fn normalize(&mut self) {
        self.sample_rate = self.sample_rate.clamp(8_000, 48_000);
        self.block_size = self.block_size.clamp(64, 8_192);
        self.window_secs = self.window_secs.clamp(0.5, 30.0);
        self.poll_interval_ms = self.poll_interval_ms.clamp(50, 5_000);
        if self.target_language.trim().is_empty() {
            self.target_language = "zh".into();
        }
    }

    pub fn to_config(&self) -> CaptionConfig {
        CaptionConfig {
            sample_rate: self.sample_rate,
            block_size: self.block_size,
            window_secs: self.window_secs,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

/// Load settings from `path`, falling back to defaults when the file is
/// missing or unreadable. Values are normalized before use.
pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<AppSettings>(&raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), "invalid settings file ({e}); using defaults");
                AppSettings::default()
            }
        },
        Err(_) => AppSettings::default(),
    };
    settings.normalize();
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"windowSecs": 3.0}"#).unwrap();
        assert_eq!(settings.sample_rate, 16_000);
        assert_eq!(settings.block_size, 1_024);
        assert!((settings.window_secs - 3.0).abs() < 1e-9);
        assert_eq!(settings.poll_interval_ms, 500);
    }

    #[test]
    fn normalize_clamps_out_of_range_values() {
        let mut settings: AppSettings =
            serde_json::from_str(r#"{"sampleRate": 1, "pollIntervalMs": 999999, "targetLanguage": "  "}"#)
                .unwrap();
        settings.normalize();
        assert_eq!(settings.sample_rate, 8_000);
        assert_eq!(settings.poll_interval_ms, 5_000);
        assert_eq!(settings.target_language, "zh");
    }

    #[test]
    fn config_reflects_settings() {
        let settings = AppSettings::default();
        let config = settings.to_config();
        assert_eq!(config.window_samples(), 32_000);
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let settings = load_settings(Path::new("/nonexistent/captio-settings.json"));
        assert_eq!(settings.sample_rate, 16_000);
    }
}
