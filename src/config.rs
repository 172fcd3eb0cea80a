//! Configuration file support for rsmark.
//!
//! Settings live in a small versioned JSON document. Every field has a
//! default, so partial files (or `{}`) are valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CANVAS_FILL_FRACTION, DEFAULT_LABEL_PREFIX};
use crate::coords::{CornerPolicy, DecodeOptions};
use crate::error::{Error, Result};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Coordinate decoding settings
    #[serde(default)]
    pub decoder: DecoderSettings,

    /// Canvas placement settings
    #[serde(default)]
    pub canvas: CanvasSettings,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            decoder: DecoderSettings::default(),
            canvas: CanvasSettings::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Decoder section of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderSettings {
    /// Prefix for labels of unlabeled records
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,

    /// Handling of reversed corners
    #[serde(default)]
    pub corner_policy: CornerPolicy,
}

fn default_label_prefix() -> String {
    DEFAULT_LABEL_PREFIX.to_string()
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            label_prefix: default_label_prefix(),
            corner_policy: CornerPolicy::default(),
        }
    }
}

impl DecoderSettings {
    /// Options for the decode pipeline.
    pub fn to_options(&self) -> DecodeOptions {
        DecodeOptions::new()
            .with_label_prefix(self.label_prefix.clone())
            .with_corner_policy(self.corner_policy)
    }
}

/// Canvas section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    /// Fraction of the canvas an image may fill in each dimension
    #[serde(default = "default_fill_fraction")]
    pub fill_fraction: f64,
}

fn default_fill_fraction() -> f64 {
    DEFAULT_CANVAS_FILL_FRACTION
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            fill_fraction: default_fill_fraction(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading config from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Write the config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        log::info!("Saving config to {:?}", path);
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.version > CONFIG_VERSION {
            return Err(Error::VersionMismatch {
                expected: CONFIG_VERSION,
                found: self.version,
            });
        }
        let fill = self.canvas.fill_fraction;
        if !(fill > 0.0 && fill <= 1.0) {
            return Err(Error::invalid_argument(format!(
                "canvas.fill_fraction must be in (0, 1], got {fill}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.decoder.label_prefix, "Object");
        assert_eq!(config.decoder.corner_policy, CornerPolicy::Preserve);
        assert!((config.canvas.fill_fraction - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_partial_document() {
        let config = AppConfig::from_json(
            r#"{"decoder": {"corner_policy": "normalize"}, "log_level": "debug"}"#,
        )
        .unwrap();
        assert_eq!(config.decoder.corner_policy, CornerPolicy::Normalize);
        assert_eq!(config.decoder.label_prefix, "Object");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { expected: 1, found: 99 }));
    }

    #[test]
    fn test_bad_fill_fraction_rejected() {
        assert!(AppConfig::from_json(r#"{"canvas": {"fill_fraction": 0}}"#).is_err());
        assert!(AppConfig::from_json(r#"{"canvas": {"fill_fraction": 1.2}}"#).is_err());
    }

    #[test]
    fn test_unknown_policy_is_json_error() {
        let err = AppConfig::from_json(r#"{"decoder": {"corner_policy": "flip"}}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_to_options() {
        let settings = DecoderSettings {
            label_prefix: "Target".into(),
            corner_policy: CornerPolicy::Normalize,
        };
        let options = settings.to_options();
        assert_eq!(options.label_prefix, "Target");
        assert_eq!(options.corner_policy, CornerPolicy::Normalize);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsmark.json");

        let mut config = AppConfig::default();
        config.decoder.label_prefix = "目标".into();
        config.log_level = LogLevel::Trace;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
