//! Application configuration file handling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use taxslip_core::{ExtractionConfig, OutputConfig};

/// Main configuration for the taxslip CLI.
///
/// Custom field patterns are deliberately not part of the file; they are
/// supplied per run with `--pattern`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Load from an explicit path, else from the default location if it
    /// exists, else defaults.
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let default_path = default_config_path();

        let config = if let Some(path) = config_path {
            Self::from_file(Path::new(path))?
        } else if default_path.exists() {
            debug!("Loading config from {}", default_path.display());
            Self::from_file(&default_path)?
        } else {
            Self::default()
        };

        config.extraction.validate()?;
        Ok(config)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taxslip")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.extraction.validate_sin = true;
        config.output.unknown_issuer = "N/A".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert!(loaded.extraction.validate_sin);
        assert_eq!(loaded.output.unknown_issuer, "N/A");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extraction": {"validate_sin": true}}"#).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert!(loaded.extraction.validate_sin);
        assert!(loaded.extraction.seed_default_patterns);
        assert!(loaded.output.bookmark_unrecognized);
    }
}
