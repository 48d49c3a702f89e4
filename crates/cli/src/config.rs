//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "model.json";
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// User-level defaults from `~/.config/cpd/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model artifact used when `--model` is not given
    pub model_path: Option<PathBuf>,
    /// Server URL used when `--api-url` is not given
    pub api_url: Option<String>,
}

impl Config {
    /// Load the user config; a missing file means no overrides
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Flag or env value first, then the config file, then the built-in default
    pub fn model_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.model_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    pub fn api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("cpd").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.model_path(None), PathBuf::from("model.json"));
        assert_eq!(config.api_url(None), "http://localhost:5000");
    }

    #[test]
    fn test_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"model_path": "/srv/models/deep.json", "api_url": "http://estimator:5000"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model_path(None), PathBuf::from("/srv/models/deep.json"));
        assert_eq!(
            config.model_path(Some(PathBuf::from("local.json"))),
            PathBuf::from("local.json")
        );
        assert_eq!(config.api_url(None), "http://estimator:5000");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
