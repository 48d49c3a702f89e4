//! Server configuration

use anyhow::Result;
use difficulty_lib::FeatureRecipe;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Basename of the optional config file in the working directory
pub const CONFIG_FILE: &str = "difficulty-server";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Trained model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Recipe the loaded model must have been trained with
    #[serde(default)]
    pub recipe: FeatureRecipe,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model.json")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model_path: default_model_path(),
            recipe: FeatureRecipe::default(),
        }
    }
}

impl ServerConfig {
    /// Load from `difficulty-server.toml` (if present) and `DIFFICULTY_*` env vars
    pub fn load() -> Result<Self> {
        Self::from_file_source(config::File::with_name(CONFIG_FILE).required(false))
    }

    /// Load from an explicit TOML file, still honoring env overrides
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::from_file_source(config::File::from(path).format(config::FileFormat::Toml))
    }

    fn from_file_source<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("DIFFICULTY").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
