//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for mergeline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub publindex: Option<mergeline_publindex::Config>,
    pub scienti: Option<mergeline_scienti::Config>,
    pub minciencias: Option<mergeline_minciencias::Config>,
    pub openalex: Option<mergeline_openalex::Config>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the canonical collection snapshots.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/canonical"),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./mergeline.toml (current directory)
    /// 2. ~/.config/mergeline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("mergeline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "mergeline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Highest verbosity any configured connector asks for; feeds the
    /// default log filter.
    pub fn max_verbosity(&self) -> u8 {
        [
            self.publindex.as_ref().map(|c| c.verbose),
            self.scienti.as_ref().map(|c| c.verbose),
            self.minciencias.as_ref().map(|c| c.verbose),
            self.openalex.as_ref().map(|c| c.verbose),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.store.path, PathBuf::from("./data/canonical"));
        assert!(config.publindex.is_none());
        assert_eq!(config.max_verbosity(), 1);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[store]
path = "/tmp/canonical"

[publindex]
input = "/data/journals.jsonl"
num_jobs = 4
verbose = 2

[minciencias]
input = "/data/products.jsonl"

[minciencias.thresholds]
author = 75.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.store.path, PathBuf::from("/tmp/canonical"));

        let publindex = config.publindex.as_ref().unwrap();
        assert_eq!(publindex.num_jobs, 4);

        let minciencias = config.minciencias.as_ref().unwrap();
        assert_eq!(minciencias.thresholds.author, 75.0);
        assert_eq!(minciencias.thresholds.low, 90.0);
        assert_eq!(minciencias.num_jobs, 1);

        assert!(config.scienti.is_none());
        assert_eq!(config.max_verbosity(), 2);
    }
}
