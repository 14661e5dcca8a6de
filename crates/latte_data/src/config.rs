//! Master-data configuration
//!
//! Says where the data directory is and which file backs each domain.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `LATTE_DATA_DIR`, `LATTE_HOT_RELOAD`
//! 2. Config file: `latte.toml` or `config/latte.toml`
//! 3. Built-in defaults (no sources assigned)
//!
//! # Example Config File
//!
//! ```toml
//! [master_data]
//! data_dir = "Content/Data"
//! hot_reload = true
//!
//! [master_data.sources]
//! hit_stop = "DT_HitStop.json"
//! knockback = "DT_Knockback.json"
//! character_info = "DT_CharacterInfo.json"
//! character_asset = "DT_CharacterAsset.toml"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Files searched by [`DataConfig::load`]
pub const CONFIG_PATHS: [&str; 2] = ["latte.toml", "config/latte.toml"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Source file per built-in domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    pub hit_stop: Option<String>,
    pub knockback: Option<String>,
    pub character_info: Option<String>,
    pub character_asset: Option<String>,
}

/// Master-data configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory relative source paths are resolved against
    pub data_dir: PathBuf,
    /// Watch the data directory and reload changed tables
    pub hot_reload: bool,
    /// Source file per domain
    pub sources: SourcePaths,
    /// Config file this was read from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            hot_reload: false,
            sources: SourcePaths::default(),
            config_path: None,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    master_data: DataConfig,
}

impl DataConfig {
    /// Load configuration from all sources
    pub fn load() -> Self {
        let mut config = CONFIG_PATHS
            .iter()
            .find_map(|path| match Self::from_file(path) {
                Ok(config) => {
                    log::info!("Loaded master-data config from {}", path);
                    Some(config)
                }
                Err(ConfigError::Io { .. }) => None,
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path, e);
                    None
                }
            })
            .unwrap_or_default();

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.master_data)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var("LATTE_DATA_DIR").filter(|d| !d.is_empty()) {
            log::info!("Data directory from env: {}", dir);
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(value) = var("LATTE_HOT_RELOAD") {
            self.hot_reload = matches!(value.to_lowercase().as_str(), "1" | "true" | "on");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_config() {
        let config = DataConfig::from_toml(
            r#"
            [master_data]
            data_dir = "Content/Data"
            hot_reload = true

            [master_data.sources]
            hit_stop = "DT_HitStop.json"
            character_asset = "DT_CharacterAsset.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("Content/Data"));
        assert!(config.hot_reload);
        assert_eq!(config.sources.hit_stop.as_deref(), Some("DT_HitStop.json"));
        assert_eq!(config.sources.knockback, None);
        assert_eq!(config.sources.character_asset.as_deref(), Some("DT_CharacterAsset.toml"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DataConfig::from_toml("").unwrap();
        assert_eq!(config, DataConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let result = DataConfig::from_toml("[master_data]\nhot_reload = \"maybe\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            [("LATTE_DATA_DIR", "/srv/data"), ("LATTE_HOT_RELOAD", "TRUE")].into_iter().collect();

        let mut config = DataConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert!(config.hot_reload);
    }

    #[test]
    fn test_from_file_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latte.toml");
        std::fs::write(&path, "[master_data]\ndata_dir = \"tables\"\n").unwrap();

        let config = DataConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("tables"));
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));

        assert!(matches!(
            DataConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
