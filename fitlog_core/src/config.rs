//! Configuration file support for fitlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitlog/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub parser: ParserConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    /// JSONL journal holding records not yet rolled up
    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join("journal").join("workouts.jsonl")
    }

    /// CSV archive of rolled-up records
    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join("workouts.csv")
    }

    /// Registered users
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }
}

/// Workout log syntax
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParserConfig {
    #[serde(default = "default_marker")]
    pub marker: char,

    #[serde(default = "default_segment_separator")]
    pub segment_separator: char,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            segment_separator: default_segment_separator(),
        }
    }
}

impl ParserConfig {
    /// Reject syntax that would make marker lines ambiguous
    pub fn validate(&self) -> Result<()> {
        if self.marker == self.segment_separator {
            return Err(Error::Config(format!(
                "marker and segment separator must differ (both {:?})",
                self.marker
            )));
        }
        if self.marker.is_whitespace() || self.segment_separator.is_whitespace() {
            return Err(Error::Config(
                "marker and segment separator must not be whitespace".into(),
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("fitlog")
}

fn default_marker() -> char {
    '#'
}

fn default_segment_separator() -> char {
    ';'
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.parser.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("fitlog").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.parser.marker, '#');
        assert_eq!(config.parser.segment_separator, ';');
        assert!(config.data.data_dir.ends_with("fitlog"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[parser]
marker = "@"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.parser.marker, '@');
        assert_eq!(config.parser.segment_separator, ';'); // default
    }

    #[test]
    fn test_save_and_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.data.data_dir = temp_dir.path().join("data");
        config.parser.segment_separator = '|';
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.data.data_dir, temp_dir.path().join("data"));
        assert_eq!(loaded.parser.segment_separator, '|');
    }

    #[test]
    fn test_rejects_clashing_syntax() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[parser]\nmarker = \";\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_data_paths() {
        let data = DataConfig {
            data_dir: PathBuf::from("/tmp/fitlog"),
        };
        assert_eq!(
            data.journal_path(),
            PathBuf::from("/tmp/fitlog/journal/workouts.jsonl")
        );
        assert_eq!(data.archive_path(), PathBuf::from("/tmp/fitlog/workouts.csv"));
        assert_eq!(data.users_path(), PathBuf::from("/tmp/fitlog/users.json"));
    }
}
