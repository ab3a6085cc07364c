use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::output::OutputMode;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub output: OutputMode,
    pub reveal_delay_ms: u64,
    pub notification_secs: u64,
    pub placeholder_secs: u64,
    pub clipboard_probe: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputMode::Report,
            reveal_delay_ms: 100,
            notification_secs: 5,
            placeholder_secs: 3,
            clipboard_probe: true,
        }
    }
}

impl Config {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn placeholder_period(&self) -> Duration {
        Duration::from_secs(self.placeholder_secs.max(1))
    }

    /// Reads `explicit` if given, otherwise the first existing file among the
    /// default locations. No file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::read(path);
        }

        for path in config_paths() {
            if path.exists() {
                return Self::read(&path);
            }
        }

        log::debug!("no config file found, using defaults");
        Ok(Config::default())
    }

    fn read(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }
}

pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Project-local: ./.qb/config.json
    paths.push(PathBuf::from(".qb").join("config.json"));

    // 2. User config: ~/.config/qb/config.json
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("qb").join("config.json"));
    }

    paths
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "output": "json",
            "reveal_delay_ms": 250,
            "clipboard_probe": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.output, OutputMode::Json);
        assert_eq!(config.reveal_delay(), Duration::from_millis(250));
        assert!(!config.clipboard_probe);
        assert_eq!(config.notification_secs, 5);
        assert_eq!(config.placeholder_secs, 3);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_placeholder_period_never_zero() {
        let config = Config {
            placeholder_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.placeholder_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
