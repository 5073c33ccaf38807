use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::answer::DEFAULT_ENDPOINT;

pub const ENDPOINT_ENV: &str = "RAGCHAT_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, falling back to defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Endpoint precedence: explicit override, then `RAGCHAT_ENDPOINT`, then
    /// the config file, then the built-in default.
    pub fn resolve_endpoint(&self, cli_override: Option<&str>) -> String {
        let from_env = std::env::var(ENDPOINT_ENV).ok();
        self.endpoint_with(cli_override, from_env.as_deref())
    }

    fn endpoint_with(&self, cli_override: Option<&str>, from_env: Option<&str>) -> String {
        cli_override
            .or(from_env.filter(|v| !v.trim().is_empty()))
            .or(self.endpoint.as_deref())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

        Ok(cache_dir.join("ragchat").join("ragchat.log"))
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ragchat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            endpoint: Some("http://rag.internal:9000/api/chat".to_string()),
            log_level: Some("debug".to_string()),
            log_file: None,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_endpoint_precedence() {
        let config = Config {
            endpoint: Some("http://file/api/chat".to_string()),
            ..Config::default()
        };

        assert_eq!(
            config.endpoint_with(Some("http://cli/api/chat"), Some("http://env/api/chat")),
            "http://cli/api/chat"
        );
        assert_eq!(
            config.endpoint_with(None, Some("http://env/api/chat")),
            "http://env/api/chat"
        );
        assert_eq!(config.endpoint_with(None, Some("  ")), "http://file/api/chat");
        assert_eq!(config.endpoint_with(None, None), "http://file/api/chat");
        assert_eq!(Config::new().endpoint_with(None, None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_explicit_log_file_wins() {
        let config = Config {
            log_file: Some(PathBuf::from("/tmp/ragchat-test.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path().unwrap(), PathBuf::from("/tmp/ragchat-test.log"));
    }
}
