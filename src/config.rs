//! Client configuration - endpoint URLs, timeout and log location

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DEFAULT_CHATS_API, DEFAULT_LOG_FILE, DEFAULT_TIMEOUT_SECS, DEFAULT_USERS_API};

const CONFIG_FILE: &str = "config.yaml";

/// Settings read from `config.yaml` in the config directory
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User-management endpoint
    pub users_api: String,
    /// Chat-management endpoint
    pub chats_api: String,
    pub timeout_secs: u64,
    /// Log file; relative paths resolve against the config directory
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            users_api: String::from(DEFAULT_USERS_API),
            chats_api: String::from(DEFAULT_CHATS_API),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Load from `dir`; a missing file gives defaults, an unparsable one is an error
    pub fn load(dir: &Path) -> Result<Config> {
        let path = dir.join(CONFIG_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Ok(Config::default());
        };
        let config = serde_yaml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(CONFIG_FILE), serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn log_path(&self, dir: &Path) -> PathBuf {
        if self.log_file.is_absolute() {
            self.log_file.clone()
        } else {
            dir.join(&self.log_file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "users_api: http://localhost:9000/users\ntimeout_secs: 5\n").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.users_api, "http://localhost:9000/users");
        assert_eq!(config.chats_api, DEFAULT_CHATS_API);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "users_api: [unterminated").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            chats_api: "http://127.0.0.1:1/chats".into(),
            ..Config::default()
        };
        config.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_log_path_resolution() {
        let dir = Path::new("/tmp/messenger");
        let config = Config::default();
        assert_eq!(config.log_path(dir), dir.join(DEFAULT_LOG_FILE));
    }
}
