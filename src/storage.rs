use crate::config::Config;
use crate::constants::CONFIG_DIR_NAME;
use crate::models::UserId;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = "session.yaml";

/// Persisted login, used to skip the auth screen on the next start
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
}

/// Manages the config directory: configuration and the saved session
pub struct Storage {
    pub config: Config,
    /// Why `config.yaml` was ignored, if it was
    pub config_error: Option<String>,
    config_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);
        Self::with_dir(config_dir)
    }

    /// Storage rooted at an explicit directory
    pub fn with_dir(config_dir: PathBuf) -> Self {
        let (config, config_error) = match Config::load(&config_dir) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(format!("{:#}", e))),
        };
        Storage {
            config,
            config_error,
            config_dir,
        }
    }

    /// Log a config file that was ignored; call once logging is set up
    pub fn report_config_error(&self) {
        if let Some(error) = &self.config_error {
            tracing::warn!(path = %self.config_path().display(), error = %error, "Invalid config, using defaults");
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        Config::path(&self.config_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.config.log_path(&self.config_dir)
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    pub fn load_session(&self) -> Option<Session> {
        let content = fs::read_to_string(self.config_dir.join(SESSION_FILE)).ok()?;
        serde_yaml::from_str(&content).ok()
    }

    pub fn save_session(&self, session: Session) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(&session)?;
        fs::write(self.config_dir.join(SESSION_FILE), content)?;
        Ok(())
    }

    pub fn clear_session(&self) -> Result<()> {
        let path = self.config_dir.join(SESSION_FILE);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::with_dir(dir.path().join("nested"));
        assert_eq!(storage.load_session(), None);

        storage.save_session(Session { user_id: 42 }).unwrap();
        assert_eq!(storage.load_session(), Some(Session { user_id: 42 }));

        storage.clear_session().unwrap();
        assert_eq!(storage.load_session(), None);
        // clearing twice is fine
        storage.clear_session().unwrap();
    }

    /// Collects formatted log output
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_config_is_reported_after_logging_starts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(Config::path(dir.path()), "users_api: [unterminated").unwrap();

        let storage = Storage::with_dir(dir.path().to_path_buf());
        assert_eq!(storage.config, Config::default());
        assert!(storage.config_error.is_some());

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || storage.report_config_error());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Invalid config, using defaults"));
    }

    #[test]
    fn test_valid_config_has_no_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::with_dir(dir.path().to_path_buf());
        assert!(storage.config_error.is_none());
    }

    #[test]
    fn test_corrupt_session_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "user_id: not-a-number").unwrap();
        let storage = Storage::with_dir(dir.path().to_path_buf());
        assert_eq!(storage.load_session(), None);
    }
}
