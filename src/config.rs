use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Config filename, looked up inside the data directory.
const CONFIG_FILE: &str = "devicedb.toml";

/// Store configuration resolved from a data directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the primary file, the history directory and the config file.
    pub data_dir: PathBuf,
    /// Path to the primary record file.
    pub db_path: PathBuf,
    /// Path to the snapshot history directory.
    pub history_dir: PathBuf,
    /// Path to the config file.
    pub config_path: PathBuf,
    /// User settings loaded from devicedb.toml.
    pub settings: UserSettings,
}

/// User-configurable settings from devicedb.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// HTTP server configuration.
    pub server: ServerSettings,
    /// File layout and I/O configuration.
    pub storage: StorageSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind.
    pub listen_addr: String,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".into(),
            max_body_bytes: 65_536,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Primary file name, relative to the data directory.
    pub db_file: String,
    /// History directory name, relative to the data directory.
    pub history_dir: String,
    /// Upper bound for a single store operation, in milliseconds.
    pub io_timeout_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            db_file: "db.txt".into(),
            history_dir: "history".into(),
            io_timeout_ms: 5_000,
        }
    }
}

impl Config {
    /// Create config for a given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let config_path = data_dir.join(CONFIG_FILE);
        let settings = Self::load_settings(&config_path).unwrap_or_default();
        Self::with_settings(data_dir, settings)
    }

    /// Create config from explicit settings, ignoring any config file on disk.
    pub fn with_settings(data_dir: impl Into<PathBuf>, settings: UserSettings) -> Self {
        let data_dir = data_dir.into();
        let config_path = data_dir.join(CONFIG_FILE);
        let db_path = data_dir.join(&settings.storage.db_file);
        let history_dir = data_dir.join(&settings.storage.history_dir);

        Self {
            data_dir,
            db_path,
            history_dir,
            config_path,
            settings,
        }
    }

    /// Load settings from devicedb.toml if it exists.
    fn load_settings(config_path: &Path) -> Option<UserSettings> {
        if !config_path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(config_path).ok()?;
        match toml::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %config_path.display(), "ignoring invalid config: {e}");
                None
            }
        }
    }

    /// Save current settings to devicedb.toml.
    pub fn save_settings(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let content = toml::to_string_pretty(&self.settings)
            .map_err(|e| DbError::Config(format!("failed to serialize settings: {e}")))?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Create the history directory and an empty primary file if they are absent.
    pub fn ensure_layout(&self) -> Result<()> {
        std::fs::create_dir_all(&self.history_dir)?;
        if !self.db_path.exists() {
            std::fs::write(&self.db_path, "")?;
            tracing::info!(path = %self.db_path.display(), "created empty database file");
        }
        Ok(())
    }

    /// Per-operation timeout for store calls.
    #[must_use]
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.storage.io_timeout_ms)
    }
}
