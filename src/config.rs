//! Configuration management for sealnote

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default import size limit: 3 MiB
pub const DEFAULT_IMPORT_SIZE_LIMIT: u64 = 3 * 1024 * 1024;

/// Default sled page cache: 64 MiB
pub const DEFAULT_CACHE_CAPACITY: u64 = 64 * 1024 * 1024;

/// Store location and engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the store
    pub path: PathBuf,

    /// Sled page cache size in bytes
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Background flush interval. `None` runs no flusher thread and flushes
    /// on close only; a flusher can hold the store lock briefly after close.
    #[serde(default)]
    pub flush_every_ms: Option<u64>,
}

fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY
}

impl StoreConfig {
    /// Engine configuration for this store
    pub fn sled_config(&self) -> sled::Config {
        sled::Config::new()
            .path(&self.path)
            .cache_capacity(self.cache_capacity)
            .flush_every_ms(self.flush_every_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sealnote");

        StoreConfig {
            path: data_dir.join("notes.db"),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            flush_every_ms: None,
        }
    }
}

/// Import/export limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Largest file accepted by import, in bytes
    pub import_size_limit: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            import_size_limit: DEFAULT_IMPORT_SIZE_LIMIT,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Import/export configuration
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sealnote")
            .join("config.json")
    }

    /// Load configuration from a file, with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration if the file exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON after `${VAR}` substitution
    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Replace `${VAR}` with the value of the environment variable, or nothing
    fn substitute_env_vars(content: &str) -> String {
        let re = match Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };

        re.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("SEALNOTE_STORE") {
            let path = path.trim();
            if !path.is_empty() {
                self.store.path = PathBuf::from(path);
            }
        }

        if let Ok(level) = std::env::var("SEALNOTE_LOG_LEVEL") {
            let level = level.trim().to_string();
            if !level.is_empty() {
                self.logging.level = level;
            }
        }

        if let Ok(limit) = std::env::var("SEALNOTE_IMPORT_LIMIT") {
            if let Ok(limit) = limit.trim().parse::<u64>() {
                self.transfer.import_size_limit = limit;
            }
        }
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            Error::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| {
            Error::Configuration(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(Error::Configuration("Store path is required".to_string()));
        }

        if self.transfer.import_size_limit == 0 {
            return Err(Error::Configuration(
                "Import size limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Ensure the store's parent directory exists
    pub fn ensure_directories(&self) -> Result<()> {
        if let Some(parent) = self.store.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transfer.import_size_limit, DEFAULT_IMPORT_SIZE_LIMIT);
        assert!(config.store.path.ends_with("sealnote/notes.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse(r#"{ "store": { "path": "/tmp/notes.db" } }"#).unwrap();

        assert_eq!(config.store.path, PathBuf::from("/tmp/notes.db"));
        assert_eq!(config.store.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.store.flush_every_ms, None);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("SEALNOTE_TEST_DIR", "/srv/secret");
        let config =
            Config::parse(r#"{ "store": { "path": "${SEALNOTE_TEST_DIR}/notes.db" } }"#).unwrap();

        assert_eq!(config.store.path, PathBuf::from("/srv/secret/notes.db"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = Config::default();
        config.transfer.import_size_limit = 0;

        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(Config::parse("{ not json"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.store.path = dir.path().join("notes.db");
        config.store.flush_every_ms = Some(250);
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.store.flush_every_ms, Some(250));
        assert_eq!(loaded.transfer.import_size_limit, config.transfer.import_size_limit);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.json")).unwrap();
        assert!(config.validate().is_ok());
    }
}
