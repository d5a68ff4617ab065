//! Configuration module for bookmatch
//!
//! Manages application configuration: where the local store lives, which
//! catalog to browse and how browse sessions behave. Configuration is stored
//! in the user's config directory; `BOOKMATCH_*` environment variables
//! override file values (nested keys use `__`, e.g.
//! `BOOKMATCH_BROWSE__UNDO_TIMEOUT_MS=5000`).

mod setup;

pub use setup::first_time_setup;

use crate::catalog::OpenLibraryCatalog;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Catalog settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the Open Library compatible API
    pub base_url: String,
    /// Books requested per page
    pub page_size: usize,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Browse this JSON catalog file instead of the network
    pub offline_file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: OpenLibraryCatalog::DEFAULT_BASE_URL.to_string(),
            page_size: 20,
            timeout_secs: 15,
            offline_file: None,
        }
    }
}

/// Browse session settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BrowseConfig {
    /// Fetch the next page once this many books are left
    pub prefetch_threshold: usize,
    /// How long a decision can be undone, in milliseconds
    pub undo_timeout_ms: u64,
    /// Worker threads for catalog fetches
    pub fetch_threads: usize,
    /// Genre opened when `explore` is run without one
    pub default_genre: Option<String>,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            prefetch_threshold: 5,
            undo_timeout_ms: 3_000,
            fetch_threads: 2,
            default_genre: None,
        }
    }
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BookmatchConfig {
    /// Location of the local store; the data directory is used when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub browse: BrowseConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for BookmatchConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            quiet: false,
            log_level: default_log_level(),
            catalog: CatalogConfig::default(),
            browse: BrowseConfig::default(),
        }
    }
}

impl BookmatchConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("bookmatch").join("config.toml"))
    }

    /// Default directory for the local store
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system data directory cannot be determined.
    pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
        dirs::data_local_dir()
            .map(|dir| dir.join("bookmatch"))
            .ok_or_else(|| ConfigError::Message("Could not determine data directory".to_string()))
    }

    /// Load configuration from the default location, creating it if missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, applying environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or does not deserialize.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix("BOOKMATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config path cannot be determined or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        fs::write(path, self.to_toml()?)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Render the configuration as it would be saved
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration cannot be serialized.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))
    }

    /// Load configuration, running first-time setup if config doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the configuration fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            first_time_setup()
        }
    }

    /// Where the local store lives, falling back to the data directory
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no path is configured and the data directory
    /// cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join("db")),
        }
    }
}
