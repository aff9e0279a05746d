//! Configuration infrastructure
//!
//! Configuration is layered, lowest priority first:
//! 1. Built-in defaults (see [`defaults`])
//! 2. The JSON config file (`config.json` in the user config directory)
//! 3. `IMEI_BLACKBIRD__<SECTION>__<KEY>` environment variables

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "IMEI_BLACKBIRD";

/// Separator between prefix, section and key in environment overrides
pub const ENV_SEPARATOR: &str = "__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Online validation provider
    pub provider: ProviderConfig,

    /// Where the template list lives
    pub storage: StorageConfig,

    /// Batch generation limits
    pub generation: GenerationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Validation provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Scheme and host of the lookup site; `/imei/info/{imei}` is appended
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    pub user_agent: String,

    /// HTML markers inspected on each response
    pub markers: MarkerConfig,
}

/// CSS selectors and phrases that classify a lookup response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub invalid_selector: String,
    pub invalid_phrase: String,
    pub valid_selector: String,
    pub valid_phrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the template list
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Count used by `generate` when none is given
    pub default_count: usize,

    /// Upper bound for a single `generate` request
    pub max_count: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output (stderr)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` under the local data dir
    pub log_dir: Option<PathBuf>,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            markers: MarkerConfig::default(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            invalid_selector: defaults::INVALID_SELECTOR.to_string(),
            invalid_phrase: defaults::INVALID_PHRASE.to_string(),
            valid_selector: defaults::VALID_SELECTOR.to_string(),
            valid_phrase: defaults::VALID_PHRASE.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(defaults::DATA_FILE),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_count: defaults::GENERATE_COUNT,
            max_count: defaults::MAX_GENERATE_COUNT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_filters = HashMap::new();
        module_filters.insert("reqwest".to_string(), "warn".to_string());
        module_filters.insert("hyper".to_string(), "warn".to_string());
        module_filters.insert("h2".to_string(), "warn".to_string());

        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            max_files: defaults::MAX_LOG_FILES,
            auto_cleanup_logs: true,
            module_filters,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `path` (if it exists), then environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_sources(path, None)
    }

    /// Like [`from_file`](Self::from_file) with an explicit environment map
    /// instead of the process environment
    pub fn from_sources(path: &Path, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "provider.timeout_seconds must be greater than 0".to_string(),
            });
        }

        match url::Url::parse(&self.provider.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Validation {
                    message: format!("provider.base_url has unsupported scheme '{}'", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Validation {
                    message: format!("provider.base_url '{}' is not a URL: {}", self.provider.base_url, e),
                });
            }
        }

        let markers = &self.provider.markers;
        for (name, value) in [
            ("invalid_selector", &markers.invalid_selector),
            ("invalid_phrase", &markers.invalid_phrase),
            ("valid_selector", &markers.valid_selector),
            ("valid_phrase", &markers.valid_phrase),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    message: format!("provider.markers.{} must not be empty", name),
                });
            }
        }

        let generation = &self.generation;
        if generation.max_count == 0 {
            return Err(ConfigError::Validation {
                message: "generation.max_count must be greater than 0".to_string(),
            });
        }
        if generation.default_count == 0 || generation.default_count > generation.max_count {
            return Err(ConfigError::Validation {
                message: format!(
                    "generation.default_count must be between 1 and {}",
                    generation.max_count
                ),
            });
        }

        if self.storage.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                message: "storage.data_file must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Locates, creates and loads the configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Get application data directory
    pub fn get_app_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(data_dir)
    }

    /// Manager for the config file in the user config directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE);
        Ok(Self { config_path })
    }

    /// Manager for an explicit config file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Writes the defaults on first run, then loads the layered configuration.
    ///
    /// Runs before logging is set up, so what happened is reported through
    /// [`LoadedConfig`] instead of log lines.
    pub async fn initialize_on_first_run(&self) -> Result<LoadedConfig> {
        let exists = fs::try_exists(&self.config_path)
            .await
            .with_context(|| format!("Failed to check configuration file {:?}", self.config_path))?;
        if exists {
            return self.load_config();
        }

        if let Some(config_dir) = self.config_path.parent() {
            if !config_dir.as_os_str().is_empty() {
                fs::create_dir_all(config_dir)
                    .await
                    .context("Failed to create config directory")?;
            }
        }
        self.save_config(&AppConfig::default()).await?;
        let mut loaded = self.load_config()?;
        loaded.created = true;
        Ok(loaded)
    }

    /// Loads defaults, the config file and environment overrides
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let config = AppConfig::from_file(&self.config_path)
            .with_context(|| format!("Failed to load configuration from {:?}", self.config_path))?;
        Ok(LoadedConfig {
            config,
            path: self.config_path.clone(),
            created: false,
        })
    }

    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .with_context(|| format!("Failed to write configuration to {:?}", self.config_path))?;
        Ok(())
    }
}

/// Configuration plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    /// Defaults were written because no file existed
    pub created: bool,
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the user config/data directories
    pub const APP_DIR_NAME: &str = "imei-blackbird";

    pub const CONFIG_FILE: &str = "config.json";

    /// Template list file, relative to the working directory
    pub const DATA_FILE: &str = "models_data.json";

    pub const BASE_URL: &str = "https://swappa.com";

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const USER_AGENT: &str = concat!("imei-blackbird/", env!("CARGO_PKG_VERSION"));

    pub const INVALID_SELECTOR: &str = "div.alert.alert-error.alert-dismissible.fade.show.alert-danger";

    pub const INVALID_PHRASE: &str = "Invalid IMEI or TAC number";

    pub const VALID_SELECTOR: &str = "div.alert.alert-success.text-center";

    pub const VALID_PHRASE: &str = "Allowed.";

    pub const GENERATE_COUNT: usize = 10;

    pub const MAX_GENERATE_COUNT: usize = 100;

    pub const MAX_LOG_FILES: u32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.timeout_seconds, 30);
        assert_eq!(config.generation.default_count, 10);
        assert_eq!(config.generation.max_count, 100);
        assert_eq!(config.storage.data_file, PathBuf::from("models_data.json"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.provider.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider.base_url = "ftp://swappa.com".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.generation.default_count = 101;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider.markers.valid_phrase = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config =
            AppConfig::from_sources(&dir.path().join("absent.json"), Some(HashMap::new())).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "provider": { "timeout_seconds": 5 }, "generation": { "default_count": 3 } }"#,
        )
        .unwrap();

        let config = AppConfig::from_sources(&path, Some(HashMap::new())).unwrap();
        assert_eq!(config.provider.timeout_seconds, 5);
        assert_eq!(config.provider.base_url, defaults::BASE_URL);
        assert_eq!(config.generation.default_count, 3);
        assert_eq!(config.generation.max_count, 100);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "provider": { "timeout_seconds": 5 } }"#).unwrap();

        let env = HashMap::from([
            (
                "IMEI_BLACKBIRD__PROVIDER__TIMEOUT_SECONDS".to_string(),
                "12".to_string(),
            ),
            (
                "IMEI_BLACKBIRD__PROVIDER__BASE_URL".to_string(),
                "http://localhost:8080".to_string(),
            ),
        ]);
        let config = AppConfig::from_sources(&path, Some(env)).unwrap();
        assert_eq!(config.provider.timeout_seconds, 12);
        assert_eq!(config.provider.base_url, "http://localhost:8080");
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "provider": { "timeout_seconds": 0 } }"#).unwrap();
        assert!(matches!(
            AppConfig::from_sources(&path, Some(HashMap::new())),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn first_run_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));
        let loaded = manager.initialize_on_first_run().await.unwrap();
        assert!(loaded.created);
        assert!(manager.config_path().exists());
        assert_eq!(loaded.config.generation, GenerationConfig::default());

        let again = manager.initialize_on_first_run().await.unwrap();
        assert!(!again.created);
        assert_eq!(again.path, manager.config_path());
    }

    #[tokio::test]
    async fn unreadable_location_is_not_treated_as_first_run() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let manager = ConfigManager::with_path(blocker.join("config.json"));

        let err = manager.initialize_on_first_run().await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to check configuration file"));
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
