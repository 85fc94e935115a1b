use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::sync::{DeletePolicy, SyncOptions, DEFAULT_PAGE_SIZE};

/// Source of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_true() -> bool {
    true
}

fn mask_token<S: Serializer>(token: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match token {
        Some(_) => serializer.serialize_some("********"),
        None => serializer.serialize_none(),
    }
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Server URL (e.g., "http://localhost:8080")
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token sent with every request
    #[serde(default, serialize_with = "mask_token")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Returns true if a server URL is set
    pub fn is_configured(&self) -> bool {
        self.base_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Cache sync settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Sync in the background on first read (default: true)
    #[serde(default = "default_true")]
    pub auto_sync: bool,
    /// Let the next read retry a failed first sync (default: false)
    #[serde(default)]
    pub retry_failed_initial_sync: bool,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            auto_sync: true,
            retry_failed_initial_sync: false,
            delete_policy: DeletePolicy::default(),
        }
    }
}

impl SyncConfig {
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            page_size: self.page_size,
            auto_sync: self.auto_sync,
            retry_failed_initial_sync: self.retry_failed_initial_sync,
            delete_policy: self.delete_policy,
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite cache
    pub database_path: ConfigValue<PathBuf>,
    pub api: ConfigValue<ApiConfig>,
    pub sync: ConfigValue<SyncConfig>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    api: Option<ApiConfig>,
    sync: Option<SyncConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`], reading environment variables through `env`.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("cache.db"),
            ConfigSource::Default,
        );
        let mut api = ConfigValue::new(ApiConfig::default(), ConfigSource::Default);
        let mut sync = ConfigValue::new(SyncConfig::default(), ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                database_path =
                    ConfigValue::new(resolve_relative(&path, db_path), ConfigSource::File);
            }
            if let Some(api_config) = file_config.api {
                api = ConfigValue::new(api_config, ConfigSource::File);
            }
            if let Some(sync_config) = file_config.sync {
                sync = ConfigValue::new(sync_config, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Some(db_path) = env("COMPRARTIR_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Some(url) = env("COMPRARTIR_API_URL") {
            api.value.base_url = Some(url);
            api.source = ConfigSource::Environment;
        }
        if let Some(token) = env("COMPRARTIR_API_TOKEN") {
            api.value.token = Some(token);
            api.source = ConfigSource::Environment;
        }
        if let Some(raw) = env("COMPRARTIR_PAGE_SIZE") {
            sync.value.page_size = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("COMPRARTIR_PAGE_SIZE", raw.clone()))?;
            sync.source = ConfigSource::Environment;
        }

        if sync.value.page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "sync.page_size",
                "0".to_string(),
            ));
        }

        Ok(Self {
            database_path,
            api,
            sync,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/comprartir/
    /// - macOS: ~/Library/Application Support/comprartir/
    /// - Windows: %APPDATA%/comprartir/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("comprartir")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/comprartir/
    /// - macOS: ~/Library/Application Support/comprartir/
    /// - Windows: %APPDATA%/comprartir/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("comprartir")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Resolves a relative path against the config file's directory
fn resolve_relative(config_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&path))
            .unwrap_or(path)
    } else {
        path
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
