//! Configuration loading, validation, and management for datadesk.
//!
//! Loads configuration from `~/.datadesk/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The system instruction sent with every model turn unless overridden.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful data assistant. You have access to tools for:\n\
1. get_employees - employee records from a CSV file\n\
2. get_products - product records from a CSV file\n\
3. get_countries / get_currency_by_country - country and currency reference data\n\
4. get_exchange_rate / convert_currency - live exchange rates relative to USD\n\
5. get_weather - current weather from the public Open-Meteo API\n\n\
Always use the appropriate tool to answer the user's question. \
Present results in a clear, readable format.";

/// The root configuration structure.
///
/// Maps directly to `~/.datadesk/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Anthropic API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Model round-trips allowed per conversation
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Replaces [`DEFAULT_SYSTEM_PROMPT`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Override for the Anthropic API base URL (proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_base_url: Option<String>,

    /// CSV data files
    #[serde(default)]
    pub data: DataConfig,

    /// Public REST endpoints
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_max_iterations() -> u32 {
    10
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "api_key",
                &match self.api_key {
                    Some(_) => "[REDACTED]",
                    None => "None",
                },
            )
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_iterations", &self.max_iterations)
            .field("system_prompt", &self.system_prompt)
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("data", &self.data)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Where the CSV-backed tools read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Base directory; file names below are relative to it
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_employees_file")]
    pub employees_file: String,

    #[serde(default = "default_products_file")]
    pub products_file: String,

    #[serde(default = "default_countries_file")]
    pub countries_file: String,

    #[serde(default = "default_country_currency_file")]
    pub country_currency_file: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_employees_file() -> String {
    "employees.csv".into()
}
fn default_products_file() -> String {
    "products.csv".into()
}
fn default_countries_file() -> String {
    "countries.csv".into()
}
fn default_country_currency_file() -> String {
    "country_currency.csv".into()
}

impl DataConfig {
    pub fn employees_path(&self) -> PathBuf {
        self.dir.join(&self.employees_file)
    }

    pub fn products_path(&self) -> PathBuf {
        self.dir.join(&self.products_file)
    }

    pub fn countries_path(&self) -> PathBuf {
        self.dir.join(&self.countries_file)
    }

    pub fn country_currency_path(&self) -> PathBuf {
        self.dir.join(&self.country_currency_file)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            employees_file: default_employees_file(),
            products_file: default_products_file(),
            countries_file: default_countries_file(),
            country_currency_file: default_country_currency_file(),
        }
    }
}

/// Base URLs of the public APIs behind the weather and exchange-rate tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    #[serde(default = "default_exchange_rates_url")]
    pub exchange_rates_url: String,

    /// Per-request timeout for tool HTTP calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".into()
}
fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".into()
}
fn default_exchange_rates_url() -> String {
    "https://open.er-api.com/v6/latest/USD".into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            exchange_rates_url: default_exchange_rates_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or the default location when `None`.
    ///
    /// Environment variables take precedence over the file:
    /// - `LLM_API_KEY`, then `ANTHROPIC_API_KEY`
    /// - `LLM_MODEL`
    /// - `DATADESK_DATA_DIR`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("LLM_API_KEY").or_else(|| var("ANTHROPIC_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = var("LLM_MODEL") {
            self.model = model;
        }
        if let Some(dir) = var("DATADESK_DATA_DIR") {
            self.data.dir = PathBuf::from(dir);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".datadesk")
    }

    /// Default config file location.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 1.0".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be at least 1".into(),
            ));
        }
        if self.endpoints.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "endpoints.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The API key, or a configuration error naming where to put one.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// The effective system instruction.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// Generate a default config TOML string (for `init`).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            max_iterations: default_max_iterations(),
            system_prompt: None,
            anthropic_base_url: None,
            data: DataConfig::default(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured. Set LLM_API_KEY or add api_key to the config file")]
    MissingApiKey,
}
