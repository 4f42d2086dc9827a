use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use url::Url;

/// Default local model service address
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:11434";
/// Default model identifier
pub const DEFAULT_MODEL_NAME: &str = "mistral:latest";
/// Default timeout for one model call
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Config file looked up when no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/scec.toml";

/// Connection settings for the language model service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the Ollama service
    pub endpoint_url: String,
    /// Model identifier, e.g. `mistral:latest`
    pub model_name: String,
    /// Upper bound for a single completion call
    pub timeout_ms: u64,
    /// Sampling temperature passed to the model
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language model settings
    pub model: ModelConfig,
    /// IANA zone used for times the model gives without an offset
    pub timezone: String,
    /// Extra attempts after the model service was unavailable
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further attempt
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            timezone: String::from("UTC"),
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML config file, missing keys fall back to defaults
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Override fields from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SCEC_OLLAMA_URL") {
            self.model.endpoint_url = url;
        }
        if let Some(model) = lookup("SCEC_MODEL") {
            self.model.model_name = model;
        }
        if let Some(timeout) = lookup("SCEC_TIMEOUT_MS") {
            self.model.timeout_ms = timeout
                .parse::<u64>()
                .map_err(|_| env_error("SCEC_TIMEOUT_MS"))?;
        }
        if let Some(timezone) = lookup("SCEC_TIMEZONE") {
            self.timezone = timezone;
        }
        if let Some(retries) = lookup("SCEC_MAX_RETRIES") {
            self.max_retries = retries
                .parse::<u32>()
                .map_err(|_| env_error("SCEC_MAX_RETRIES"))?;
        }
        Ok(())
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> AppResult<()> {
        let url = Url::parse(&self.model.endpoint_url).map_err(|e| {
            config_error(&format!(
                "Invalid model endpoint URL '{}': {}",
                self.model.endpoint_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(config_error("Model endpoint URL must use http or https"));
        }
        if self.model.model_name.trim().is_empty() {
            return Err(config_error("Model name must not be empty"));
        }
        if self.model.timeout_ms == 0 {
            return Err(config_error("Model timeout must be greater than zero"));
        }
        self.tz()?;
        Ok(())
    }

    /// The configured timezone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone '{}'", self.timezone)))
    }
}
