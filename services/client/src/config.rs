//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use tracing::Level;

pub const DEFAULT_QUERY_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PINNING_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs/";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub query_api_url: Url,
    pub pinning_url: Url,
    /// Always ends with `/`, so a content hash can be appended directly.
    pub gateway_url: String,
    pub pinata_api_key: Option<String>,
    pub pinata_secret_key: Option<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let query_api_url = parse_url(
            "QUERY_API_URL",
            lookup("QUERY_API_URL").unwrap_or_else(|| DEFAULT_QUERY_API_URL.to_string()),
        )?;
        let pinning_url = parse_url(
            "PINATA_API_URL",
            lookup("PINATA_API_URL").unwrap_or_else(|| DEFAULT_PINNING_URL.to_string()),
        )?;

        let mut gateway_url = parse_url(
            "PINATA_GATEWAY_URL",
            lookup("PINATA_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
        )?
        .to_string();
        if !gateway_url.ends_with('/') {
            gateway_url.push('/');
        }

        // --- Pinning credentials are only needed by the share command ---
        let pinata_api_key = lookup("PINATA_API_KEY").filter(|v| !v.is_empty());
        let pinata_secret_key = lookup("PINATA_SECRET_KEY").filter(|v| !v.is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            query_api_url,
            pinning_url,
            gateway_url,
            pinata_api_key,
            pinata_secret_key,
            log_level,
        })
    }

    /// Returns both pinning credentials, or the name of the first one that is missing.
    pub fn pinata_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let api_key = self
            .pinata_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("PINATA_API_KEY".to_string()))?;
        let secret_key = self
            .pinata_secret_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("PINATA_SECRET_KEY".to_string()))?;
        Ok((api_key, secret_key))
    }
}

fn parse_url(var: &str, value: String) -> Result<Url, ConfigError> {
    Url::parse(&value).map_err(|e| ConfigError::InvalidValue(var.to_string(), e.to_string()))
}
