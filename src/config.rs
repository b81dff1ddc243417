//! Configuration with validation at startup.

use std::time::Duration;

use clap::Parser;
use secrecy::{ExposeSecret, SecretString};

/// Settings file loaded into the environment before parsing.
pub const DEFAULT_SETTINGS_FILE: &str = "defaults.conf";

/// Phonebook gateway configuration.
///
/// All values can be set in the settings file, via environment variables,
/// or as CLI arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "phonebook-gateway", about = "Phonebook directory gateway")]
pub struct Config {
    /// Server listen address
    #[arg(long, env = "LISTEN_ADDRESS", default_value = "0.0.0.0:5000")]
    pub listen_address: String,

    /// Upstream API base URL (endpoint paths are appended verbatim)
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: String,

    /// Login endpoint path, relative to the base URL
    #[arg(long, env = "LOGIN_ENDPOINT")]
    pub login_endpoint: String,

    /// List-users endpoint path, relative to the base URL
    #[arg(long, env = "LIST_USERS_ENDPOINT")]
    pub list_users_endpoint: String,

    /// List-devices endpoint path, relative to the base URL
    #[arg(long, env = "LIST_DEVICES_ENDPOINT", default_value = "devices")]
    pub list_devices_endpoint: String,

    /// Account ID sent as the X-Account-Id header
    #[arg(long, env = "ACCOUNT_ID")]
    pub account_id: String,

    /// Service account username for upstream login
    #[arg(long, env = "API_USERNAME")]
    pub username: String,

    /// Service account password for upstream login
    #[arg(long, env = "API_PASSWORD")]
    pub password: SecretString,

    /// Account domain for upstream login
    #[arg(long, env = "API_DOMAIN")]
    pub domain: String,

    /// Platform domain appended to the account domain in SIP URIs
    #[arg(long, env = "PLATFORM_DOMAIN", default_value = "mobileuc.co.za")]
    pub platform_domain: String,

    /// WebSocket URL handed to provisioned SIP devices
    #[arg(long, env = "WSS_URL", default_value = "wss://mobileuc.co.za:5065")]
    pub wss_url: String,

    /// Path to the static dashboard page served at /
    #[arg(long, env = "INDEX_PATH", default_value = "index.html")]
    pub index_path: String,

    /// Outbound request timeout in seconds
    #[arg(long, env = "OUTBOUND_TIMEOUT_SECS", default_value = "10")]
    pub outbound_timeout_secs: u64,

    /// CORS allowed origins (comma-separated, or "*" for any)
    #[arg(long, env = "CORS_ALLOW_ORIGINS")]
    pub cors_allow_origins: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Use JSON log format
    #[arg(long, env = "JSON_LOGS", default_value = "false")]
    pub json_logs: bool,
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API base URL must start with http:// or https://")]
    InvalidBaseUrl,
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("Outbound timeout must be > 0")]
    InvalidTimeout,
}

impl Config {
    /// Load the settings file, then parse and validate configuration.
    ///
    /// The settings file (dotenv syntax) is required: a missing file is a
    /// startup failure, matching the original deployment. Its path can be
    /// overridden with `SETTINGS_FILE`.
    pub fn init() -> anyhow::Result<Self> {
        let path =
            std::env::var("SETTINGS_FILE").unwrap_or_else(|_| DEFAULT_SETTINGS_FILE.to_string());
        dotenvy::from_path(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load settings file {path}: {e}"))?;

        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidBaseUrl);
        }
        for (name, value) in [
            ("Login endpoint", &self.login_endpoint),
            ("List-users endpoint", &self.list_users_endpoint),
            ("List-devices endpoint", &self.list_devices_endpoint),
            ("Account ID", &self.account_id),
            ("Username", &self.username),
            ("Domain", &self.domain),
            ("Platform domain", &self.platform_domain),
            ("WSS URL", &self.wss_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(name));
            }
        }
        if self.password.expose_secret().is_empty() {
            return Err(ConfigError::EmptyField("Password"));
        }
        if self.outbound_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Get the outbound request timeout as Duration.
    #[inline]
    pub const fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound_timeout_secs)
    }
}
