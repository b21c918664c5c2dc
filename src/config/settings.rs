//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Default webhook host of the automation backend
pub const DEFAULT_API_URL: &str = "https://aplicativos-n8n.m23la1.easypanel.host";

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Webhook backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Static bearer token sent with every request
    pub token: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Group cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub preload_on_start: bool,
}

/// Bulk operation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum in-flight calls per bulk operation; 1 runs items sequentially
    pub concurrency: usize,
}

/// Periodic backend trigger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub enabled: bool,
    pub url: Option<String>,
    pub interval_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily rolling log file; stdout-only when unset
    pub file_path: Option<String>,
}

fn default_user_agent() -> String {
    format!("ZapCampaigns/{}", env!("CARGO_PKG_VERSION"))
}

impl Settings {
    /// Load settings from configuration file and environment variables
    ///
    /// Environment variables use the `ZAPCAMPAIGNS` prefix with `__` as the
    /// section separator, e.g. `ZAPCAMPAIGNS__API__TOKEN`.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a specific file (extension optional) plus the environment
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Settings::default();
        let settings = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.token", defaults.api.token)?
            .set_default("api.user_agent", defaults.api.user_agent)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("ZAPCAMPAIGNS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ZapError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                token: String::new(),
                user_agent: default_user_agent(),
            },
            cache: CacheConfig::default(),
            batch: BatchConfig::default(),
            trigger: TriggerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { preload_on_start: true }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            interval_seconds: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
        }
    }
}
