//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ZapError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_batch_config(&settings.batch)?;
    validate_trigger_config(&settings.trigger)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate webhook backend configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(ZapError::Config(
            "API base URL is required".to_string()
        ));
    }

    let url = url::Url::parse(&config.base_url)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ZapError::Config(
            format!("API base URL must be http or https, got: {}", url.scheme())
        ));
    }

    if config.token.is_empty() {
        return Err(ZapError::Config(
            "API token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate bulk operation configuration
fn validate_batch_config(config: &super::BatchConfig) -> Result<()> {
    if config.concurrency == 0 {
        return Err(ZapError::Config(
            "Batch concurrency must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate trigger configuration
fn validate_trigger_config(config: &super::TriggerConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    match &config.url {
        Some(url) if !url.is_empty() => {
            url::Url::parse(url)?;
        }
        _ => {
            return Err(ZapError::Config(
                "Trigger URL is required when the trigger is enabled".to_string()
            ));
        }
    }

    if config.interval_seconds == 0 {
        return Err(ZapError::Config(
            "Trigger interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ZapError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ZapError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
