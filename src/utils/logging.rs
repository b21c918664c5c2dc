//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the ZapCampaigns client.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{ZapError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file appender on drop and must be held
/// for as long as the process logs.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| ZapError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let guard = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "zapcampaigns.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .try_init()
                .map_err(|e| ZapError::Config(format!("Logging already initialized: {}", e)))?;
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| ZapError::Config(format!("Logging already initialized: {}", e)))?;
            None
        }
    };

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an outgoing webhook call
pub fn log_api_call(path: &str, action: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            path = path,
            action = action,
            duration_ms = duration_ms,
            "Webhook call completed"
        );
    } else {
        warn!(
            path = path,
            action = action,
            duration_ms = duration_ms,
            "Webhook call failed"
        );
    }
}

/// Log the aggregate result of a bulk operation
pub fn log_batch_result(operation: &str, succeeded: usize, failed: usize) {
    if failed == 0 {
        info!(
            operation = operation,
            succeeded = succeeded,
            "Bulk operation completed"
        );
    } else {
        warn!(
            operation = operation,
            succeeded = succeeded,
            failed = failed,
            "Bulk operation completed with errors"
        );
    }
}

/// Log group cache writes
pub fn log_cache_event(instance_id: &str, event: &str, groups: Option<usize>, details: Option<&str>) {
    debug!(
        instance_id = instance_id,
        event = event,
        groups = groups,
        details = details,
        "Group cache event"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
