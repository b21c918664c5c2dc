//! Error handling for ZapCampaigns
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for ZapCampaigns
#[derive(Error, Debug)]
pub enum ZapError {
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Instance not found: {instance_id}")]
    InstanceNotFound { instance_id: String },

    #[error("Template not found: {template_id}")]
    TemplateNotFound { template_id: String },

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Media encoding error: {0}")]
    MediaEncoding(#[from] base64::DecodeError),
}

/// Failures reported by, or while talking to, the webhook backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    RequestFailed(String),

    #[error("webhook request timed out")]
    Timeout,

    #[error("webhook backend unavailable")]
    ServiceUnavailable,

    #[error("webhook rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid webhook response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for ZapCampaigns operations
pub type Result<T> = std::result::Result<T, ZapError>;

/// Result type alias for raw webhook operations
pub type WebhookResult<T> = std::result::Result<T, WebhookError>;

impl ZapError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ZapError::Webhook(WebhookError::Timeout) => true,
            ZapError::Webhook(WebhookError::ServiceUnavailable) => true,
            ZapError::Webhook(WebhookError::RequestFailed(_)) => true,
            ZapError::Webhook(WebhookError::Rejected { status, .. }) => *status >= 500,
            ZapError::Webhook(WebhookError::InvalidResponse(_)) => false,
            ZapError::Config(_) => false,
            ZapError::ConfigSource(_) => false,
            ZapError::Authentication(_) => false,
            ZapError::InstanceNotFound { .. } => false,
            ZapError::TemplateNotFound { .. } => false,
            ZapError::GroupNotFound { .. } => false,
            ZapError::InvalidInput(_) => false,
            ZapError::Http(_) => true,
            ZapError::Serialization(_) => false,
            ZapError::Io(_) => true,
            ZapError::UrlParse(_) => false,
            ZapError::MediaEncoding(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ZapError::Config(_) => ErrorSeverity::Critical,
            ZapError::ConfigSource(_) => ErrorSeverity::Critical,
            ZapError::Authentication(_) => ErrorSeverity::Warning,
            ZapError::InvalidInput(_) => ErrorSeverity::Info,
            ZapError::MediaEncoding(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Message suitable for showing to an operator
    ///
    /// Backend rejections carry the backend's own message; everything else
    /// falls back to the error's display text.
    pub fn user_message(&self) -> String {
        match self {
            ZapError::Webhook(WebhookError::Rejected { message, .. }) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_server_errors_are_recoverable() {
        let err = ZapError::Webhook(WebhookError::Rejected { status: 502, message: "bad gateway".to_string() });
        assert!(err.is_recoverable());

        let err = ZapError::Webhook(WebhookError::Rejected { status: 400, message: "bad".to_string() });
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_message_prefers_backend_message() {
        let err = ZapError::Webhook(WebhookError::Rejected { status: 400, message: "Grupo não encontrado".to_string() });
        assert_eq!(err.user_message(), "Grupo não encontrado");

        let err = ZapError::InvalidInput("select at least one group".to_string());
        assert_eq!(err.user_message(), "Invalid input: select at least one group");
    }

    #[test]
    fn test_severity() {
        assert_eq!(ZapError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(ZapError::InvalidInput("x".into()).severity(), ErrorSeverity::Info);
        assert_eq!(ZapError::Webhook(WebhookError::Timeout).severity(), ErrorSeverity::Error);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }
}
