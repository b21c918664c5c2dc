//! ZapCampaigns
//!
//! Client library for a WhatsApp group-messaging automation backend reached
//! through HTTP webhooks. It manages instances, message templates, groups and
//! scheduled campaigns, keeps a per-instance group cache and runs bulk
//! operations with per-item outcomes.

#![allow(non_snake_case)]

pub mod config;
pub mod services;
pub mod models;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ZapError, WebhookError, Result};

// Re-export main components for easy access
pub use services::ServiceFactory;
pub use state::{GroupCache, GroupEntry, Selection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
