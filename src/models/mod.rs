//! Data models module
//!
//! This module contains all data structures exchanged with the webhook backend

pub mod instance;
pub mod group;
pub mod template;
pub mod campaign;

// Re-export commonly used models
pub use instance::{Instance, NewInstance};
pub use group::{Group, GroupSettings, GroupStatistics};
pub use template::{Template, NewTemplate, Message, MessageBody, MessageKind, MediaContent};
pub use campaign::{Campaign, CampaignStatus, NewCampaign, CampaignPatch};

use serde::{Deserialize, Deserializer};

/// Accept identifiers sent either as JSON strings or numbers
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Treat an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Delay in seconds. Negative, fractional or null values saved by the editor
/// are clamped into range instead of failing the record.
pub(crate) fn clamped_delay<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    let seconds = match value {
        Some(number) => match number.as_i64() {
            Some(whole) => whole,
            None => number.as_f64().map(|f| f as i64).unwrap_or(0),
        },
        None => 0,
    };
    Ok(seconds.clamp(0, i64::from(u32::MAX)) as u32)
}
