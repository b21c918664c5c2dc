//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::cmp::Ordering;

use base64::Engine;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::utils::errors::{ZapError, Result};

/// Case-insensitive substring match used by every list filter
pub fn name_matches(name: &str, filter: &str) -> bool {
    filter.is_empty() || name.to_lowercase().contains(&filter.to_lowercase())
}

/// Alphabetical ordering that ignores case, falling back to the raw strings
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Combine a local calendar date and wall-clock time into a UTC instant
///
/// Accepts `YYYY-MM-DD` and `HH:MM` (seconds optional).
pub fn parse_schedule(date: &str, time: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| ZapError::InvalidInput(format!("Invalid date '{}': {}", date, e)))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|e| ZapError::InvalidInput(format!("Invalid time '{}': {}", time, e)))?;

    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ZapError::InvalidInput(format!("{} {} does not exist in the local timezone", date, time)))
}

/// Same wall-clock time on the next calendar day, used when duplicating a campaign
///
/// When that time does not exist tomorrow (a DST gap) the result is 24 hours
/// after `now`.
pub fn tomorrow_same_time<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Utc> {
    now.date_naive()
        .succ_opt()
        .and_then(|tomorrow| now.timezone().from_local_datetime(&tomorrow.and_time(now.time())).earliest())
        .unwrap_or_else(|| now.clone() + Duration::days(1))
        .with_timezone(&Utc)
}

/// Strip a `data:<mime>;base64,` prefix, returning the bare base64 payload
pub fn strip_data_url_prefix(data: &str) -> &str {
    match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, payload)| payload).unwrap_or(rest),
        None => data,
    }
}

/// Decoded size in bytes of a (possibly data-URL prefixed) base64 payload
pub fn decoded_len(data: &str) -> Result<usize> {
    let payload = strip_data_url_prefix(data);
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    Ok(bytes.len())
}

/// Encode raw bytes as standard base64
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Guess a MIME type from a file extension
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
