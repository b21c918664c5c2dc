//! Message sending service
//!
//! Immediate (non-scheduled) delivery of message lists to groups. The backend
//! honours each message's delay; this service only validates and submits.

use std::path::Path;

use tracing::{info, warn};

use crate::models::{MediaContent, Message, MessageBody};
use crate::services::batch::{run_batch, BatchMode, BatchReport};
use crate::services::webhook::{MediaUpload, WebhookClient};
use crate::utils::errors::{ZapError, Result};
use crate::utils::helpers::guess_mime_type;

/// Largest media file accepted for upload
pub const MAX_MEDIA_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct MessageService {
    client: WebhookClient,
    batch_mode: BatchMode,
}

impl MessageService {
    pub fn new(client: WebhookClient, batch_mode: BatchMode) -> Self {
        Self { client, batch_mode }
    }

    pub async fn send(&self, instance_id: &str, group_id: &str, messages: &[Message]) -> Result<()> {
        require_messages(messages)?;
        self.client.send_messages(instance_id, group_id, messages).await?;
        info!(instance_id = instance_id, group_id = group_id, messages = messages.len(), "Messages sent");
        Ok(())
    }

    /// Send the same messages to many groups in a single backend call
    pub async fn send_bulk(&self, instance_id: &str, group_ids: &[String], messages: &[Message]) -> Result<()> {
        require_groups(group_ids)?;
        require_messages(messages)?;

        self.client.send_bulk_messages(instance_id, group_ids, messages).await?;
        info!(
            instance_id = instance_id,
            groups = group_ids.len(),
            messages = messages.len(),
            "Bulk messages submitted"
        );
        Ok(())
    }

    /// Send the same messages with one call per group, reporting each group
    pub async fn send_each(&self, instance_id: &str, group_ids: &[String], messages: &[Message]) -> Result<BatchReport> {
        require_groups(group_ids)?;
        require_messages(messages)?;

        Ok(run_batch("messages.send_each", group_ids, self.batch_mode, |group_id| async move {
            self.client.send_messages(instance_id, &group_id, messages).await?;
            Ok::<(), ZapError>(())
        })
        .await)
    }

    pub async fn send_realtime(&self, instance_id: &str, group_id: &str, message: &Message) -> Result<()> {
        self.client.send_realtime_message(instance_id, group_id, message).await?;
        info!(instance_id = instance_id, group_id = group_id, kind = %message.kind(), "Realtime message sent");
        Ok(())
    }

    /// Upload a file from disk as a media message to one group
    pub async fn send_media(&self, instance_id: &str, group_id: &str, message: &Message, file: &Path) -> Result<()> {
        let upload = read_upload(file).await?;
        self.client.send_media(instance_id, group_id, message, upload).await?;
        info!(instance_id = instance_id, group_id = group_id, file = %file.display(), "Media sent");
        Ok(())
    }

    /// Upload a file from disk as a media message to many groups
    pub async fn send_bulk_media(
        &self,
        instance_id: &str,
        group_ids: &[String],
        message: &Message,
        file: &Path,
    ) -> Result<()> {
        require_groups(group_ids)?;
        let upload = read_upload(file).await?;
        self.client.send_bulk_media(instance_id, group_ids, message, upload).await?;
        info!(instance_id = instance_id, groups = group_ids.len(), file = %file.display(), "Bulk media submitted");
        Ok(())
    }
}

/// Media message for an uploaded file, typed after its MIME type
///
/// The caption travels as the message content.
pub fn media_message(file_name: &str, caption: &str) -> Message {
    let media = MediaContent {
        content: caption.to_string(),
        file_name: Some(file_name.to_string()),
    };
    let mime_type = guess_mime_type(file_name);
    let body = if mime_type.starts_with("image/") {
        MessageBody::Image(media)
    } else if mime_type.starts_with("video/") {
        MessageBody::Video(media)
    } else if mime_type.starts_with("audio/") {
        MessageBody::Audio(media)
    } else {
        MessageBody::Document(media)
    };

    Message { id: None, delay: 0, body }
}

async fn read_upload(file: &Path) -> Result<MediaUpload> {
    let metadata = tokio::fs::metadata(file).await?;
    if metadata.len() > MAX_MEDIA_BYTES {
        warn!(file = %file.display(), size = metadata.len(), "Media file too large");
        return Err(ZapError::InvalidInput(format!(
            "{} is {} bytes, the limit is {}",
            file.display(),
            metadata.len(),
            MAX_MEDIA_BYTES
        )));
    }

    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ZapError::InvalidInput(format!("{} is not a file", file.display())))?;
    let bytes = tokio::fs::read(file).await?;

    Ok(MediaUpload {
        mime_type: guess_mime_type(&file_name).to_string(),
        file_name,
        bytes,
    })
}

fn require_groups(group_ids: &[String]) -> Result<()> {
    if group_ids.is_empty() {
        return Err(ZapError::InvalidInput("Select at least one group".to_string()));
    }
    Ok(())
}

fn require_messages(messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
        return Err(ZapError::InvalidInput("Add at least one message".to_string()));
    }
    Ok(())
}
