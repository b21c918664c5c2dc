//! Group service implementation
//!
//! Reads group lists through the shared cache and pushes settings, photos and
//! invite-link requests to the gateway. Every successful mutation refreshes
//! the instance's cache entry so later reads see the gateway's new state.

use tracing::{info, debug};

use crate::models::{Group, GroupSettings, GroupStatistics};
use crate::services::batch::{run_batch, BatchMode, BatchReport};
use crate::services::decode::require_success;
use crate::services::webhook::WebhookClient;
use crate::state::{GroupCache, GroupEntry};
use crate::utils::errors::{ZapError, WebhookError, Result};
use crate::utils::helpers::{compare_names, decoded_len, name_matches, strip_data_url_prefix};

/// Largest accepted group photo, in decoded bytes
pub const MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;

/// Group list ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupSort {
    #[default]
    Name,
    /// Most participants first
    Size,
}

/// Filter and ordering applied to a group list
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub name: String,
    pub admin_only: bool,
    pub sort: GroupSort,
}

#[derive(Clone)]
pub struct GroupService {
    client: WebhookClient,
    cache: GroupCache,
    batch_mode: BatchMode,
}

impl GroupService {
    pub fn new(client: WebhookClient, cache: GroupCache, batch_mode: BatchMode) -> Self {
        Self {
            client,
            cache,
            batch_mode,
        }
    }

    pub fn cache(&self) -> &GroupCache {
        &self.cache
    }

    /// Fetch an instance's groups, refreshing its cache entry
    pub async fn list(&self, instance_id: &str) -> Result<Vec<Group>> {
        match self.cache.refresh(instance_id).await {
            GroupEntry::Loaded(groups) => Ok(groups),
            GroupEntry::Failed(reason) => Err(ZapError::Webhook(WebhookError::RequestFailed(reason))),
            GroupEntry::NotLoaded => Err(ZapError::InvalidInput("Instance id is required".to_string())),
        }
    }

    /// Settings of a group as the gateway last reported them
    ///
    /// Reads the cached listing when there is one and fetches it otherwise.
    pub async fn current_settings(&self, instance_id: &str, group_id: &str) -> Result<GroupSettings> {
        let groups = match self.cache.get(instance_id).await {
            GroupEntry::Loaded(groups) => groups,
            _ => self.list(instance_id).await?,
        };
        groups
            .iter()
            .find(|group| group.id == group_id)
            .map(GroupSettings::from_group)
            .ok_or_else(|| ZapError::GroupNotFound { group_id: group_id.to_string() })
    }

    pub async fn update_settings(&self, instance_id: &str, group_id: &str, settings: &GroupSettings) -> Result<()> {
        self.apply_settings(instance_id, group_id, settings).await?;
        self.cache.refresh(instance_id).await;
        Ok(())
    }

    /// Replace a group's photo; accepts bare base64 or a data URL
    pub async fn update_photo(&self, instance_id: &str, group_id: &str, photo: &str) -> Result<()> {
        let photo = validate_photo(photo)?;
        self.apply_photo(instance_id, group_id, photo).await?;
        self.cache.refresh(instance_id).await;
        Ok(())
    }

    pub async fn invite_link(&self, instance_id: &str, group_id: &str) -> Result<String> {
        let body = self.client.group_invite_link(instance_id, group_id).await?;
        let ack = require_success(&body, "Invite link not found")?;
        ack.invite_link
            .filter(|link| !link.is_empty())
            .ok_or_else(|| {
                ZapError::Webhook(WebhookError::Rejected {
                    status: 200,
                    message: "Invite link not found".to_string(),
                })
            })
    }

    /// Apply the same settings (and optionally a photo) to many groups
    ///
    /// Each group is one item of the batch: a settings failure or a photo
    /// failure marks that group failed without stopping the rest. The cache
    /// entry is refreshed once after the batch.
    pub async fn bulk_update(
        &self,
        instance_id: &str,
        group_ids: &[String],
        settings: &GroupSettings,
        photo: Option<&str>,
    ) -> Result<BatchReport> {
        if group_ids.is_empty() {
            return Err(ZapError::InvalidInput("Select at least one group".to_string()));
        }
        let photo = photo.map(validate_photo).transpose()?;

        info!(instance_id = instance_id, groups = group_ids.len(), with_photo = photo.is_some(), "Bulk updating groups");
        let report = run_batch("groups.bulk_update", group_ids, self.batch_mode, |group_id| async move {
            self.apply_settings(instance_id, &group_id, settings).await?;
            if let Some(photo) = photo {
                self.apply_photo(instance_id, &group_id, photo).await?;
            }
            Ok::<(), ZapError>(())
        })
        .await;

        if report.success_count() > 0 {
            self.cache.refresh(instance_id).await;
        }
        Ok(report)
    }

    async fn apply_settings(&self, instance_id: &str, group_id: &str, settings: &GroupSettings) -> Result<()> {
        debug!(instance_id = instance_id, group_id = group_id, settings = ?settings, "Updating group settings");
        let body = self.client.update_group_settings(instance_id, group_id, settings).await?;
        require_success(&body, "Settings update failed")?;
        Ok(())
    }

    async fn apply_photo(&self, instance_id: &str, group_id: &str, photo: &str) -> Result<()> {
        debug!(instance_id = instance_id, group_id = group_id, "Updating group photo");
        let body = self.client.update_group_photo(instance_id, group_id, photo).await?;
        require_success(&body, "Photo update failed")?;
        Ok(())
    }
}

/// Check size and strip any data-URL prefix
fn validate_photo(photo: &str) -> Result<&str> {
    let size = decoded_len(photo)?;
    if size == 0 {
        return Err(ZapError::InvalidInput("Photo is empty".to_string()));
    }
    if size > MAX_PHOTO_BYTES {
        return Err(ZapError::InvalidInput(format!(
            "Photo is too large: {} bytes (max {})",
            size, MAX_PHOTO_BYTES
        )));
    }
    Ok(strip_data_url_prefix(photo).trim())
}

pub fn statistics(groups: &[Group]) -> GroupStatistics {
    let admin_groups = groups.iter().filter(|g| g.is_admin).count();
    GroupStatistics {
        total: groups.len(),
        admin_groups,
        member_groups: groups.len() - admin_groups,
    }
}

pub fn filter_and_sort(groups: &[Group], query: &GroupQuery) -> Vec<Group> {
    let mut matching: Vec<Group> = groups
        .iter()
        .filter(|g| name_matches(&g.name, &query.name))
        .filter(|g| !query.admin_only || g.is_admin)
        .cloned()
        .collect();

    match query.sort {
        GroupSort::Name => matching.sort_by(|a, b| compare_names(&a.name, &b.name)),
        GroupSort::Size => matching.sort_by(|a, b| b.participants.cmp(&a.participants)),
    }
    matching
}
