//! Campaign service implementation
//!
//! Scheduling, editing and bulk maintenance of campaigns. Execution happens in
//! the backend; this service only records what should be sent and when.
//! Nothing here deduplicates: scheduling the same campaign twice creates two.

use chrono::{DateTime, Local, Utc};
use tracing::{info, debug};

use crate::models::{Campaign, CampaignPatch, CampaignStatus, NewCampaign, Template};
use crate::services::batch::{run_batch, BatchMode, BatchReport};
use crate::services::decode::decode_records;
use crate::services::webhook::WebhookClient;
use crate::utils::errors::{ZapError, Result};
use crate::utils::helpers::{compare_names, name_matches, tomorrow_same_time};

/// Campaign list ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CampaignSort {
    /// Earliest first
    #[default]
    ScheduledAt,
    Name,
    Status,
}

/// Filter and ordering applied to a campaign list
#[derive(Debug, Clone, Default)]
pub struct CampaignQuery {
    pub name: String,
    /// `None` matches every status
    pub status: Option<CampaignStatus>,
    pub sort: CampaignSort,
}

#[derive(Clone)]
pub struct CampaignService {
    client: WebhookClient,
    batch_mode: BatchMode,
}

impl CampaignService {
    pub fn new(client: WebhookClient, batch_mode: BatchMode) -> Self {
        Self { client, batch_mode }
    }

    pub async fn list(&self) -> Result<Vec<Campaign>> {
        let body = self.client.list_campaigns().await?;
        let campaigns: Vec<Campaign> = decode_records(&body, "campaigns", Some("campaign:"));
        debug!(count = campaigns.len(), "Loaded campaigns");
        Ok(campaigns)
    }

    pub async fn schedule(&self, campaign: &NewCampaign) -> Result<()> {
        validate_new_campaign(campaign)?;
        self.client.schedule_campaign(campaign).await?;
        info!(
            name = %campaign.name,
            instance_id = %campaign.instance_id,
            groups = campaign.group_ids.len(),
            scheduled_at = %campaign.scheduled_at,
            "Campaign scheduled"
        );
        Ok(())
    }

    pub async fn update(&self, id: &str, patch: &CampaignPatch) -> Result<()> {
        if matches!(&patch.group_ids, Some(ids) if ids.is_empty()) {
            return Err(ZapError::InvalidInput("Select at least one group".to_string()));
        }
        self.client.update_campaign(id, patch).await?;
        info!(campaign_id = id, "Campaign updated");
        Ok(())
    }

    pub async fn update_status(&self, id: &str, status: CampaignStatus) -> Result<()> {
        self.client.update_campaign_status(id, status).await?;
        info!(campaign_id = id, status = %status, "Campaign status updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_campaign(id).await?;
        info!(campaign_id = id, "Campaign deleted");
        Ok(())
    }

    /// Set the same status on every selected campaign, one call per campaign
    pub async fn bulk_update_status(&self, ids: &[String], status: CampaignStatus) -> Result<BatchReport> {
        require_selection(ids)?;
        info!(campaigns = ids.len(), status = %status, "Bulk updating campaign status");

        Ok(run_batch("campaigns.bulk_update_status", ids, self.batch_mode, |id| async move {
            self.client.update_campaign_status(&id, status).await?;
            Ok::<(), ZapError>(())
        })
        .await)
    }

    /// Move every selected campaign to the same instant, one call per campaign
    pub async fn bulk_reschedule(&self, ids: &[String], scheduled_at: DateTime<Utc>) -> Result<BatchReport> {
        require_selection(ids)?;
        info!(campaigns = ids.len(), scheduled_at = %scheduled_at, "Bulk rescheduling campaigns");

        let patch = CampaignPatch::reschedule(scheduled_at);
        let patch = &patch;
        Ok(run_batch("campaigns.bulk_reschedule", ids, self.batch_mode, |id| async move {
            self.client.update_campaign(&id, patch).await?;
            Ok::<(), ZapError>(())
        })
        .await)
    }
}

/// Draft of a copy of `campaign`, scheduled tomorrow at the current time of day
pub fn duplicate(campaign: &Campaign, now: DateTime<Local>) -> NewCampaign {
    NewCampaign {
        name: format!("{} - Copy", campaign.name),
        instance_id: campaign.instance_id.clone(),
        template_id: campaign.template_id.clone(),
        group_ids: campaign.group_ids.clone(),
        scheduled_at: tomorrow_same_time(now),
    }
}

/// Fill in missing template names from a template list
pub fn attach_template_names(campaigns: &mut [Campaign], templates: &[Template]) {
    for campaign in campaigns.iter_mut().filter(|c| c.template_name.is_none()) {
        campaign.template_name = templates
            .iter()
            .find(|t| t.id == campaign.template_id)
            .map(|t| t.name.clone());
    }
}

pub fn filter_and_sort(campaigns: &[Campaign], query: &CampaignQuery) -> Vec<Campaign> {
    let mut matching: Vec<Campaign> = campaigns
        .iter()
        .filter(|c| name_matches(&c.name, &query.name))
        .filter(|c| query.status.map_or(true, |status| c.status == status))
        .cloned()
        .collect();

    match query.sort {
        CampaignSort::ScheduledAt => matching.sort_by_key(|c| c.scheduled_at),
        CampaignSort::Name => matching.sort_by(|a, b| compare_names(&a.name, &b.name)),
        CampaignSort::Status => matching.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
    }
    matching
}

fn require_selection(ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Err(ZapError::InvalidInput("Select at least one campaign".to_string()));
    }
    Ok(())
}

fn validate_new_campaign(campaign: &NewCampaign) -> Result<()> {
    if campaign.name.trim().is_empty() {
        return Err(ZapError::InvalidInput("Campaign name is required".to_string()));
    }
    if campaign.instance_id.is_empty() {
        return Err(ZapError::InvalidInput("Select an instance".to_string()));
    }
    if campaign.template_id.is_empty() {
        return Err(ZapError::InvalidInput("Select a template".to_string()));
    }
    if campaign.group_ids.is_empty() {
        return Err(ZapError::InvalidInput("Select at least one group".to_string()));
    }
    Ok(())
}
