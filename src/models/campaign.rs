//! Campaign model

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::string_or_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub instance_id: String,
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Pending,
    Sent,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub name: String,
    pub instance_id: String,
    pub template_id: String,
    pub group_ids: Vec<String>,
    pub scheduled_at: DateTime<Utc>,
}

/// Partial campaign update; only present fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Pending => "pending",
            CampaignStatus::Sent => "sent",
            CampaignStatus::Error => "error",
            CampaignStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CampaignStatus::Pending),
            "sent" => Ok(CampaignStatus::Sent),
            "error" => Ok(CampaignStatus::Error),
            other => Err(format!("unknown campaign status: {}", other)),
        }
    }
}

impl From<NewCampaign> for CampaignPatch {
    fn from(campaign: NewCampaign) -> Self {
        Self {
            name: Some(campaign.name),
            instance_id: Some(campaign.instance_id),
            template_id: Some(campaign.template_id),
            group_ids: Some(campaign.group_ids),
            scheduled_at: Some(campaign.scheduled_at),
        }
    }
}

impl CampaignPatch {
    pub fn reschedule(scheduled_at: DateTime<Utc>) -> Self {
        Self {
            scheduled_at: Some(scheduled_at),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_campaign_deserialization() {
        let campaign: Campaign = serde_json::from_value(json!({
            "id": "c1",
            "name": "Promo",
            "instanceId": "i1",
            "templateId": "t1",
            "templateName": "Black Friday",
            "groupIds": ["g1", "g2"],
            "scheduledAt": "2025-11-28T12:00:00.000Z",
            "status": "sent",
            "sentCount": 2
        }))
        .unwrap();

        assert_eq!(campaign.status, CampaignStatus::Sent);
        assert_eq!(campaign.group_ids.len(), 2);
        assert_eq!(campaign.sent_count, Some(2));
    }

    #[test]
    fn test_unknown_status_tolerated() {
        let campaign: Campaign = serde_json::from_value(json!({
            "id": 7,
            "name": "Promo",
            "instanceId": "i1",
            "templateId": "t1",
            "scheduledAt": "2025-11-28T12:00:00Z",
            "status": "sending"
        }))
        .unwrap();

        assert_eq!(campaign.id, "7");
        assert_eq!(campaign.status, CampaignStatus::Unknown);
    }

    #[test]
    fn test_reschedule_patch_only_sends_date() {
        let at = "2025-12-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let value = serde_json::to_value(CampaignPatch::reschedule(at)).unwrap();
        assert_eq!(value, json!({"scheduledAt": "2025-12-01T09:00:00Z"}));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Pending".parse::<CampaignStatus>().unwrap(), CampaignStatus::Pending);
        assert!("unknown".parse::<CampaignStatus>().is_err());
    }
}
