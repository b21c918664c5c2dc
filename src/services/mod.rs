//! Services module
//!
//! This module contains the webhook client and the business logic services
//! built on top of it

pub mod auth;
pub mod batch;
pub mod campaigns;
pub mod decode;
pub mod groups;
pub mod instances;
pub mod messages;
pub mod templates;
pub mod trigger;
pub mod webhook;

// Re-export commonly used services
pub use auth::{AuthService, AuthSession};
pub use batch::{BatchMode, BatchReport, ItemOutcome};
pub use campaigns::{CampaignService, CampaignQuery, CampaignSort};
pub use groups::{GroupService, GroupQuery, GroupSort};
pub use instances::InstanceService;
pub use messages::MessageService;
pub use templates::TemplateService;
pub use trigger::{TriggerService, TriggerStats};
pub use webhook::{MediaUpload, WebhookClient};

use crate::config::settings::Settings;
use crate::state::{GroupCache, PreloadSummary};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
///
/// Every service shares one webhook client and one group cache, so a group
/// listing refreshed through `groups` is visible to everyone holding `cache`.
#[derive(Clone)]
pub struct ServiceFactory {
    pub client: WebhookClient,
    pub cache: GroupCache,
    pub auth_service: AuthService,
    pub instance_service: InstanceService,
    pub template_service: TemplateService,
    pub group_service: GroupService,
    pub campaign_service: CampaignService,
    pub message_service: MessageService,
    pub trigger_service: Option<TriggerService>,
    preload_on_start: bool,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = WebhookClient::new(&settings.api)?;
        let cache = GroupCache::new(client.clone());
        let batch_mode = BatchMode::from_concurrency(settings.batch.concurrency);

        let trigger_service = if settings.trigger.enabled {
            Some(TriggerService::new(&settings.trigger, &settings.api)?)
        } else {
            None
        };

        Ok(Self {
            auth_service: AuthService::new(client.clone()),
            instance_service: InstanceService::new(client.clone()),
            template_service: TemplateService::new(client.clone()),
            group_service: GroupService::new(client.clone(), cache.clone(), batch_mode),
            campaign_service: CampaignService::new(client.clone(), batch_mode),
            message_service: MessageService::new(client.clone(), batch_mode),
            trigger_service,
            client,
            cache,
            preload_on_start: settings.cache.preload_on_start,
        })
    }

    /// Preload the group cache when `cache.preload_on_start` is set
    pub async fn warm_up(&self) -> Option<PreloadSummary> {
        if !self.preload_on_start {
            return None;
        }
        self.cache.preload_all().await
    }

    /// Health check for all services
    ///
    /// Lists instances as a reachability check; the backend has no dedicated
    /// health endpoint.
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let backend_error = self.instance_service.list().await.err().map(|e| e.user_message());

        ServiceHealthStatus {
            backend_url: self.client.base_url().to_string(),
            backend_reachable: backend_error.is_none(),
            backend_error,
            cache_loading: self.cache.is_loading(),
            cache_error: self.cache.load_error(),
            trigger_enabled: self.trigger_service.is_some(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub backend_url: String,
    pub backend_reachable: bool,
    pub backend_error: Option<String>,
    pub cache_loading: bool,
    pub cache_error: Option<String>,
    pub trigger_enabled: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.backend_reachable && self.cache_error.is_none()
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(error) = &self.backend_error {
            issues.push(format!("Webhook backend unreachable: {}", error));
        }
        if let Some(error) = &self.cache_error {
            issues.push(format!("Group preload failed: {}", error));
        }

        issues
    }
}
