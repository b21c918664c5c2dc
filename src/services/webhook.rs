//! Webhook backend client
//!
//! Every domain operation is a POST to a fixed webhook path with an `action`
//! discriminator in the body. Calls are made exactly once: no retries, no
//! backoff and no client-side timeout beyond the transport defaults. Response
//! bodies are returned as raw JSON for the calling service to interpret.

use std::time::Instant;

use reqwest::multipart::{Form, Part};
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::ApiConfig;
use crate::models::{CampaignPatch, CampaignStatus, GroupSettings, Message, NewCampaign, NewInstance, NewTemplate};
use crate::services::decode::extract_error_message;
use crate::utils::errors::{Result, WebhookError, WebhookResult, ZapError};
use crate::utils::logging::log_api_call;

/// Webhook paths exposed by the automation backend
pub mod paths {
    pub const AUTH: &str = "/webhook/auth";
    pub const INSTANCES: &str = "/webhook/instances";
    pub const TEMPLATES: &str = "/webhook/templates";
    pub const GROUPS: &str = "/webhook/groups";
    pub const CAMPAIGNS: &str = "/webhook/campaigns";
    pub const GROUP_SETTINGS: &str = "/webhook/group-settings";
    pub const GROUP_PHOTO: &str = "/webhook/group-photo";
    pub const GROUP_INVITE: &str = "/webhook/group-invite";
    pub const MESSAGES: &str = "/webhook/messages";
}

/// Binary file attached to a media send
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for the webhook backend
#[derive(Clone, Debug)]
pub struct WebhookClient {
    client: Client,
    base_url: String,
}

impl WebhookClient {
    /// Create a new client with the bearer token installed as a default header
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| ZapError::Config(format!("Invalid API token: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `{"action": action, ..fields}` as JSON to `path`
    pub async fn post_action<T: Serialize>(&self, path: &str, action: &str, fields: T) -> WebhookResult<Value> {
        let mut body = match serde_json::to_value(fields) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Map::new(),
            Ok(other) => {
                return Err(WebhookError::RequestFailed(format!(
                    "request fields must serialize to an object, got {}",
                    other
                )))
            }
            Err(e) => return Err(WebhookError::RequestFailed(e.to_string())),
        };
        body.insert("action".to_string(), Value::String(action.to_string()));

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, action = action, "Calling webhook");

        let started = Instant::now();
        let result = match self.client.post(&url).json(&body).send().await {
            Ok(response) => read_response(response).await,
            Err(e) => Err(map_transport_error(e)),
        };
        log_api_call(path, action, started.elapsed().as_millis() as u64, result.is_ok());
        result
    }

    /// POST a multipart form to `path`; the action travels as a form field
    pub async fn post_multipart(&self, path: &str, action: &str, form: Form) -> WebhookResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, action = action, "Calling webhook with multipart body");

        let form = form.text("action", action.to_string());
        let started = Instant::now();
        let result = match self.client.post(&url).multipart(form).send().await {
            Ok(response) => read_response(response).await,
            Err(e) => Err(map_transport_error(e)),
        };
        log_api_call(path, action, started.elapsed().as_millis() as u64, result.is_ok());
        result
    }

    // Authentication

    pub async fn login(&self, username: &str, password: &str) -> WebhookResult<Value> {
        self.post_action(paths::AUTH, "login", json!({ "username": username, "password": password }))
            .await
    }

    // Instances

    pub async fn list_instances(&self) -> WebhookResult<Value> {
        self.post_action(paths::INSTANCES, "list", Value::Null).await
    }

    pub async fn save_instance(&self, instance: &NewInstance) -> WebhookResult<Value> {
        self.post_action(paths::INSTANCES, "save", json!({ "instance": instance })).await
    }

    pub async fn delete_instance(&self, id: &str) -> WebhookResult<Value> {
        self.post_action(paths::INSTANCES, "delete", json!({ "id": id })).await
    }

    // Templates

    pub async fn list_templates(&self) -> WebhookResult<Value> {
        self.post_action(paths::TEMPLATES, "list", Value::Null).await
    }

    pub async fn save_template(&self, template: &NewTemplate) -> WebhookResult<Value> {
        self.post_action(paths::TEMPLATES, "save", json!({ "template": template })).await
    }

    pub async fn update_template(&self, id: &str, template: &NewTemplate) -> WebhookResult<Value> {
        self.post_action(paths::TEMPLATES, "update", json!({ "id": id, "template": template }))
            .await
    }

    pub async fn delete_template(&self, id: &str) -> WebhookResult<Value> {
        self.post_action(paths::TEMPLATES, "delete", json!({ "id": id })).await
    }

    // Groups

    pub async fn list_groups(&self, instance_id: &str) -> WebhookResult<Value> {
        self.post_action(paths::GROUPS, "list", json!({ "instanceId": instance_id })).await
    }

    pub async fn update_group_settings(
        &self,
        instance_id: &str,
        group_id: &str,
        settings: &GroupSettings,
    ) -> WebhookResult<Value> {
        self.post_action(
            paths::GROUP_SETTINGS,
            "update",
            json!({ "instanceId": instance_id, "groupId": group_id, "settings": settings }),
        )
        .await
    }

    /// `photo` is bare base64, without a data-URL prefix
    pub async fn update_group_photo(&self, instance_id: &str, group_id: &str, photo: &str) -> WebhookResult<Value> {
        self.post_action(
            paths::GROUP_PHOTO,
            "updatePhoto",
            json!({ "instanceId": instance_id, "groupId": group_id, "photo": photo }),
        )
        .await
    }

    pub async fn group_invite_link(&self, instance_id: &str, group_id: &str) -> WebhookResult<Value> {
        self.post_action(
            paths::GROUP_INVITE,
            "get",
            json!({ "instanceId": instance_id, "groupId": group_id }),
        )
        .await
    }

    // Campaigns

    pub async fn schedule_campaign(&self, campaign: &NewCampaign) -> WebhookResult<Value> {
        self.post_action(paths::CAMPAIGNS, "schedule", json!({ "campaign": campaign })).await
    }

    pub async fn list_campaigns(&self) -> WebhookResult<Value> {
        self.post_action(paths::CAMPAIGNS, "list", Value::Null).await
    }

    pub async fn update_campaign(&self, id: &str, patch: &CampaignPatch) -> WebhookResult<Value> {
        self.post_action(paths::CAMPAIGNS, "update", json!({ "id": id, "campaign": patch }))
            .await
    }

    pub async fn update_campaign_status(&self, id: &str, status: CampaignStatus) -> WebhookResult<Value> {
        self.post_action(paths::CAMPAIGNS, "updateStatus", json!({ "id": id, "status": status }))
            .await
    }

    pub async fn delete_campaign(&self, id: &str) -> WebhookResult<Value> {
        self.post_action(paths::CAMPAIGNS, "delete", json!({ "id": id })).await
    }

    // Messages

    pub async fn send_messages(&self, instance_id: &str, group_id: &str, messages: &[Message]) -> WebhookResult<Value> {
        self.post_action(
            paths::MESSAGES,
            "send",
            json!({ "instanceId": instance_id, "groupId": group_id, "messages": messages }),
        )
        .await
    }

    pub async fn send_bulk_messages(
        &self,
        instance_id: &str,
        group_ids: &[String],
        messages: &[Message],
    ) -> WebhookResult<Value> {
        self.post_action(
            paths::MESSAGES,
            "sendBulk",
            json!({ "instanceId": instance_id, "groupIds": group_ids, "messages": messages }),
        )
        .await
    }

    pub async fn send_realtime_message(&self, instance_id: &str, group_id: &str, message: &Message) -> WebhookResult<Value> {
        self.post_action(
            paths::MESSAGES,
            "sendRealtime",
            json!({ "instanceId": instance_id, "groupId": group_id, "message": message }),
        )
        .await
    }

    pub async fn send_media(
        &self,
        instance_id: &str,
        group_id: &str,
        message: &Message,
        upload: MediaUpload,
    ) -> WebhookResult<Value> {
        let form = media_form(message, upload)?
            .text("instanceId", instance_id.to_string())
            .text("groupId", group_id.to_string());
        self.post_multipart(paths::MESSAGES, "sendMedia", form).await
    }

    pub async fn send_bulk_media(
        &self,
        instance_id: &str,
        group_ids: &[String],
        message: &Message,
        upload: MediaUpload,
    ) -> WebhookResult<Value> {
        let group_ids = serde_json::to_string(group_ids).map_err(|e| WebhookError::RequestFailed(e.to_string()))?;
        let form = media_form(message, upload)?
            .text("instanceId", instance_id.to_string())
            .text("groupIds", group_ids);
        self.post_multipart(paths::MESSAGES, "sendBulkMedia", form).await
    }
}

fn media_form(message: &Message, upload: MediaUpload) -> WebhookResult<Form> {
    let message = serde_json::to_string(message).map_err(|e| WebhookError::RequestFailed(e.to_string()))?;
    let file = Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.mime_type)
        .map_err(|e| WebhookError::RequestFailed(format!("invalid MIME type: {}", e)))?;

    Ok(Form::new().text("message", message).part("file", file))
}

fn map_transport_error(e: reqwest::Error) -> WebhookError {
    if e.is_timeout() {
        WebhookError::Timeout
    } else if e.is_connect() {
        WebhookError::ServiceUnavailable
    } else {
        WebhookError::RequestFailed(e.to_string())
    }
}

async fn read_response(response: reqwest::Response) -> WebhookResult<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| WebhookError::InvalidResponse(e.to_string()))?;

    if !status.is_success() {
        return Err(WebhookError::Rejected {
            status: status.as_u16(),
            message: extract_error_message(status, &text),
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    // Some workflows answer with plain text such as "Workflow was started"
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
