//! Mock webhook backend for testing
//!
//! This module provides a mock HTTP server that plays the automation backend.
//! Every operation is a POST to a webhook path with an `action` field, so mocks
//! are matched on path plus a partial JSON body.

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use ZapCampaigns::services::webhook::paths;

/// Mock webhook backend for testing
pub struct WebhookMockServer {
    pub server: MockServer,
}

impl WebhookMockServer {
    /// Create a new mock backend
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Answer `body` to every call of `action` on `webhook_path`
    pub async fn mock_action(&self, webhook_path: &str, action: &str, body: Value) {
        self.mock_matching(webhook_path, json!({ "action": action }), ResponseTemplate::new(200).set_body_json(body))
            .await;
    }

    /// Same as `mock_action`, and verify the call count when the server drops
    pub async fn mock_action_times(&self, webhook_path: &str, action: &str, body: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(webhook_path))
            .and(body_partial_json(json!({ "action": action })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer calls whose body contains `fields` with `response`
    pub async fn mock_matching(&self, webhook_path: &str, fields: Value, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(webhook_path))
            .and(body_partial_json(fields))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Fail every call of `action` on `webhook_path` with `status`
    pub async fn mock_failure(&self, webhook_path: &str, action: &str, status: u16, message: &str) {
        self.mock_matching(
            webhook_path,
            json!({ "action": action }),
            ResponseTemplate::new(status).set_body_json(json!({ "message": message })),
        )
        .await;
    }

    pub async fn mock_instances(&self, ids: &[&str]) {
        let instances: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "name": format!("Instance {}", id), "status": "connected" }))
            .collect();
        self.mock_action(paths::INSTANCES, "list", json!({ "instances": instances }))
            .await;
    }

    /// Answer the group listing of one instance
    pub async fn mock_groups(&self, instance_id: &str, groups: Value) {
        self.mock_matching(
            paths::GROUPS,
            json!({ "action": "list", "instanceId": instance_id }),
            ResponseTemplate::new(200).set_body_json(groups),
        )
        .await;
    }

    pub async fn mock_groups_failure(&self, instance_id: &str, status: u16) {
        self.mock_matching(
            paths::GROUPS,
            json!({ "action": "list", "instanceId": instance_id }),
            ResponseTemplate::new(status).set_body_json(json!({ "message": "gateway offline" })),
        )
        .await;
    }

    /// Reset all mocks
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// JSON bodies received for `action` on `webhook_path`, in arrival order
    pub async fn received_actions(&self, webhook_path: &str, action: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path() == webhook_path)
            .filter_map(|req| serde_json::from_slice::<Value>(&req.body).ok())
            .filter(|body| body["action"] == action)
            .collect()
    }

    /// Verify that an action was called a given number of times
    pub async fn verify_action_called(&self, webhook_path: &str, action: &str, times: usize) {
        let calls = self.received_actions(webhook_path, action).await.len();
        assert_eq!(
            calls, times,
            "Expected {} calls to {} {}, but got {}",
            times, webhook_path, action, calls
        );
    }
}

/// Group listing body with the given `(id, name, participants, is_admin)` rows
pub fn groups_body(rows: &[(&str, &str, u64, bool)]) -> Value {
    let groups: Vec<Value> = rows
        .iter()
        .map(|(id, name, participants, is_admin)| {
            json!({
                "id": id,
                "name": name,
                "participants": participants,
                "isAdmin": is_admin,
                "restrict": false,
                "announce": false
            })
        })
        .collect();
    json!({ "groups": groups })
}

pub fn ack() -> Value {
    json!({ "success": true })
}
