//! Per-instance group cache
//!
//! Holds, for every instance id, the result of the most recent group fetch so
//! that callers do not each refetch. Entries are replaced wholesale, never
//! merged, and live as long as the cache: there is no eviction and no TTL.
//!
//! A single eager preload fills the cache for every known instance. The global
//! load state (`loading` plus an optional error) belongs to that preload only;
//! per-instance refreshes never touch it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use crate::models::{Group, Instance};
use crate::services::decode::{decode_groups, decode_records};
use crate::services::webhook::{paths, WebhookClient};
use crate::utils::logging::{log_api_error, log_cache_event};

/// Cached state of one instance's groups
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum GroupEntry {
    NotLoaded,
    Loaded(Vec<Group>),
    Failed(String),
}

/// Global state of the initial preload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Counts reported by a completed preload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadSummary {
    pub instances: usize,
    pub loaded: usize,
    pub failed: usize,
    pub groups: usize,
}

/// Shared handle to the group cache; clones refer to the same store
#[derive(Clone)]
pub struct GroupCache {
    client: WebhookClient,
    entries: Arc<RwLock<HashMap<String, GroupEntry>>>,
    state: Arc<watch::Sender<LoadState>>,
    preload_started: Arc<AtomicBool>,
}

impl GroupEntry {
    /// Groups of a loaded entry; empty for anything else
    pub fn groups(&self) -> &[Group] {
        match self {
            GroupEntry::Loaded(groups) => groups,
            _ => &[],
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, GroupEntry::Loaded(_))
    }
}

impl GroupCache {
    /// Create an empty cache; the loading flag is set until the first preload settles
    pub fn new(client: WebhookClient) -> Self {
        let (state, _) = watch::channel(LoadState {
            loading: true,
            error: None,
        });

        Self {
            client,
            entries: Arc::new(RwLock::new(HashMap::new())),
            state: Arc::new(state),
            preload_started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fetch every instance's groups concurrently and populate the cache
    ///
    /// Runs at most once per cache; later calls log a warning and return `None`.
    /// A failure for one instance is stored as `Failed` for that id and does not
    /// affect the others. A failure to list instances sets the global error.
    pub async fn preload_all(&self) -> Option<PreloadSummary> {
        if self.preload_started.swap(true, Ordering::SeqCst) {
            warn!("Group preload already ran for this cache, ignoring");
            return None;
        }

        info!("Preloading groups for all instances");
        self.update_state(true, None);

        let body = match self.client.list_instances().await {
            Ok(body) => body,
            Err(e) => {
                log_api_error(paths::INSTANCES, &e.to_string(), Some("group preload"));
                self.update_state(false, Some(format!("Failed to load groups: {}", e)));
                return Some(PreloadSummary::default());
            }
        };

        let ids: Vec<String> = decode_records::<Instance>(&body, "instances", None)
            .into_iter()
            .map(|instance| instance.id)
            .filter(|id| !id.is_empty())
            .collect();

        info!(instances = ids.len(), "Fetching groups for instances");

        let entries = join_all(ids.iter().map(|id| async move {
            let entry = self.fetch_entry(id).await;
            self.store(id, entry.clone()).await;
            entry
        }))
        .await;

        let summary = PreloadSummary {
            instances: ids.len(),
            loaded: entries.iter().filter(|e| e.is_loaded()).count(),
            failed: entries.iter().filter(|e| matches!(e, GroupEntry::Failed(_))).count(),
            groups: entries.iter().map(|e| e.groups().len()).sum(),
        };

        self.update_state(false, None);
        info!(
            instances = summary.instances,
            loaded = summary.loaded,
            failed = summary.failed,
            groups = summary.groups,
            "Group preload finished"
        );
        Some(summary)
    }

    /// Refetch one instance's groups and replace its entry
    ///
    /// Returns the new entry. An empty id is ignored.
    pub async fn refresh(&self, instance_id: &str) -> GroupEntry {
        if instance_id.is_empty() {
            return GroupEntry::NotLoaded;
        }

        info!(instance_id = instance_id, "Refreshing cached groups");
        let entry = self.fetch_entry(instance_id).await;
        self.store(instance_id, entry.clone()).await;
        entry
    }

    /// Entry for an instance, `NotLoaded` when nothing was fetched yet
    pub async fn get(&self, instance_id: &str) -> GroupEntry {
        self.entries
            .read()
            .await
            .get(instance_id)
            .cloned()
            .unwrap_or(GroupEntry::NotLoaded)
    }

    /// Group list for an instance; empty unless the entry is loaded
    pub async fn groups(&self, instance_id: &str) -> Vec<Group> {
        self.get(instance_id).await.groups().to_vec()
    }

    /// Copy of every cached entry
    pub async fn snapshot(&self) -> HashMap<String, GroupEntry> {
        self.entries.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn load_error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Watch the preload state
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    /// Wait until the preload has settled
    pub async fn wait_for_preload(&self) {
        let mut rx = self.subscribe();
        // the sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|state| !state.loading).await;
    }

    async fn fetch_entry(&self, instance_id: &str) -> GroupEntry {
        let result = match self.client.list_groups(instance_id).await {
            Ok(body) => decode_groups(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(groups) => {
                log_cache_event(instance_id, "loaded", Some(groups.len()), None);
                GroupEntry::Loaded(groups)
            }
            Err(e) => {
                warn!(instance_id = instance_id, error = %e, "Failed to load groups for instance");
                log_cache_event(instance_id, "failed", None, Some(&e.to_string()));
                GroupEntry::Failed(e.to_string())
            }
        }
    }

    async fn store(&self, instance_id: &str, entry: GroupEntry) {
        self.entries.write().await.insert(instance_id.to_string(), entry);
    }

    fn update_state(&self, loading: bool, error: Option<String>) {
        self.state.send_if_modified(|state| {
            let next = LoadState { loading, error };
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cache_for(server: &MockServer) -> GroupCache {
        let client = WebhookClient::new(&ApiConfig {
            base_url: server.uri(),
            token: "t".to_string(),
            user_agent: "zap-test".to_string(),
        })
        .unwrap();
        GroupCache::new(client)
    }

    #[tokio::test]
    async fn test_get_unknown_instance_is_not_loaded() {
        let server = MockServer::start().await;
        let cache = cache_for(&server);

        assert_eq!(cache.get("missing").await, GroupEntry::NotLoaded);
        assert!(cache.groups("missing").await.is_empty());
        assert!(cache.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_ignores_empty_id() {
        let server = MockServer::start().await;
        let cache = cache_for(&server);

        assert_eq!(cache.refresh("").await, GroupEntry::NotLoaded);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_group_shape_is_failed_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/groups"))
            .and(body_partial_json(json!({"instanceId": "a"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let entry = cache.refresh("a").await;
        assert!(matches!(entry, GroupEntry::Failed(_)));
        assert!(cache.groups("a").await.is_empty());
        // refresh leaves the preload state alone
        assert!(cache.is_loading());
        assert_eq!(cache.load_error(), None);
    }

    #[test]
    fn test_entry_serialization() {
        let value = serde_json::to_value(GroupEntry::Failed("timeout".into())).unwrap();
        assert_eq!(value, json!({"state": "failed", "value": "timeout"}));
        let value = serde_json::to_value(GroupEntry::NotLoaded).unwrap();
        assert_eq!(value, json!({"state": "notLoaded"}));
    }
}
