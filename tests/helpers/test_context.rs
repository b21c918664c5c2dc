//! Test context for unified test setup
//!
//! Starts a mock backend and builds the full service factory against it.

use tempfile::TempDir;

use ZapCampaigns::config::{ApiConfig, Settings};
use ZapCampaigns::services::ServiceFactory;

use super::webhook_mock::WebhookMockServer;

pub const TEST_TOKEN: &str = "test-bearer-token";

/// Unified test context that manages all test components
pub struct TestContext {
    pub backend: WebhookMockServer,
    pub settings: Settings,
    pub services: ServiceFactory,
    pub temp_dir: TempDir,
}

impl TestContext {
    /// Create a context with sequential bulk operations
    pub async fn new() -> Self {
        Self::with_concurrency(1).await
    }

    pub async fn with_concurrency(concurrency: usize) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let backend = WebhookMockServer::new().await;
        let mut settings = test_settings(&backend.uri());
        settings.batch.concurrency = concurrency;

        let services = ServiceFactory::new(&settings).expect("Failed to build services");
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

        Self {
            backend,
            settings,
            services,
            temp_dir,
        }
    }
}

/// Settings pointing at a mock backend
pub fn test_settings(base_url: &str) -> Settings {
    Settings {
        api: ApiConfig {
            base_url: base_url.to_string(),
            token: TEST_TOKEN.to_string(),
            user_agent: "zapcampaigns-test".to_string(),
        },
        ..Settings::default()
    }
}
