//! Periodic backend trigger
//!
//! The backend's scheduler is driven from outside: something has to POST to
//! its trigger webhook at a fixed interval so that due campaigns get sent.
//! This service is that something. A failed poke is logged and the loop
//! carries on with the next tick.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn, debug};

use crate::config::{ApiConfig, TriggerConfig};
use crate::services::decode::extract_error_message;
use crate::utils::errors::{ZapError, WebhookError, Result};

#[derive(Clone, Debug)]
pub struct TriggerService {
    client: Client,
    url: String,
    token: String,
    interval: Duration,
}

/// Outcome counts of a trigger loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerStats {
    pub fired: u64,
    pub failed: u64,
}

impl TriggerService {
    pub fn new(config: &TriggerConfig, api: &ApiConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ZapError::Config("Trigger URL is not configured".to_string()))?;

        let interval = Duration::from_secs(config.interval_seconds.max(1));
        // a poke never outlives its tick
        let client = Client::builder()
            .user_agent(api.user_agent.as_str())
            .timeout(interval)
            .build()?;

        Ok(Self {
            client,
            url,
            token: api.token.clone(),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Send a single poke
    pub async fn fire(&self) -> Result<()> {
        debug!(url = %self.url, "Firing backend trigger");
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&json!({ "action": "trigger", "firedAt": Utc::now() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ZapError::Webhook(WebhookError::Rejected {
                status: status.as_u16(),
                message: extract_error_message(status, &body),
            }));
        }
        Ok(())
    }

    /// Fire on every interval tick until `shutdown` completes
    ///
    /// The first poke goes out immediately. A poke still in flight at
    /// shutdown is abandoned and not counted as failed.
    pub async fn run<S>(&self, shutdown: S) -> TriggerStats
    where
        S: Future<Output = ()>,
    {
        info!(url = %self.url, interval_secs = self.interval.as_secs(), "Starting backend trigger");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats = TriggerStats::default();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    stats.fired += 1;
                    tokio::select! {
                        _ = &mut shutdown => break,
                        result = self.fire() => {
                            if let Err(e) = result {
                                stats.failed += 1;
                                warn!(error = %e, "Backend trigger failed");
                            }
                        }
                    }
                }
            }
        }

        info!(fired = stats.fired, failed = stats.failed, "Backend trigger stopped");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer, interval_seconds: u64) -> TriggerService {
        TriggerService::new(
            &TriggerConfig {
                enabled: true,
                url: Some(format!("{}/webhook/cron", server.uri())),
                interval_seconds,
            },
            &ApiConfig {
                base_url: server.uri(),
                token: "cron-token".to_string(),
                user_agent: "zap-test".to_string(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fire_posts_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/cron"))
            .and(header("authorization", "Bearer cron-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        service_for(&server, 60).fire().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_poke_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = service_for(&server, 60).fire().await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.user_message(), "busy");
    }

    #[tokio::test]
    async fn test_run_fires_immediately_and_stops_on_shutdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let service = service_for(&server, 3600);
        let stats = service
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await;

        assert_eq!(stats, TriggerStats { fired: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_a_slow_poke() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let service = service_for(&server, 3600);
        let started = std::time::Instant::now();
        let stats = service
            .run(tokio::time::sleep(Duration::from_millis(200)))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2), "run took {:?}", started.elapsed());
        assert_eq!(stats, TriggerStats { fired: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_poke_times_out_after_one_interval() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        let result = service_for(&server, 1).fire().await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(3), "fire took {:?}", started.elapsed());
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let result = TriggerService::new(&TriggerConfig::default(), &ApiConfig {
            base_url: "http://localhost".to_string(),
            token: "t".to_string(),
            user_agent: "zap-test".to_string(),
        });
        assert!(matches!(result, Err(ZapError::Config(_))));
    }
}
