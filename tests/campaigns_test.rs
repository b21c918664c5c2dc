//! Campaign service integration tests

mod helpers;

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::ResponseTemplate;

use helpers::*;
use ZapCampaigns::models::{CampaignPatch, CampaignStatus, NewCampaign};
use ZapCampaigns::services::webhook::paths;
use ZapCampaigns::ZapError;

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_bulk_status_issues_one_call_per_campaign() {
    let ctx = TestContext::new().await;
    ctx.backend
        .mock_action_times(paths::CAMPAIGNS, "updateStatus", ack(), 4)
        .await;

    let report = ctx
        .services
        .campaign_service
        .bulk_update_status(&ids(&["c1", "c2", "c3", "c4"]), CampaignStatus::Sent)
        .await
        .unwrap();

    assert_eq!(report.len(), 4);
    assert_eq!(report.success_count(), 4);
    assert_eq!(report.error_count(), 0);

    let bodies = ctx.backend.received_actions(paths::CAMPAIGNS, "updateStatus").await;
    let sent: Vec<&str> = bodies.iter().filter_map(|b| b["id"].as_str()).collect();
    assert_eq!(sent, vec!["c1", "c2", "c3", "c4"]);
    assert!(bodies.iter().all(|b| b["status"] == "sent"));
}

#[tokio::test]
async fn test_bulk_status_reports_each_failure() {
    let ctx = TestContext::new().await;
    ctx.backend
        .mock_matching(
            paths::CAMPAIGNS,
            json!({ "action": "updateStatus", "id": "c2" }),
            ResponseTemplate::new(404).set_body_json(json!({ "message": "campaign c2 not found" })),
        )
        .await;
    ctx.backend.mock_action(paths::CAMPAIGNS, "updateStatus", ack()).await;

    let report = ctx
        .services
        .campaign_service
        .bulk_update_status(&ids(&["c1", "c2", "c3"]), CampaignStatus::Error)
        .await
        .unwrap();

    assert_eq!(report.success_count() + report.error_count(), 3);
    assert_eq!(report.error_count(), 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures[0].id, "c2");
    assert_eq!(failures[0].error.as_deref(), Some("campaign c2 not found"));
    // outcomes keep input order
    let order: Vec<&str> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(order, vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn test_concurrent_bulk_keeps_input_order() {
    let ctx = TestContext::with_concurrency(3).await;
    ctx.backend
        .mock_action_times(paths::CAMPAIGNS, "update", ack(), 5)
        .await;

    let at = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
    let report = ctx
        .services
        .campaign_service
        .bulk_reschedule(&ids(&["a", "b", "c", "d", "e"]), at)
        .await
        .unwrap();

    let order: Vec<&str> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(report.success_count(), 5);

    let bodies = ctx.backend.received_actions(paths::CAMPAIGNS, "update").await;
    assert!(bodies
        .iter()
        .all(|b| b["campaign"] == json!({ "scheduledAt": "2026-01-05T12:00:00Z" })));
}

#[tokio::test]
async fn test_bulk_with_empty_selection_is_rejected() {
    let ctx = TestContext::new().await;

    let result = ctx
        .services
        .campaign_service
        .bulk_update_status(&[], CampaignStatus::Sent)
        .await;

    assert_matches!(result, Err(ZapError::InvalidInput(_)));
    ctx.backend.verify_action_called(paths::CAMPAIGNS, "updateStatus", 0).await;
}

#[tokio::test]
async fn test_list_accepts_keyed_records() {
    let ctx = TestContext::new().await;
    ctx.backend
        .mock_action(
            paths::CAMPAIGNS,
            "list",
            json!({
                "campaign:1": "{\"id\":1,\"name\":\"Natal\",\"instanceId\":\"i1\",\"templateId\":\"t1\",\"groupIds\":[\"g1\"],\"scheduledAt\":\"2025-12-20T10:00:00Z\",\"status\":\"sent\"}",
                "campaign:2": {
                    "id": "2",
                    "name": "Ano Novo",
                    "instanceId": "i1",
                    "templateId": "t1",
                    "groupIds": ["g1", "g2"],
                    "scheduledAt": "2025-12-31T23:00:00Z",
                    "status": "archived"
                },
                "template:9": "{\"id\":9}"
            }),
        )
        .await;

    let mut campaigns = ctx.services.campaign_service.list().await.unwrap();
    campaigns.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(campaigns.len(), 2);
    assert_eq!(campaigns[0].id, "1");
    assert_eq!(campaigns[0].status, CampaignStatus::Sent);
    assert_eq!(campaigns[1].group_ids.len(), 2);
    assert_eq!(campaigns[1].status, CampaignStatus::Unknown);
}

#[tokio::test]
async fn test_schedule_sends_campaign_payload() {
    let ctx = TestContext::new().await;
    ctx.backend.mock_action(paths::CAMPAIGNS, "schedule", ack()).await;

    let campaign = NewCampaign {
        name: "Black Friday".to_string(),
        instance_id: "i1".to_string(),
        template_id: "t1".to_string(),
        group_ids: ids(&["g1", "g2"]),
        scheduled_at: Utc.with_ymd_and_hms(2025, 11, 28, 11, 0, 0).unwrap(),
    };
    ctx.services.campaign_service.schedule(&campaign).await.unwrap();

    let bodies = ctx.backend.received_actions(paths::CAMPAIGNS, "schedule").await;
    assert_eq!(
        bodies[0]["campaign"],
        json!({
            "name": "Black Friday",
            "instanceId": "i1",
            "templateId": "t1",
            "groupIds": ["g1", "g2"],
            "scheduledAt": "2025-11-28T11:00:00Z"
        })
    );
}

#[tokio::test]
async fn test_update_rejects_empty_group_list() {
    let ctx = TestContext::new().await;

    let patch = CampaignPatch {
        group_ids: Some(vec![]),
        ..Default::default()
    };
    let result = ctx.services.campaign_service.update("c1", &patch).await;

    assert_matches!(result, Err(ZapError::InvalidInput(_)));
}
