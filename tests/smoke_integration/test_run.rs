//! Integration tests for full smoke-test runs

use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

use super::support::{
    mount_health, mount_login, mount_settings, mount_sites, refused_base_url, request_count,
    runner_for, start_healthy_service, TEST_TOKEN,
};

#[tokio::test]
async fn test_run_healthy_service_passes() {
    let server = start_healthy_service().await;
    let mut runner = runner_for(&server.uri());

    let outcome = runner.run().await;

    assert_eq!(outcome.steps.len(), 4);
    assert!(outcome.steps.iter().all(|s| s.passed), "steps: {:?}", outcome.steps);
    assert!(outcome.passed());
    assert_eq!(outcome.skipped().count(), 0);
    assert_eq!(runner.session().auth_token(), Some(TEST_TOKEN));

    let numbers: Vec<u8> = outcome.steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_run_aborts_when_token_missing() {
    let server = MockServer::start().await;
    mount_login(&server, ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .await;
    mount_settings(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "configured": true })),
    )
    .await;
    mount_health(&server, ResponseTemplate::new(200)).await;
    mount_sites(&server, ResponseTemplate::new(200)).await;

    let mut runner = runner_for(&server.uri());
    let outcome = runner.run().await;

    assert_eq!(outcome.steps.len(), 1);
    assert!(!outcome.steps[0].passed);
    assert_eq!(outcome.steps[0].error, Some("authentication"));
    assert!(!outcome.passed());
    assert_eq!(outcome.skipped().count(), 3);
    assert!(runner.session().auth_token().is_none());

    assert_eq!(request_count(&server, "/api/google-sheets/settings").await, 0);
    assert_eq!(request_count(&server, "/health").await, 0);
    assert_eq!(request_count(&server, "/api/wordpress/sites").await, 0);
}

#[tokio::test]
async fn test_run_continues_after_settings_failure() {
    let server = MockServer::start().await;
    mount_login(&server, ResponseTemplate::new(200).set_body_json(json!({ "token": TEST_TOKEN })))
        .await;
    mount_settings(&server, ResponseTemplate::new(200).set_body_string("not json")).await;
    mount_health(&server, ResponseTemplate::new(200)).await;
    mount_sites(&server, ResponseTemplate::new(404)).await;

    let outcome = runner_for(&server.uri()).run().await;

    assert_eq!(outcome.steps.len(), 4);
    assert!(outcome.steps[0].passed);
    assert!(!outcome.steps[1].passed);
    assert!(outcome.steps[2].passed);
    assert!(outcome.steps[3].passed);
    assert_eq!(outcome.steps[3].status, Some(404));
    assert_eq!(outcome.failed_count(), 1);
    assert!(!outcome.passed());
}

#[tokio::test]
async fn test_run_unreachable_service() {
    let outcome = runner_for(&refused_base_url()).run().await;

    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.steps[0].error, Some("connectivity"));
    assert!(!outcome.passed());
}

#[tokio::test]
async fn test_run_twice_starts_fresh_session() {
    let server = start_healthy_service().await;
    let mut runner = runner_for(&server.uri());

    assert!(runner.run().await.passed());
    assert!(runner.run().await.passed());
    assert_eq!(request_count(&server, "/api/auth/keycloak-login").await, 2);
}
