//! Integration tests for the `smokecheck` binary
//!
//! Tests:
//! - Exit code and verdict line for passing and failing runs
//! - SMOKECHECK_* environment variables and their precedence
//! - Invalid environment values

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{
    mount_health, mount_login, mount_settings, mount_sites, run_smokecheck,
    start_healthy_service, TEST_TOKEN,
};

#[tokio::test]
async fn test_healthy_service_exits_zero() {
    let server = start_healthy_service().await;

    let run = run_smokecheck(&["--base-url", &server.uri(), "--no-color"], &[]).await;

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert!(run.stdout.contains("ALL TESTS PASSED!"), "stdout: {}", run.stdout);
}

#[tokio::test]
async fn test_missing_token_exits_one() {
    let server = MockServer::start().await;
    mount_login(&server, ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .await;

    let run = run_smokecheck(&["--base-url", &server.uri(), "--no-color"], &[]).await;

    assert_eq!(run.code, Some(1), "stderr: {}", run.stderr);
    assert!(!run.stdout.contains("ALL TESTS PASSED"));
    assert!(run.stdout.contains("1 of 4 steps failed, 3 skipped"), "stdout: {}", run.stdout);
}

#[tokio::test]
async fn test_json_output_reports_verdict() {
    let server = start_healthy_service().await;

    let run = run_smokecheck(&["--base-url", &server.uri(), "--output", "json"], &[]).await;

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    let report: serde_json::Value = serde_json::from_str(&run.stdout).unwrap();
    assert_eq!(report["passed"], true);
    assert_eq!(report["steps"].as_array().map(|s| s.len()), Some(4));
}

#[tokio::test]
async fn test_base_url_from_env() {
    let server = start_healthy_service().await;
    let base_url = server.uri();

    let run = run_smokecheck(&["--no-color"], &[("SMOKECHECK_BASE_URL", base_url.as_str())]).await;

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
    assert!(run.stdout.contains(&format!("Target: {}", base_url)));
}

#[tokio::test]
async fn test_base_url_flag_over_env() {
    let server = start_healthy_service().await;

    let run = run_smokecheck(
        &["--base-url", &server.uri(), "--no-color"],
        &[("SMOKECHECK_BASE_URL", "http://127.0.0.1:1")],
    )
    .await;

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
}

#[tokio::test]
async fn test_credentials_from_env_and_flags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/keycloak-login"))
        .and(body_partial_json(json!({
            "keycloak_token": "env-kc-token",
            "user_info": {
                "email": "env@example.com",
                "name": "flag-name",
                "sub": "6f1c2a94-0b7e-4c55-9d1e-3a2f8b7c6d10"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TEST_TOKEN })))
        .mount(&server)
        .await;
    mount_settings(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "configured": true })),
    )
    .await;
    mount_health(&server, ResponseTemplate::new(200)).await;
    mount_sites(&server, ResponseTemplate::new(200)).await;

    let run = run_smokecheck(
        &["--base-url", &server.uri(), "--name", "flag-name", "--no-color"],
        &[
            ("SMOKECHECK_KEYCLOAK_TOKEN", "env-kc-token"),
            ("SMOKECHECK_EMAIL", "env@example.com"),
            ("SMOKECHECK_NAME", "env-name"),
            ("SMOKECHECK_SUB", "6f1c2a94-0b7e-4c55-9d1e-3a2f8b7c6d10"),
        ],
    )
    .await;

    assert_eq!(run.code, Some(0), "stdout: {}\nstderr: {}", run.stdout, run.stderr);
}

#[tokio::test]
async fn test_invalid_timeout_env_fails() {
    let run = run_smokecheck(
        &["--base-url", "http://127.0.0.1:1"],
        &[("SMOKECHECK_TIMEOUT", "soon")],
    )
    .await;

    assert_ne!(run.code, Some(0));
    assert!(run.stderr.contains("Invalid SMOKECHECK_TIMEOUT value"), "stderr: {}", run.stderr);
    assert!(run.stdout.is_empty());
}

#[tokio::test]
async fn test_invalid_sub_env_fails() {
    let run = run_smokecheck(
        &["--base-url", "http://127.0.0.1:1"],
        &[("SMOKECHECK_SUB", "not-a-uuid")],
    )
    .await;

    assert_ne!(run.code, Some(0));
    assert!(run.stderr.contains("Subject identifier is not a UUID"), "stderr: {}", run.stderr);
}

#[tokio::test]
async fn test_timeout_flag_over_invalid_env() {
    let server = start_healthy_service().await;

    let run = run_smokecheck(
        &["--base-url", &server.uri(), "--timeout", "5", "--no-color"],
        &[("SMOKECHECK_TIMEOUT", "soon")],
    )
    .await;

    assert_eq!(run.code, Some(0), "stderr: {}", run.stderr);
}
