//! Agent API tests

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{Request, StatusCode};
use secrecy::SecretString;
use tower::ServiceExt;

use deploy_agent::deploy::pipeline::DeploymentPipeline;
use deploy_agent::deploy::workspace::FsWorkspaceManager;
use deploy_agent::models::deployment::{DeploymentAccepted, DeploymentStatus};
use deploy_agent::server::handlers::{ErrorResponse, HealthResponse};
use deploy_agent::server::serve::router;
use deploy_agent::server::state::ServerState;

use crate::common::{FakeExecutor, RecordingReporter};

const API_KEY: &str = "agent-key";

struct Harness {
    app: Router,
    reporter: Arc<RecordingReporter>,
    executor: Arc<FakeExecutor>,
    _root: tempfile::TempDir,
}

fn harness() -> Harness {
    let root = tempfile::tempdir().unwrap();
    let reporter = Arc::new(RecordingReporter::default());
    let executor = Arc::new(FakeExecutor::succeeding("ok"));
    let pipeline = Arc::new(DeploymentPipeline::new(
        Arc::new(FsWorkspaceManager::new(root.path())),
        executor.clone(),
        reporter.clone(),
    ));
    let state = ServerState::new(SecretString::from(API_KEY.to_string()), pipeline);

    Harness {
        app: router(Arc::new(state)),
        reporter,
        executor,
        _root: root,
    }
}

fn deploy_request(authorization: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/deploy")
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

const VALID_BODY: &str =
    r#"{"deploymentId": 42, "name": "web", "dockerCompose": "version: '3'", "envVars": {}}"#;

async fn wait_for_terminal(reporter: &RecordingReporter, deployment_id: i64) -> Vec<DeploymentStatus> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let statuses: Vec<_> = reporter
                .reports()
                .into_iter()
                .filter(|r| r.deployment_id == deployment_id)
                .map(|r| r.status)
                .collect();
            if statuses.last().is_some_and(|s| s.is_terminal()) {
                return statuses;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("deployment did not finish")
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let response = h
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_deploy_requires_bearer_token() {
    let h = harness();

    for authorization in [None, Some("Bearer wrong"), Some(API_KEY), Some("bearer agent-key")] {
        let response = h
            .app
            .clone()
            .oneshot(deploy_request(authorization, VALID_BODY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{:?}", authorization);
    }

    assert!(h.executor.calls().is_empty());
    assert!(h.reporter.reports().is_empty());
}

#[tokio::test]
async fn test_unauthorized_checked_before_body() {
    let h = harness();
    let response = h
        .app
        .oneshot(deploy_request(Some("Bearer wrong"), "not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let h = harness();
    let auth = format!("Bearer {}", API_KEY);

    for body in ["not json", r#"{"name": "web"}"#, r#"{"deploymentId": "x", "name": "web", "dockerCompose": "a"}"#] {
        let response = h
            .app
            .clone()
            .oneshot(deploy_request(Some(&auth), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error.error, "Invalid request body");
    }
}

#[tokio::test]
async fn test_invalid_stack_name_is_bad_request() {
    let h = harness();
    let auth = format!("Bearer {}", API_KEY);
    let body = r#"{"deploymentId": 1, "name": "web; rm -rf /", "dockerCompose": "a"}"#;

    let response = h
        .app
        .oneshot(deploy_request(Some(&auth), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deploy_acknowledges_then_runs_in_background() {
    let h = harness();
    let auth = format!("Bearer {}", API_KEY);

    let response = h
        .app
        .oneshot(deploy_request(Some(&auth), VALID_BODY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let accepted: DeploymentAccepted = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(accepted.message, "Deployment initiated");
    assert_eq!(accepted.deployment_id, "42");

    let statuses = wait_for_terminal(&h.reporter, 42).await;
    assert_eq!(statuses.last(), Some(&DeploymentStatus::Deployed));
    assert_eq!(h.executor.calls().len(), 1);
}

#[tokio::test]
async fn test_null_env_vars_accepted() {
    let h = harness();
    let auth = format!("Bearer {}", API_KEY);
    let body = r#"{"deploymentId": 43, "name": "shop.v2", "dockerCompose": "a", "envVars": null}"#;

    let response = h
        .app
        .oneshot(deploy_request(Some(&auth), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let statuses = wait_for_terminal(&h.reporter, 43).await;
    assert_eq!(statuses.last(), Some(&DeploymentStatus::Deployed));
}

#[tokio::test]
async fn test_get_deploy_not_allowed() {
    let h = harness();
    let response = h
        .app
        .oneshot(Request::builder().uri("/deploy").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
