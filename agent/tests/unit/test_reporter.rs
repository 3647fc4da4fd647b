//! Reporter tests against an in-process admin panel

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use secrecy::SecretString;
use tokio::net::TcpListener;

use deploy_agent::deploy::reporter::{DeploymentReporter, HttpDeploymentReporter};
use deploy_agent::errors::AgentError;
use deploy_agent::http::client::HttpClient;
use deploy_agent::models::deployment::{DeploymentLog, DeploymentStatus};
use deploy_agent::models::node::StatusReport;

#[derive(Debug, Clone)]
struct Received {
    path: String,
    authorization: Option<String>,
    body: serde_json::Value,
}

#[derive(Clone)]
struct Panel {
    received: Arc<Mutex<Vec<Received>>>,
    status: StatusCode,
}

async fn deployment_status(
    State(panel): State<Panel>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, String) {
    record(&panel, format!("/api/deployments/{}/status", id), &headers, body);
    (panel.status, "panel says no".to_string())
}

async fn vps_status(
    State(panel): State<Panel>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, String) {
    record(&panel, format!("/api/vps/{}/status", id), &headers, body);
    (panel.status, String::new())
}

fn record(panel: &Panel, path: String, headers: &HeaderMap, body: serde_json::Value) {
    panel.received.lock().unwrap().push(Received {
        path,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
}

async fn start_panel(status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let panel = Panel {
        received: received.clone(),
        status,
    };
    let app = Router::new()
        .route("/api/deployments/{id}/status", post(deployment_status))
        .route("/api/vps/{id}/status", post(vps_status))
        .with_state(panel);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, received)
}

fn client(base_url: &str) -> Arc<HttpClient> {
    Arc::new(
        HttpClient::new(
            base_url,
            SecretString::from("panel-key".to_string()),
            Duration::from_secs(10),
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_report_posts_status_and_full_log() {
    let (addr, received) = start_panel(StatusCode::OK).await;
    let reporter = HttpDeploymentReporter::new(client(&format!("http://{}/", addr)));

    let logs = vec![
        DeploymentLog::info("Starting deployment"),
        DeploymentLog::info("Docker compose file created"),
    ];
    reporter.report(42, DeploymentStatus::Deploying, &logs).await;

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].path, "/api/deployments/42/status");
    assert_eq!(received[0].authorization.as_deref(), Some("Bearer panel-key"));
    assert_eq!(
        received[0].body,
        serde_json::json!({
            "status": "deploying",
            "logs": [
                {"level": "info", "message": "Starting deployment"},
                {"level": "info", "message": "Docker compose file created"}
            ]
        })
    );
}

#[tokio::test]
async fn test_rejected_report_is_swallowed() {
    let (addr, received) = start_panel(StatusCode::INTERNAL_SERVER_ERROR).await;
    let reporter = HttpDeploymentReporter::new(client(&format!("http://{}", addr)));

    reporter
        .report(7, DeploymentStatus::Failed, &[DeploymentLog::error("boom")])
        .await;

    // Single attempt, no retry
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_surfaces_non_success_as_reporting_error() {
    let (addr, _received) = start_panel(StatusCode::UNAUTHORIZED).await;
    let http_client = client(&format!("http://{}", addr));

    let err = http_client
        .report_node_status(
            "3",
            &StatusReport {
                status: "online".to_string(),
                cpu_usage: 0.0,
                memory_usage: 0.0,
                disk_usage: 0.0,
                containers: vec![],
            },
        )
        .await
        .unwrap_err();

    match err {
        AgentError::ReportingError(message) => assert!(message.contains("401")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_node_status_wire_format() {
    let (addr, received) = start_panel(StatusCode::OK).await;
    let http_client = client(&format!("http://{}", addr));

    tokio_test::assert_ok!(
        http_client
            .report_node_status(
                "3",
                &StatusReport {
                    status: "online".to_string(),
                    cpu_usage: 12.5,
                    memory_usage: 40.0,
                    disk_usage: 70.25,
                    containers: vec!["web_app.1".to_string()],
                },
            )
            .await
    );

    let received = received.lock().unwrap().clone();
    assert_eq!(received[0].path, "/api/vps/3/status");
    assert_eq!(
        received[0].body,
        serde_json::json!({
            "status": "online",
            "cpuUsage": 12.5,
            "memoryUsage": 40.0,
            "diskUsage": 70.25,
            "containers": ["web_app.1"]
        })
    );
}

#[tokio::test]
async fn test_unreachable_panel_does_not_panic() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reporter = HttpDeploymentReporter::new(client(&format!("http://{}", addr)));
    reporter
        .report(1, DeploymentStatus::Deploying, &[DeploymentLog::info("x")])
        .await;
}
