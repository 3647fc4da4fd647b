//! Deployment status reporting

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::http::client::HttpClient;
use crate::models::deployment::{DeploymentLog, DeploymentStatus, DeploymentStatusUpdate};

/// Pushes deployment progress to the admin panel.
///
/// Reporting is best effort: implementations log failures and never
/// return them, so a lost update cannot change a deployment's outcome.
#[async_trait]
pub trait DeploymentReporter: Send + Sync {
    async fn report(&self, deployment_id: i64, status: DeploymentStatus, logs: &[DeploymentLog]);
}

/// Reporter backed by the admin panel HTTP API
pub struct HttpDeploymentReporter {
    http_client: Arc<HttpClient>,
}

impl HttpDeploymentReporter {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl DeploymentReporter for HttpDeploymentReporter {
    async fn report(&self, deployment_id: i64, status: DeploymentStatus, logs: &[DeploymentLog]) {
        let update = DeploymentStatusUpdate { status, logs };
        match self
            .http_client
            .update_deployment_status(deployment_id, &update)
            .await
        {
            Ok(()) => debug!(
                "Reported deployment {} as {} ({} log entries)",
                deployment_id,
                status,
                logs.len()
            ),
            Err(e) => warn!(
                "Failed to update deployment {} status to {}: {}",
                deployment_id, status, e
            ),
        }
    }
}
