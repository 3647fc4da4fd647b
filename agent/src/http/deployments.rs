//! Deployment API client

use crate::errors::AgentError;
use crate::http::client::HttpClient;
use crate::models::deployment::DeploymentStatusUpdate;

impl HttpClient {
    /// Push a deployment's status and its full log so far
    pub async fn update_deployment_status(
        &self,
        deployment_id: i64,
        update: &DeploymentStatusUpdate<'_>,
    ) -> Result<(), AgentError> {
        let path = format!("/api/deployments/{}/status", deployment_id);
        self.post_json(&path, update).await
    }
}
