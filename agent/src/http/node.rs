//! Node status API client

use crate::errors::AgentError;
use crate::http::client::HttpClient;
use crate::models::node::StatusReport;

impl HttpClient {
    /// Report this node's health snapshot
    pub async fn report_node_status(
        &self,
        vps_id: &str,
        report: &StatusReport,
    ) -> Result<(), AgentError> {
        let path = format!("/api/vps/{}/status", vps_id);
        self.post_json(&path, report).await
    }
}
