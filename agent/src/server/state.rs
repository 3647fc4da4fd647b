//! Server state

use std::sync::Arc;

use secrecy::SecretString;

use crate::deploy::pipeline::DeploymentPipeline;

/// Server state shared across handlers
pub struct ServerState {
    /// Key callers must present as a bearer token
    pub api_key: SecretString,

    /// Pipeline that runs accepted deployments
    pub pipeline: Arc<DeploymentPipeline>,
}

impl ServerState {
    pub fn new(api_key: SecretString, pipeline: Arc<DeploymentPipeline>) -> Self {
        Self { api_key, pipeline }
    }
}
