//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::deploy::executor::DockerStackExecutor;
use crate::deploy::pipeline::DeploymentPipeline;
use crate::deploy::reporter::HttpDeploymentReporter;
use crate::deploy::workspace::FsWorkspaceManager;
use crate::errors::AgentError;
use crate::http::client::HttpClient;

/// Main application state
pub struct AppState {
    /// HTTP client for admin panel communication
    pub http_client: Arc<HttpClient>,

    /// Deployment pipeline shared by all requests
    pub pipeline: Arc<DeploymentPipeline>,
}

impl AppState {
    /// Initialize application state
    pub fn init(options: &AppOptions) -> Result<Self, AgentError> {
        info!("Initializing application state...");

        let http_client = Arc::new(HttpClient::new(
            &options.admin_panel_url,
            options.api_key.clone(),
            options.request_timeout,
        )?);

        let pipeline = Arc::new(DeploymentPipeline::new(
            Arc::new(FsWorkspaceManager::new(&options.deployer.workspace_root)),
            Arc::new(DockerStackExecutor::new(
                &options.deployer.orchestrator,
                options.deployer.deploy_timeout,
            )),
            Arc::new(HttpDeploymentReporter::new(http_client.clone())),
        ));

        Ok(Self {
            http_client,
            pipeline,
        })
    }
}
