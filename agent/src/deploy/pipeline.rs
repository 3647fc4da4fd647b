//! Deployment pipeline
//!
//! Drives one deployment request through workspace preparation, the stack
//! deploy and status reporting. Every milestone appends to the deployment's
//! log and reports the current status together with the whole log so far.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::deploy::executor::StackExecutor;
use crate::deploy::fsm::{DeploymentEvent, DeploymentFsm};
use crate::deploy::reporter::DeploymentReporter;
use crate::deploy::workspace::{WorkspaceGuard, WorkspaceManager};
use crate::models::deployment::{DeploymentLog, DeploymentRequest, DeploymentStatus};

/// Runs deployments against injected collaborators
pub struct DeploymentPipeline {
    workspaces: Arc<dyn WorkspaceManager>,
    executor: Arc<dyn StackExecutor>,
    reporter: Arc<dyn DeploymentReporter>,
}

impl DeploymentPipeline {
    pub fn new(
        workspaces: Arc<dyn WorkspaceManager>,
        executor: Arc<dyn StackExecutor>,
        reporter: Arc<dyn DeploymentReporter>,
    ) -> Self {
        Self {
            workspaces,
            executor,
            reporter,
        }
    }

    /// Run a deployment on its own task. The caller does not have to await it.
    pub fn spawn(self: &Arc<Self>, request: DeploymentRequest) -> JoinHandle<DeploymentStatus> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run(request).await })
    }

    /// Run a deployment to completion and return its terminal status
    pub async fn run(&self, request: DeploymentRequest) -> DeploymentStatus {
        let id = request.deployment_id;
        info!("Starting deployment {} ({})", id, request.name);

        let mut run = DeploymentRun::new(id, self.reporter.as_ref());
        run.start(DeploymentLog::info("Starting deployment")).await;

        let workspace = match WorkspaceGuard::acquire(
            self.workspaces.clone(),
            id,
            &request.docker_compose,
        )
        .await
        {
            Ok(workspace) => workspace,
            Err(e) => return run.fail(vec![DeploymentLog::error(e.to_string())]).await,
        };

        run.progress(DeploymentLog::info("Docker compose file created"))
            .await;

        if !request.env_vars.is_empty() {
            if let Err(e) = workspace.write_env(&request.env_vars).await {
                return run.fail(vec![DeploymentLog::error(e.to_string())]).await;
            }
            run.push(DeploymentLog::info("Environment variables configured"));
        }

        let command = self.executor.describe(&request.name);
        run.progress(DeploymentLog::info(format!("Executing: {}", command)))
            .await;

        match self.executor.deploy(workspace.path(), &request.name).await {
            Ok(output) => {
                if !output.stdout.is_empty() {
                    run.push(DeploymentLog::info(output.stdout));
                }
                run.succeed(DeploymentLog::info("Deployment completed successfully"))
                    .await
            }
            Err(e) => {
                let mut entries = vec![DeploymentLog::error(format!("Deployment failed: {}", e))];
                if let Some(stderr) = e.stderr() {
                    entries.push(DeploymentLog::error(stderr));
                }
                run.fail(entries).await
            }
        }
        // `workspace` is dropped here, after the final report.
    }
}

/// Log and state of one in-flight deployment
struct DeploymentRun<'a> {
    deployment_id: i64,
    fsm: DeploymentFsm,
    logs: Vec<DeploymentLog>,
    reporter: &'a dyn DeploymentReporter,
}

impl<'a> DeploymentRun<'a> {
    fn new(deployment_id: i64, reporter: &'a dyn DeploymentReporter) -> Self {
        Self {
            deployment_id,
            fsm: DeploymentFsm::new(),
            logs: Vec::new(),
            reporter,
        }
    }

    fn push(&mut self, entry: DeploymentLog) {
        self.logs.push(entry);
    }

    async fn start(&mut self, entry: DeploymentLog) {
        self.transition(DeploymentEvent::Start);
        self.progress(entry).await;
    }

    async fn progress(&mut self, entry: DeploymentLog) {
        self.push(entry);
        self.report().await;
    }

    async fn succeed(&mut self, entry: DeploymentLog) -> DeploymentStatus {
        self.push(entry);
        self.transition(DeploymentEvent::Succeed);
        info!("Deployment {} completed", self.deployment_id);
        self.report().await
    }

    async fn fail(&mut self, entries: Vec<DeploymentLog>) -> DeploymentStatus {
        let reason = entries
            .first()
            .map(|entry| entry.message.clone())
            .unwrap_or_default();
        error!("Deployment {} failed: {}", self.deployment_id, reason);

        self.logs.extend(entries);
        self.transition(DeploymentEvent::Fail(reason));
        self.report().await
    }

    fn transition(&mut self, event: DeploymentEvent) {
        if let Err(e) = self.fsm.process(event) {
            error!("Deployment {}: {}", self.deployment_id, e);
        }
    }

    async fn report(&self) -> DeploymentStatus {
        let status = self.fsm.state().status().unwrap_or(DeploymentStatus::Deploying);
        self.reporter
            .report(self.deployment_id, status, &self.logs)
            .await;
        status
    }
}
