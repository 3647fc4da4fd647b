//! Stack deployment through the external orchestrator

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::deploy::workspace::MANIFEST_FILE;
use crate::errors::AgentError;

/// Captured output of a successful stack deploy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the orchestrator against a prepared workspace
#[async_trait]
pub trait StackExecutor: Send + Sync {
    /// Human readable command line used for `stack_name`
    fn describe(&self, stack_name: &str) -> String;

    /// Deploy the stack in `workspace`. A failing command yields
    /// [`AgentError::ExecutionError`] carrying its stderr.
    async fn deploy(&self, workspace: &Path, stack_name: &str) -> Result<StackOutput, AgentError>;
}

/// `docker stack deploy` executor
#[derive(Debug, Clone)]
pub struct DockerStackExecutor {
    program: String,
    timeout: Option<Duration>,
}

impl DockerStackExecutor {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn args<'a>(&self, stack_name: &'a str) -> [&'a str; 5] {
        ["stack", "deploy", "-c", MANIFEST_FILE, stack_name]
    }
}

impl Default for DockerStackExecutor {
    fn default() -> Self {
        Self::new("docker", None)
    }
}

#[async_trait]
impl StackExecutor for DockerStackExecutor {
    fn describe(&self, stack_name: &str) -> String {
        format!("{} {}", self.program, self.args(stack_name).join(" "))
    }

    async fn deploy(&self, workspace: &Path, stack_name: &str) -> Result<StackOutput, AgentError> {
        info!("Deploying stack {} from {}", stack_name, workspace.display());

        let child = Command::new(&self.program)
            .args(self.args(stack_name))
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AgentError::ExecutionError {
                message: format!("failed to start {}: {}", self.program, e),
                stderr: String::new(),
            })?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                // Dropping the future drops the child, which kills it.
                Err(_) => {
                    return Err(AgentError::ExecutionError {
                        message: format!("timed out after {}s", limit.as_secs()),
                        stderr: String::new(),
                    })
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| AgentError::ExecutionError {
            message: format!("failed to wait for {}: {}", self.program, e),
            stderr: String::new(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let message = match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            };
            debug!("Stack deploy for {} failed: {}", stack_name, message);
            return Err(AgentError::ExecutionError { message, stderr });
        }

        Ok(StackOutput { stdout, stderr })
    }
}
