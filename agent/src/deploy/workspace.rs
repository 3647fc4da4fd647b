//! Per-deployment workspaces
//!
//! Each deployment gets its own directory under a shared root, named after
//! the deployment ID. The stack manifest and optional `.env` file are
//! materialised there for the orchestrator, and the directory is removed
//! when the owning [`WorkspaceGuard`] is dropped.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::AgentError;
use crate::filesys::dir::Dir;

/// Manifest file name inside a workspace
pub const MANIFEST_FILE: &str = "docker-compose.yml";

/// Environment file name inside a workspace
pub const ENV_FILE: &str = ".env";

/// Directory name for a deployment's workspace
pub fn workspace_name(deployment_id: i64) -> String {
    format!("deploy-{}", deployment_id)
}

/// Render environment variables as `KEY=VALUE` lines. Values are written verbatim.
pub fn render_env_file(env_vars: &BTreeMap<String, String>) -> String {
    env_vars
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}

/// Underlying OS error text, without the `IO error:` prefix
fn io_detail(e: &AgentError) -> String {
    match e {
        AgentError::IoError(io) => io.to_string(),
        other => other.to_string(),
    }
}

/// Creates, fills and removes deployment workspaces
#[async_trait]
pub trait WorkspaceManager: Send + Sync {
    /// Create the workspace for `deployment_id` and write the manifest into it.
    /// On error nothing is left behind.
    async fn prepare(
        &self,
        deployment_id: i64,
        stack_definition: &str,
    ) -> Result<PathBuf, AgentError>;

    /// Write the environment file. Does nothing when `env_vars` is empty.
    async fn write_env(
        &self,
        workspace: &Path,
        env_vars: &BTreeMap<String, String>,
    ) -> Result<(), AgentError>;

    /// Remove the workspace and everything in it
    fn cleanup(&self, workspace: &Path);
}

/// A prepared workspace, removed when dropped
pub struct WorkspaceGuard {
    manager: Arc<dyn WorkspaceManager>,
    path: PathBuf,
}

impl WorkspaceGuard {
    /// Prepare a workspace and take ownership of its cleanup
    pub async fn acquire(
        manager: Arc<dyn WorkspaceManager>,
        deployment_id: i64,
        stack_definition: &str,
    ) -> Result<Self, AgentError> {
        let path = manager.prepare(deployment_id, stack_definition).await?;
        Ok(Self { manager, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the environment file into this workspace
    pub async fn write_env(&self, env_vars: &BTreeMap<String, String>) -> Result<(), AgentError> {
        self.manager.write_env(&self.path, env_vars).await
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        self.manager.cleanup(&self.path);
    }
}

/// Workspaces as directories on the local filesystem
#[derive(Debug, Clone)]
pub struct FsWorkspaceManager {
    root: Dir,
}

impl FsWorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Dir::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Path the workspace for `deployment_id` lives at
    pub fn workspace_path(&self, deployment_id: i64) -> PathBuf {
        self.root.path().join(workspace_name(deployment_id))
    }
}

#[async_trait]
impl WorkspaceManager for FsWorkspaceManager {
    async fn prepare(
        &self,
        deployment_id: i64,
        stack_definition: &str,
    ) -> Result<PathBuf, AgentError> {
        self.root.create_all().await.map_err(|e| {
            AgentError::WorkspaceError(format!(
                "Failed to create workspace root {}: {}",
                self.root.path().display(),
                io_detail(&e)
            ))
        })?;

        let dir = self.root.subdir(&workspace_name(deployment_id));
        if let Err(e) = dir.create_new().await {
            let message = match e {
                AgentError::IoError(ref io) if io.kind() == ErrorKind::AlreadyExists => format!(
                    "Workspace {} is already in use",
                    dir.path().display()
                ),
                e => format!("Failed to create work directory: {}", io_detail(&e)),
            };
            return Err(AgentError::WorkspaceError(message));
        }

        if let Err(e) = dir.file(MANIFEST_FILE).write_string(stack_definition).await {
            if let Err(cleanup_err) = dir.delete().await {
                warn!(
                    "Failed to remove partial workspace {}: {}",
                    dir.path().display(),
                    cleanup_err
                );
            }
            return Err(AgentError::WorkspaceError(format!(
                "Failed to write compose file: {}",
                io_detail(&e)
            )));
        }

        debug!("Prepared workspace {}", dir.path().display());
        Ok(dir.path().to_path_buf())
    }

    async fn write_env(
        &self,
        workspace: &Path,
        env_vars: &BTreeMap<String, String>,
    ) -> Result<(), AgentError> {
        if env_vars.is_empty() {
            return Ok(());
        }

        Dir::new(workspace)
            .file(ENV_FILE)
            .write_string(&render_env_file(env_vars))
            .await
            .map_err(|e| {
                AgentError::WorkspaceError(format!("Failed to write env file: {}", io_detail(&e)))
            })
    }

    // Blocking removal on the dropping thread: the workspace is gone once the
    // guard is, and workspaces hold only a manifest and an env file.
    fn cleanup(&self, workspace: &Path) {
        match Dir::new(workspace).delete_blocking() {
            Ok(()) => debug!("Removed workspace {}", workspace.display()),
            Err(e) => warn!("Failed to remove workspace {}: {}", workspace.display(), e),
        }
    }
}
