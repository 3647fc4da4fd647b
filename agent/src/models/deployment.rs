//! Deployment models

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AgentError;

/// A deployment request pushed by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    /// Caller-assigned deployment ID, unique per request
    pub deployment_id: i64,

    /// Stack name handed to the orchestrator
    pub name: String,

    /// Stack manifest, written verbatim
    pub docker_compose: String,

    /// Environment variables for the stack. Missing or `null` means none.
    #[serde(default, deserialize_with = "deserialize_env_vars")]
    pub env_vars: BTreeMap<String, String>,
}

fn deserialize_env_vars<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl DeploymentRequest {
    /// Check the request is something the orchestrator can act on
    pub fn validate(&self) -> Result<(), AgentError> {
        validate_stack_name(&self.name)?;
        if self.docker_compose.trim().is_empty() {
            return Err(AgentError::ValidationError(
                "dockerCompose must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stack names are ASCII alphanumerics, `-`, `_` and `.`, starting with an alphanumeric
pub fn validate_stack_name(name: &str) -> Result<(), AgentError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AgentError::ValidationError(format!(
            "invalid stack name: {:?}",
            name
        )))
    }
}

/// Deployment status reported to the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Deploying,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentStatus::Deployed | DeploymentStatus::Failed)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Deploying => write!(f, "deploying"),
            DeploymentStatus::Deployed => write!(f, "deployed"),
            DeploymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Severity of a deployment log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Error,
}

/// Log entry streamed to the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentLog {
    pub level: LogSeverity,
    pub message: String,
}

impl DeploymentLog {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogSeverity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: LogSeverity::Error,
            message: message.into(),
        }
    }
}

/// Status update body: the current status plus every log entry so far
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentStatusUpdate<'a> {
    pub status: DeploymentStatus,
    pub logs: &'a [DeploymentLog],
}

/// Acknowledgement returned by the deploy endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentAccepted {
    pub message: String,
    pub deployment_id: String,
}
