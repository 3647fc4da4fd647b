//! Error types for the deploy agent

use thiserror::Error;

/// Main error type for the deploy agent
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Message is reported to the admin panel as-is
    #[error("{0}")]
    WorkspaceError(String),

    /// The orchestration command could not be started or exited unsuccessfully.
    /// `stderr` carries whatever the command wrote before failing.
    #[error("{message}")]
    ExecutionError { message: String, stderr: String },

    #[error("Reporting error: {0}")]
    ReportingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}

impl AgentError {
    /// Captured stderr of a failed orchestration command, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            AgentError::ExecutionError { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}
