//! Finite state machine for a single deployment attempt

use crate::models::deployment::DeploymentStatus;

/// Deployment state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    /// Request accepted, nothing reported yet
    Received,

    /// Deployment in progress
    Deploying,

    /// Stack deployed
    Deployed,

    /// Deployment failed
    Failed,
}

impl DeploymentState {
    /// Status as reported to the admin panel, `None` before work starts
    pub fn status(&self) -> Option<DeploymentStatus> {
        match self {
            DeploymentState::Received => None,
            DeploymentState::Deploying => Some(DeploymentStatus::Deploying),
            DeploymentState::Deployed => Some(DeploymentStatus::Deployed),
            DeploymentState::Failed => Some(DeploymentStatus::Failed),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentState::Deployed | DeploymentState::Failed)
    }
}

/// Deployment event
#[derive(Debug, Clone)]
pub enum DeploymentEvent {
    /// Begin working on the request
    Start,

    /// The orchestrator accepted the stack
    Succeed,

    /// Any step failed
    Fail(String),
}

/// Deployment FSM
#[derive(Debug, Clone)]
pub struct DeploymentFsm {
    state: DeploymentState,
    error: Option<String>,
}

impl DeploymentFsm {
    /// Create a new FSM in received state
    pub fn new() -> Self {
        Self {
            state: DeploymentState::Received,
            error: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> DeploymentState {
        self.state
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: DeploymentEvent) -> Result<DeploymentState, String> {
        let new_state = match (&self.state, &event) {
            (DeploymentState::Received, DeploymentEvent::Start) => DeploymentState::Deploying,
            (DeploymentState::Deploying, DeploymentEvent::Succeed) => DeploymentState::Deployed,
            (DeploymentState::Deploying, DeploymentEvent::Fail(err)) => {
                self.error = Some(err.clone());
                DeploymentState::Failed
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(new_state)
    }
}

impl Default for DeploymentFsm {
    fn default() -> Self {
        Self::new()
    }
}
