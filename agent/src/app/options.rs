//! Application configuration options

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::storage::settings::Settings;
use crate::workers::status;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Admin panel base URL
    pub admin_panel_url: String,

    /// Shared API key
    pub api_key: SecretString,

    /// Timeout for each admin panel call
    pub request_timeout: Duration,

    /// Server configuration
    pub server: ServerOptions,

    /// Deployment configuration
    pub deployer: DeployerOptions,

    /// Status worker options
    pub status_worker: status::Options,
}

impl AppOptions {
    /// Derive runtime options from the loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            admin_panel_url: settings.admin_panel_url.clone(),
            api_key: settings.api_key.clone(),
            request_timeout: settings.report_timeout(),
            server: ServerOptions {
                host: settings.listen_host.clone(),
                port: settings.listen_port,
            },
            deployer: DeployerOptions {
                workspace_root: settings.workspace_root.clone(),
                orchestrator: settings.orchestrator.clone(),
                deploy_timeout: settings.deploy_timeout(),
            },
            status_worker: status::Options {
                interval: settings.report_interval(),
                vps_id: settings.vps_id.clone(),
                orchestrator: settings.orchestrator.clone(),
            },
        }
    }
}

/// Lifecycle options for the agent
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Deployment execution options
#[derive(Debug, Clone)]
pub struct DeployerOptions {
    /// Root directory for per-deployment workspaces
    pub workspace_root: PathBuf,

    /// Orchestrator program
    pub orchestrator: String,

    /// Upper bound on one stack deploy
    pub deploy_timeout: Option<Duration>,
}

impl Default for DeployerOptions {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir(),
            orchestrator: "docker".to_string(),
            deploy_timeout: None,
        }
    }
}

/// Agent HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9090,
        }
    }
}
