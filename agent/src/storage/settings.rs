//! Settings file management

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::errors::AgentError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Default location of the agent configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/deploy-dashboard-agent/config.json";

/// Agent settings, loaded once at startup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Base URL of the admin panel
    #[serde(alias = "adminPanelURL", alias = "AdminPanelURL")]
    pub admin_panel_url: String,

    /// ID of this node in the admin panel
    #[serde(alias = "vpsID", alias = "VPSID")]
    pub vps_id: String,

    /// Shared secret for both inbound and outbound bearer auth
    #[serde(alias = "APIKey", deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,

    /// Node status report interval in seconds
    #[serde(default = "default_report_interval", alias = "ReportInterval")]
    pub report_interval: u64,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Emit JSON formatted logs on stdout
    #[serde(default)]
    pub json_logs: bool,

    /// Host the deploy API binds to
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    /// Port the deploy API binds to
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Root under which per-deployment workspaces are created
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Orchestrator program
    #[serde(default = "default_orchestrator")]
    pub orchestrator: String,

    /// Upper bound on a single stack deploy, unbounded when absent
    #[serde(default)]
    pub deploy_timeout_secs: Option<u64>,

    /// Timeout for calls to the admin panel
    #[serde(default = "default_report_timeout")]
    pub report_timeout_secs: u64,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::from(raw))
}

fn default_report_interval() -> u64 {
    30
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    9090
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir()
}

fn default_orchestrator() -> String {
    "docker".to_string()
}

fn default_report_timeout() -> u64 {
    10
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref();
        let settings: Settings = File::new(path).read_json().await.map_err(|e| {
            AgentError::ConfigError(format!("failed to load {}: {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the agent cannot run with
    pub fn validate(&self) -> Result<(), AgentError> {
        Url::parse(&self.admin_panel_url).map_err(|e| {
            AgentError::ConfigError(format!(
                "invalid adminPanelUrl {:?}: {}",
                self.admin_panel_url, e
            ))
        })?;

        if self.vps_id.trim().is_empty() {
            return Err(AgentError::ConfigError("vpsId must not be empty".to_string()));
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(AgentError::ConfigError("apiKey must not be empty".to_string()));
        }
        if self.report_interval == 0 {
            return Err(AgentError::ConfigError(
                "reportInterval must be greater than zero".to_string(),
            ));
        }
        if self.report_timeout_secs == 0 {
            return Err(AgentError::ConfigError(
                "reportTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval)
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }

    pub fn deploy_timeout(&self) -> Option<Duration> {
        self.deploy_timeout_secs.map(Duration::from_secs)
    }
}
