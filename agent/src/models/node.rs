//! Node status models

use serde::{Deserialize, Serialize};

/// Periodic health snapshot of this host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub containers: Vec<String>,
}
