//! Utility functions

use colored::Colorize;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::deploy::workspace::FsWorkspaceManager;
use crate::filesys::dir::Dir;
use crate::storage::settings::Settings;

/// Version information for the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Result of a single diagnostic check
#[derive(Debug, Clone)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Check the orchestrator can be invoked and the workspace root is writable
pub async fn diagnose(settings: &Settings) -> Vec<Check> {
    let mut checks = Vec::new();

    let orchestrator = Command::new(&settings.orchestrator)
        .arg("version")
        .output()
        .await;
    checks.push(match orchestrator {
        Ok(output) if output.status.success() => Check {
            name: "orchestrator",
            passed: true,
            detail: format!("{} is available", settings.orchestrator),
        },
        Ok(output) => Check {
            name: "orchestrator",
            passed: false,
            detail: format!("{} version exited with {}", settings.orchestrator, output.status),
        },
        Err(e) => Check {
            name: "orchestrator",
            passed: false,
            detail: format!("failed to run {}: {}", settings.orchestrator, e),
        },
    });

    let root = FsWorkspaceManager::new(&settings.workspace_root);
    let probe = Dir::new(root.root()).subdir(&format!(".deploy-agent-probe-{}", std::process::id()));
    let writable = match probe.create_all().await {
        Ok(()) => probe.delete().await,
        Err(e) => Err(e),
    };
    checks.push(Check {
        name: "workspace root",
        passed: writable.is_ok(),
        detail: match writable {
            Ok(()) => format!("{} is writable", root.root().display()),
            Err(e) => format!("{} is not writable: {}", root.root().display(), e),
        },
    });

    checks
}

/// Print diagnostic results, returning whether every check passed
pub async fn run_diagnostic(settings: &Settings) -> bool {
    let version = version_info();
    println!(
        "{} {} ({})",
        "deploy-agent".bold(),
        version.version,
        version.git_hash
    );
    println!("admin panel: {}", settings.admin_panel_url.cyan());
    println!("node id:     {}", settings.vps_id.cyan());

    let checks = diagnose(settings).await;
    for check in &checks {
        let mark = if check.passed {
            "ok".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!("[{}] {}: {}", mark, check.name, check.detail);
    }

    checks.iter().all(|check| check.passed)
}
