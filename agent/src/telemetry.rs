//! Host health sampling

use std::path::Path;

use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tokio::process::Command;
use tracing::debug;

use crate::models::node::StatusReport;

/// Resource usage of this host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemMetrics {
    /// CPU usage percentage (0-100)
    pub cpu_usage: f64,

    /// Memory usage percentage
    pub memory_percent: f64,

    /// Disk usage percentage of the root filesystem
    pub disk_percent: f64,
}

fn percent(used: u64, total: u64) -> f64 {
    if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Collect system metrics. Takes at least the sysinfo CPU sampling interval.
pub async fn collect_metrics() -> SystemMetrics {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let disks = Disks::new_with_refreshed_list();
    let root = disks
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"));

    // Without a root mount, fall back to the aggregate of every disk
    let (disk_used, disk_total) = match root {
        Some(disk) => (
            disk.total_space().saturating_sub(disk.available_space()),
            disk.total_space(),
        ),
        None => disks.iter().fold((0u64, 0u64), |(used, total), disk| {
            (
                used + disk.total_space().saturating_sub(disk.available_space()),
                total + disk.total_space(),
            )
        }),
    };

    SystemMetrics {
        cpu_usage: f64::from(sys.global_cpu_usage()),
        memory_percent: percent(sys.used_memory(), sys.total_memory()),
        disk_percent: percent(disk_used, disk_total),
    }
}

/// Names of running containers, empty when the orchestrator is unavailable
pub async fn list_containers(orchestrator: &str) -> Vec<String> {
    let output = match Command::new(orchestrator)
        .args(["ps", "--format", "{{.Names}}"])
        .output()
        .await
    {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!("{} ps exited with {}", orchestrator, output.status);
            return Vec::new();
        }
        Err(e) => {
            debug!("Failed to run {} ps: {}", orchestrator, e);
            return Vec::new();
        }
    };

    parse_container_names(&String::from_utf8_lossy(&output.stdout))
}

fn parse_container_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build a fresh status report for this host
pub async fn collect_status_report(orchestrator: &str) -> StatusReport {
    let metrics = collect_metrics().await;
    let containers = list_containers(orchestrator).await;

    StatusReport {
        status: "online".to_string(),
        cpu_usage: metrics.cpu_usage,
        memory_usage: metrics.memory_percent,
        disk_usage: metrics.disk_percent,
        containers,
    }
}
