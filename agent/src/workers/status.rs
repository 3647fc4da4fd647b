//! Node status reporting worker

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::http::client::HttpClient;
use crate::models::node::StatusReport;
use crate::telemetry::collect_status_report;

/// Status worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Reporting interval
    pub interval: Duration,

    /// ID of this node in the admin panel
    pub vps_id: String,

    /// Orchestrator program used to list containers
    pub orchestrator: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            vps_id: String::new(),
            orchestrator: "docker".to_string(),
        }
    }
}

/// Run the status worker: report now, then once per interval until shutdown
pub async fn run<S, F>(
    options: &Options,
    http_client: &HttpClient,
    sleep_fn: S,
    shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    run_with(
        options,
        || collect_status_report(&options.orchestrator),
        |report| async move {
            http_client
                .report_node_status(&options.vps_id, &report)
                .await
                .map_err(|e| e.to_string())
        },
        sleep_fn,
        shutdown_signal,
    )
    .await
}

/// Worker loop with injectable sampling and sending
pub async fn run_with<C, CF, P, PF, S, F>(
    options: &Options,
    collect: C,
    send: P,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    C: Fn() -> CF,
    CF: Future<Output = StatusReport>,
    P: Fn(StatusReport) -> PF,
    PF: Future<Output = Result<(), String>>,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Status worker starting...");

    loop {
        let report = tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!("Status worker shutting down...");
                return;
            }
            report = collect() => report,
        };

        match send(report).await {
            Ok(()) => debug!("Status reported"),
            Err(e) => error!("Failed to report status: {}", e),
        }

        tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!("Status worker shutting down...");
                return;
            }
            _ = sleep_fn(options.interval) => {
                // Continue with next report
            }
        }
    }
}
