// Background poll worker: fetch -> decode -> project once per interval.
// It is the only writer of the metric store.

use crate::config::OnError;
use crate::error::CycleError;
use crate::metrics::ExporterMetrics;
use crate::projector::{self, ProjectionSummary};
use crate::tdarr_client::TdarrClient;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

/// Client, metric store and shutdown for the worker.
pub struct WorkerDeps {
    pub client: Arc<TdarrClient>,
    pub metrics: ExporterMetrics,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Poll timing and failure policy.
pub struct WorkerConfig {
    pub interval: Duration,
    pub on_error: OnError,
    pub cardinality_warn_threshold: usize,
}

/// Runs one poll cycle. Nothing from a failed cycle is written to `metrics`.
pub async fn run_cycle(
    client: &TdarrClient,
    metrics: &ExporterMetrics,
) -> Result<ProjectionSummary, CycleError> {
    let snapshot = client.fetch_stats().await?;
    let summary = projector::project(&snapshot, metrics)?;
    Ok(summary)
}

/// Spawns the poll loop. The first poll happens immediately.
///
/// Resolves to `Ok(())` on shutdown, or to the failing cycle's error when the policy is
/// [`OnError::Exit`].
pub fn spawn(
    deps: WorkerDeps,
    config: WorkerConfig,
) -> tokio::task::JoinHandle<Result<(), CycleError>> {
    let WorkerDeps {
        client,
        metrics,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        interval: poll_interval,
        on_error,
        cardinality_warn_threshold,
    } = config;

    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "worker",
        interval_ms = poll_interval.as_millis() as u64
    );

    tokio::spawn(
        async move {
            let mut tick = interval(poll_interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut cycles_ok: u64 = 0;
            let mut cycles_failed: u64 = 0;

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        tracing::info!(url = client.url(), "getting stats");
                        match run_cycle(&client, &metrics).await {
                            Ok(summary) => {
                                cycles_ok += 1;
                                tracing::info!(
                                    libraries = summary.libraries,
                                    breakdown_samples = summary.breakdown_samples,
                                    languages = summary.languages,
                                    cycles_ok,
                                    cycles_failed,
                                    "stats exported"
                                );
                                if summary.labeled_samples() > cardinality_warn_threshold {
                                    tracing::warn!(
                                        labeled_samples = summary.labeled_samples(),
                                        threshold = cardinality_warn_threshold,
                                        "label cardinality above threshold"
                                    );
                                }
                            }
                            Err(e) => {
                                cycles_failed += 1;
                                match on_error {
                                    OnError::Exit => {
                                        tracing::error!(error = %e, operation = "poll_cycle", "error getting stats");
                                        return Err(e);
                                    }
                                    OnError::Continue => {
                                        tracing::warn!(
                                            error = %e,
                                            operation = "poll_cycle",
                                            cycles_failed,
                                            "poll cycle failed; retrying next interval"
                                        );
                                    }
                                }
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Worker shutting down");
                        break;
                    }
                }
            }
            Ok(())
        }
        .instrument(worker_span),
    )
}
