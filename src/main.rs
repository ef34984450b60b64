use anyhow::Result;
use std::sync::Arc;
use tdarr_exporter::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let app_config = config::AppConfig::load()?;

    // RUST_LOG wins over LOG_LEVEL.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::builder()
                .with_default_directive(app_config.logging.level_filter().into())
                .parse_lossy("")
        });
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();
    if app_config.logging.parse_level().is_none() {
        tracing::warn!(level = %app_config.logging.level, "unknown LOG_LEVEL, using info");
    }

    if std::env::var_os("TDARR_HOST").is_none()
        && app_config.tdarr.host == config::DEFAULT_TDARR_HOST
    {
        tracing::warn!(host = %app_config.tdarr.host, "TDARR_HOST not set, using default");
    }
    if std::env::var_os("TDARR_INTERVAL").is_none()
        && app_config.monitoring.interval == config::DEFAULT_INTERVAL
    {
        tracing::warn!(interval = ?app_config.monitoring.interval, "TDARR_INTERVAL not set, using default");
    }
    tracing::debug!(config = ?app_config, "starting {} {}", version::NAME, version::VERSION);

    let metrics = metrics::ExporterMetrics::new()?;
    let client = Arc::new(tdarr_client::TdarrClient::new(&app_config.tdarr)?);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let mut worker_handle = worker::spawn(
        worker::WorkerDeps {
            client,
            metrics: metrics.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            interval: app_config.monitoring.interval,
            on_error: app_config.monitoring.on_error,
            cardinality_warn_threshold: app_config.monitoring.cardinality_warn_threshold,
        },
    );

    let app = routes::app(metrics);
    let addr = app_config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        joined = &mut worker_handle => {
            // The worker only ends on its own when a cycle failed under on_error = "exit".
            joined??;
            return Ok(());
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }

    let _ = shutdown_tx.send(());
    worker_handle.await??;
    Ok(())
}
