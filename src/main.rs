//! pgbouncer-exporter - Prometheus exporter for PgBouncer.
//!
//! Each scrape of the telemetry endpoint runs the admin console's `SHOW`
//! commands and republishes the results as Prometheus metrics.

mod admin;
mod config;
mod error;
mod http;
mod metrics;
mod scrape;
mod telemetry;

use crate::admin::{PgAdmin, parse_dsn};
use crate::config::{Config, LogFormat};
use crate::scrape::{DescriptorRegistry, Exporter};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args().nth(1);
    let mut config = match &config_path {
        Some(path) => Config::load(path).map_err(|e| {
            eprintln!("Failed to load config {path}: {e}");
            e
        })?,
        None => Config::default(),
    };
    config.apply_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, code = e.error_code(), "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s). See messages above.",
            errors.len()
        ));
    }

    info!(
        config = config_path.as_deref().unwrap_or("<defaults>"),
        listen = %config.web.listen_address,
        telemetry_path = %config.web.telemetry_path,
        "Starting pgbouncer-exporter"
    );

    // An unreachable pgbouncer is not fatal: every scrape retries the connection.
    let options = parse_dsn(&config.exporter.data_source_name)?;
    let mut source = PgAdmin::new(options, config.exporter.connect_timeout());
    if let Err(e) = source.connect().await {
        warn!(error = %e, code = e.error_code(), "Fail to connect to pgbouncer, waiting...");
    }

    let registry = Arc::new(DescriptorRegistry::pgbouncer());
    info!(descriptors = registry.descriptors().count(), "Metric descriptors registered");

    metrics::init();

    let exporter = Arc::new(Exporter::new(source, registry));
    let app = http::router(Arc::clone(&exporter), &config.web.telemetry_path);

    http::run_http_server(config.web.listen_address, app, shutdown_signal()).await?;

    exporter.close().await;
    info!("pgbouncer-exporter stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
