//! Heart Risk Service - Main Entry Point
//!
//! Loads the model descriptor and ONNX artifact once, then serves the
//! prediction API and form over HTTP.

use anyhow::{Context, Result};
use heart_risk_service::{
    api::{self, AppState},
    config::{AppConfig, LoggingConfig},
    metrics::MetricsReporter,
    pipeline::InferencePipeline,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    init_tracing(&config.logging)?;

    info!("Starting Heart Risk Service");
    info!(
        model_path = %config.model.model_path,
        meta_path = %config.model.meta_path,
        "Configuration loaded successfully"
    );

    // Descriptor or model failures are fatal: never serve without a schema
    let pipeline = Arc::new(InferencePipeline::from_config(&config)?);
    info!(
        "Inference pipeline ready: {} ({} features)",
        pipeline.model_type(),
        pipeline.schema().len()
    );

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(
            pipeline.metrics().clone(),
            config.metrics.report_interval_secs,
        );
        tokio::spawn(reporter.start());
    }

    let state = AppState::new(pipeline.clone(), config.form.unset_default);
    let app = api::router(state);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Print final summary
    info!("Service shutting down...");
    pipeline.metrics().print_summary();

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG takes precedence over the configured level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "heart_risk_service={level},tower_http={level}",
            level = logging.level
        ))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
