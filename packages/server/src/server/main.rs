// Main entry point for the pipeline server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::domains::pipeline::PipelineController;
use server_core::kernel::ServerDeps;
use server_core::server::{build_app, AppState};
use server_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,server_core=debug,extraction=debug,ollama_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sharemine server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        model = %config.model_name,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let deps = ServerDeps::from_config(&config).context("Failed to build dependencies")?;
    let controller = Arc::new(PipelineController::new(
        deps.clone(),
        config.pipeline_settings(),
    ));

    // Bring the model up in the background; failures surface through /health
    let gateway = deps.gateway.clone();
    let model_name = config.model_name.clone();
    tokio::spawn(async move {
        if let Err(e) = gateway.ensure_ready().await {
            tracing::error!(error = %e, "Model service not reachable at startup");
            return;
        }
        match gateway.ensure_model(&model_name).await {
            Ok(()) => tracing::info!(model = %model_name, "Model ready"),
            Err(e) => tracing::error!(model = %model_name, error = %e, "Model not available"),
        }
    });

    if config.autostart {
        let outcome = controller.start();
        tracing::info!(accepted = outcome.accepted, "Autostart requested");
    }

    let app = build_app(AppState::new(controller.clone(), deps));

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Status: http://{}/status", addr);
    tracing::info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let the in-flight iteration finish before exiting
    controller.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
