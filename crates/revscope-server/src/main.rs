mod api;
mod middleware;
mod registry;

use std::sync::Arc;

use revscope_report::HttpPipeline;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    registry::RunRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = revscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pipeline = Arc::new(HttpPipeline::from_config(&config)?);
    let registry = RunRegistry::new(config.max_concurrent_runs);
    let app = build_app(AppState {
        pipeline,
        registry: registry.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        env = ?config.env,
        max_concurrent_runs = config.max_concurrent_runs,
        "revscope server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let cancelled = registry.shutdown().await;
    if cancelled > 0 {
        tracing::warn!(cancelled, "cancelled in-flight runs on shutdown — all runs settled");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
