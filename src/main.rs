use anyhow::Context;
use semantix::api::{self, app_state::AppState};
use semantix::config::AppConfig;
use semantix::config::loader::{ConfigLoader, config_exists, default_config_path};
use semantix::llm::{DeepSeekClient, OllamaClient};
use semantix::observability::{
    AppMetrics, HealthCheckResult, ObservabilityState, create_observability_router, init_tracing,
};
use semantix::services::{create_chat_router, create_search_aggregator};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config.logging, env!("CARGO_PKG_NAME"));

    info!("Starting Semantix ({})...", config.environment);
    if config_exists() {
        info!("Configuration loaded from {}", default_config_path().display());
    } else {
        info!("No config file found, using defaults and environment");
    }

    let metrics = Arc::new(AppMetrics::default());

    let chat_router = create_chat_router(&config, metrics.clone())?;
    info!(
        "Chat router initialized (local: {}, remote: {})",
        config.local_model.model, config.remote_model.model
    );

    let search_aggregator = create_search_aggregator(&config, metrics.clone())?;
    info!("Search aggregator initialized: {:?}", search_aggregator);

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics.clone(),
    ));
    run_startup_checks(&config, &observability_state).await;

    let app_state = AppState::new(chat_router, search_aggregator, metrics);
    let router = create_observability_router(observability_state)
        .merge(api::create_router(app_state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Semantix stopped");
    Ok(())
}

/// 启动时探测模型后端，结果写入 /health
///
/// 只要有一个后端可用，对话就能工作，因此任一失败都只记 warn。
async fn run_startup_checks(config: &AppConfig, state: &ObservabilityState) {
    let start = Instant::now();
    let local = match OllamaClient::new(&config.local_model) {
        Ok(client) => client.ping().await,
        Err(e) => Err(e),
    };
    let local_latency = start.elapsed().as_millis() as u64;

    let remote_configured = DeepSeekClient::new(&config.remote_model)
        .map(|client| client.is_configured())
        .unwrap_or(false);

    let message = match &local {
        Ok(()) => format!("ollama reachable at {}", config.local_model.base_url),
        Err(e) => {
            warn!("Local model not reachable: {}", e);
            format!("ollama unreachable: {e}")
        }
    };
    state
        .add_health_check(HealthCheckResult {
            name: "local_model".to_string(),
            healthy: local.is_ok() || remote_configured,
            message,
            latency_ms: local_latency,
        })
        .await;

    state
        .add_health_check(HealthCheckResult {
            name: "remote_model".to_string(),
            healthy: remote_configured || local.is_ok(),
            message: if remote_configured {
                "api key configured".to_string()
            } else {
                "api key missing, requests fall back to local model".to_string()
            },
            latency_ms: 0,
        })
        .await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
