//! recall-server - REST API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use recall_client::MemoryClient;
use recall_core::cache::{CacheReaper, QuestionCache};
use recall_core::config::AppConfig;
use recall_core::traits::MemoryStore;
use recall_llm::{OpenAiLlmConfig, OpenAiProvider};
use recall_server::{create_server, AppState};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("recall_server=debug".parse().unwrap()),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Memory store client
    let store = Arc::new(MemoryClient::new(
        config.memory_server_url.clone(),
        config.memory_server_timeout,
    )?);

    match store.health_check().await {
        Ok(true) => info!(url = %config.memory_server_url, "Memory store reachable"),
        Ok(false) => warn!(url = %config.memory_server_url, "Memory store reported unhealthy"),
        Err(e) => warn!(url = %config.memory_server_url, error = %e, "Memory store unreachable at startup"),
    }

    // Completion provider
    let completion = Arc::new(OpenAiProvider::new(OpenAiLlmConfig {
        api_key: Some(config.openai_api_key.clone()),
        model: config.openai_model.clone(),
        temperature: config.openai_temperature,
        max_tokens: config.openai_max_tokens,
        base_url: None,
    })?);
    info!(model = %config.openai_model, "Completion provider configured");

    // Question cache with background reaper
    let cache = Arc::new(QuestionCache::new(config.question_cache_ttl));
    let mut reaper = CacheReaper::new(cache.clone(), config.cache_reaper_interval).await?;
    reaper.start().await?;

    let state = AppState::new(store, completion, cache, &config);
    let app = create_server(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Starting recall-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, stopping reaper...");
        })
        .await?;

    // Explicit shutdown so no timer outlives teardown
    reaper.shutdown().await?;

    info!("Server stopped cleanly");
    Ok(())
}
