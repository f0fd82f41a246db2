use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post, put},
};
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::{error, info};

use super::{
    services::{
        add_provider, clear_history, delete_provider, download_changed, download_created,
        download_name, get_settings, health, list_history, list_providers, put_settings,
        set_default_provider, test_provider, update_provider,
    },
    state::{AppState, load_snapshot},
};
use crate::config::Config;
use crate::store::LocalStore;
use crate::summarize::SummarizationClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/downloads/created", post(download_created))
        .route("/downloads/name", post(download_name))
        .route("/downloads/changed", post(download_changed))
        .route("/history", get(list_history).delete(clear_history))
        .route("/providers", get(list_providers).post(add_provider))
        .route("/providers/{id}", put(update_provider).delete(delete_provider))
        .route("/providers/{id}/default", post(set_default_provider))
        .route("/providers/{id}/test", post(test_provider))
        .route("/settings", get(get_settings).put(put_settings))
        .with_state(state)
        // Automatically decompress gzip request bodies
        .layer(RequestDecompressionLayer::new())
}

/// Open the store, drop expired history and assemble the shared state
pub fn build_state(config: Config) -> Result<AppState, AnyError> {
    info!(path = %config.server.store_path.display(), "Opening local store");
    let store = LocalStore::open(&config.server.store_path)
        .map_err(|e| format!("Failed to open store: {}", e))?;

    let cutoff = Utc::now() - config.history.retention();
    store.purge_history_before(cutoff)?;
    store.persist()?;

    let snapshot = load_snapshot(&config, &store)?;
    let summarizer = SummarizationClient::from_config(&config.http)
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    Ok(AppState::new(config, snapshot, store, summarizer))
}

pub async fn run(address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = Config::load().map_err(|e| format!("Failed to load config: {}", e))?;
    let address = address.unwrap_or(config.server.bind_addr);

    let state = build_state(config)?;
    let store = state.store.clone();
    let app = build_router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "smartsave listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.persist()?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
