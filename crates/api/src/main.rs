use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use multiverse_catalog::RickAndMortyApi;
use multiverse_db::JsonStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use multiverse_api::config::ServerConfig;
use multiverse_api::router::build_app_router;
use multiverse_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "multiverse_api=debug,multiverse_db=debug,multiverse_catalog=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store = Arc::new(JsonStore::new(&config.data_file));
    tracing::info!(path = %store.path().display(), "Using JSON document store");
    if !store.is_readable().await {
        tracing::warn!("Store file is unreadable; reads will see an empty document");
    }

    // --- Upstream catalog ---
    let catalog = RickAndMortyApi::with_timeout(
        config.catalog_base_url.clone(),
        Duration::from_secs(config.catalog_timeout_secs),
    )
    .expect("Failed to build catalog HTTP client");
    tracing::info!(url = %catalog.api_url(), "Upstream catalog configured");

    // --- App state ---
    let state = AppState {
        store,
        catalog: Arc::new(catalog),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
