use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_stream::{
    api,
    catalog::Database,
    config::{Config, LinkStoreBackend},
    link_store::{EphemeralStore, MemoryStore, RedisStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "media-stream starting");

    let config = Config::load()?;

    let db = Database::open(&config.storage.data_dir)?;
    info!(data_dir = %config.storage.data_dir, "Catalog opened");

    let link_store: Arc<dyn EphemeralStore> = match config.links.backend {
        LinkStoreBackend::Memory => {
            tracing::warn!("Using in-process link store; links are not shared between instances");
            Arc::new(MemoryStore::new())
        }
        LinkStoreBackend::Redis => {
            let store = RedisStore::connect(&config.links.redis_url).await?;
            info!("Using redis link store");
            Arc::new(store)
        }
    };

    let session_store = RedisStore::connect(&config.sessions.redis_url).await?;
    session_store.ping().await?;
    info!("Reading sessions from redis");

    let bind_address = config.server.bind_address.clone();
    let state = Arc::new(AppState::new(config, db, link_store, Arc::new(session_store)));

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on: {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, draining connections");
}
