use anyhow::Context;
use shareit_api::{app, state::AppState};
use shareit_core::{Clock, Fixture, InMemoryStore, SystemClock};
use shareit_store::app_config::{Config, StorageBackend};
use shareit_store::DbClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ShareIt booking API on port {}", config.server.port);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let app_state = match config.storage.backend {
        StorageBackend::Memory => {
            let store = Arc::new(InMemoryStore::new());
            if let Some(path) = &config.storage.fixture {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read fixture {}", path))?;
                let fixture: Fixture = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse fixture {}", path))?;
                store.load_fixture(fixture).await;
            }
            tracing::info!("Using in-memory storage");
            AppState::in_memory(store, clock)
        }
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Using Postgres storage");
            AppState::postgres(&db, clock)
        }
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
