pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use config::AppConfig;
pub use error::{StoreError, StoreResult};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use std::sync::Arc;
use tokio::net::TcpListener;

/// Load configuration, pick a store and serve until the process is stopped
pub async fn run_server() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init(config.env);
    log::info!(
        "configuration loaded: env={:?} server={}",
        config.env,
        config.server_address()
    );

    if config.storage.use_in_memory {
        log::warn!("storage.use_in_memory is set, data will not outlive the process");
        return serve(Arc::new(MemoryStore::new()), &config).await;
    }

    log::info!("connecting to PostgreSQL");
    let postgres_store =
        PostgresStore::new(config.connect_options()?, config.storage.max_connections).await?;

    log::info!("running database migrations");
    postgres_store.migrate().await?;

    serve(Arc::new(postgres_store), &config).await
}

pub async fn serve<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    let app = routes::create_app(store, config.request_timeout());

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("song library listening on http://{}", bind_address);
    log::info!("API documentation available at http://{}/docs", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
