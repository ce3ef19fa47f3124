//! Zoomies Storefront - pet grooming giveaway shop backend

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zoomies_storefront::{
    config::Config,
    events::EventPublisher,
    geo::NominatimClient,
    repository::{postgres, PgRepository},
    routes,
    state::{AppState, Settings},
    storage::{FileStorage, LocalStorage, MemoryStorage},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let repo = PgRepository::new(postgres::connect(&config.database_url).await?);
    repo.migrate().await?;
    let events = EventPublisher::connect(config.nats_url.as_deref()).await;
    let storage: Arc<dyn LocalStorage> = match &config.local_storage_dir {
        Some(dir) => Arc::new(FileStorage::open(dir)?),
        None => Arc::new(MemoryStorage::new()),
    };
    let geocoder = NominatimClient::new(config.nominatim_url.clone())?;
    let state = AppState::new(repo, storage, events, geocoder, Settings::from(&config));

    let app = routes::router(state);
    tracing::info!(legacy_scan_limit = config.legacy_scan_limit, default_store = %config.default_store_id, "🐾 Zoomies storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
