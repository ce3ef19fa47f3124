use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::domain::value_objects::StoreId;
use crate::events::EventPublisher;
use crate::geo::{NominatimClient, DEFAULT_LOCATION_TIMEOUT};
use crate::repository::Repository;
use crate::services::checkout::OrderPlacer;
use crate::services::orders::LEGACY_SCAN_LIMIT;
use crate::session::SessionLocks;
use crate::storage::LocalStorage;

#[derive(Clone, Debug)]
pub struct Settings {
    pub legacy_scan_limit: usize,
    pub default_store_id: StoreId,
    pub geolocation_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            legacy_scan_limit: LEGACY_SCAN_LIMIT,
            default_store_id: crate::domain::aggregates::DEFAULT_STORE_ID.into(),
            geolocation_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            legacy_scan_limit: config.legacy_scan_limit,
            default_store_id: config.default_store_id.clone(),
            geolocation_timeout: config.geolocation_timeout,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState<R> {
    pub repo: R,
    pub storage: Arc<dyn LocalStorage>,
    /// Serializes cart changes per browser session.
    pub carts: SessionLocks,
    pub orders: OrderPlacer<R>,
    pub events: EventPublisher,
    pub geocoder: NominatimClient,
    pub settings: Arc<Settings>,
}

impl<R: Repository> AppState<R> {
    pub fn new(
        repo: R,
        storage: Arc<dyn LocalStorage>,
        events: EventPublisher,
        geocoder: NominatimClient,
        settings: Settings,
    ) -> Self {
        let orders = OrderPlacer::new(repo.clone(), settings.default_store_id.clone(), events.clone());
        Self { repo, storage, carts: SessionLocks::new(), orders, events, geocoder, settings: Arc::new(settings) }
    }
}
