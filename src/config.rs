use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::value_objects::StoreId;
use crate::geo::DEFAULT_NOMINATIM_URL;
use crate::services::orders::LEGACY_SCAN_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub nominatim_url: String,
    pub legacy_scan_limit: usize,
    pub default_store_id: StoreId,
    pub geolocation_timeout: Duration,
    /// Directory for client-local state; memory only when unset.
    pub local_storage_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            port: try_load("PORT", "8083")?,
            nats_url: var("NATS_URL"),
            nominatim_url: try_load("NOMINATIM_URL", DEFAULT_NOMINATIM_URL)?,
            legacy_scan_limit: try_load("LEGACY_SCAN_LIMIT", &LEGACY_SCAN_LIMIT.to_string())?,
            default_store_id: StoreId::new(try_load::<String>("DEFAULT_STORE_ID", crate::domain::aggregates::DEFAULT_STORE_ID)?),
            geolocation_timeout: Duration::from_secs(try_load("GEOLOCATION_TIMEOUT_SECS", "10")?),
            local_storage_dir: var("LOCAL_STORAGE_DIR").map(PathBuf::from),
        })
    }
}

fn var(key: &str) -> Option<String> { env::var(key).ok().filter(|v| !v.trim().is_empty()) }

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid { key, reason: e.to_string(), value }
    })
}
