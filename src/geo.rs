//! Address resolution for delivery orders
//!
//! Forward and reverse geocoding go to a Nominatim server. Device location comes from
//! the browser's geolocation report. Every failure maps to its own user-facing
//! message and nothing is retried.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::value_objects::Coordinates;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("zoomies-storefront/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Please enter a location to search.")]
    EmptyQuery,

    #[error("Please pick a valid point on the map.")]
    InvalidCoordinates,

    #[error("Location not found. Please try a different search term.")]
    NotFound,

    #[error("geocoding server answered {0}")]
    Http(u16),

    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GeocodeError {
    /// Text shown to the customer. Server and network failures share one message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) | Self::Transport(_) => {
                "Search failed. Please check your internet connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Permission denied: Please allow access to your location in browser settings.")]
    PermissionDenied,

    #[error("Position unavailable: Your location data could not be retrieved. Make sure location services are enabled.")]
    Unavailable,

    #[error("Request timed out: Please try again.")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

pub trait Geocoder: Send + Sync {
    fn forward(&self, query: &str) -> impl Future<Output = Result<Coordinates, GeocodeError>> + Send;
    /// Display name of the place at `coords`.
    fn reverse(&self, coords: Coordinates) -> impl Future<Output = Result<String, GeocodeError>> + Send;
}

pub trait LocationProvider: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

#[derive(Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[derive(Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
}

#[derive(Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).timeout(Duration::from_secs(15)).build()?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, GeocodeError> {
        let response = self.client.get(format!("{}{path}", self.base_url)).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "geocoding HTTP error");
            return Err(GeocodeError::Http(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

impl Geocoder for NominatimClient {
    async fn forward(&self, query: &str) -> Result<Coordinates, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        let params = [("format", "jsonv2".to_string()), ("q", query.to_string()), ("limit", "1".to_string())];
        let hits: Vec<SearchHit> = self.get("/search", &params).await?;
        let hit = hits.into_iter().next().ok_or(GeocodeError::NotFound)?;
        match (hit.lat.parse::<f64>(), hit.lon.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Ok(Coordinates::new(lat, lng)),
            _ => Err(GeocodeError::NotFound),
        }
    }

    async fn reverse(&self, coords: Coordinates) -> Result<String, GeocodeError> {
        if !coords.is_valid() {
            return Err(GeocodeError::InvalidCoordinates);
        }
        let params = [
            ("format", "jsonv2".to_string()),
            ("lat", coords.lat.to_string()),
            ("lon", coords.lng.to_string()),
            ("limit", "1".to_string()),
        ];
        let hit: ReverseHit = self.get("/reverse", &params).await?;
        hit.display_name.filter(|n| !n.trim().is_empty()).ok_or(GeocodeError::NotFound)
    }
}

/// What the browser's geolocation API reported: a position, or an error code
/// (1 permission denied, 2 position unavailable, 3 timeout) with an optional message.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GeolocationReport {
    pub coords: Option<Coordinates>,
    pub error: Option<GeolocationFailure>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeolocationFailure {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<&GeolocationFailure> for LocationError {
    fn from(failure: &GeolocationFailure) -> Self {
        match failure.code {
            1 => Self::PermissionDenied,
            2 => Self::Unavailable,
            3 => Self::Timeout,
            _ => match failure.message.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
                Some(msg) => Self::Other(format!("Location error: {msg}")),
                None => Self::Other("Unable to get your current location.".to_string()),
            },
        }
    }
}

impl LocationProvider for GeolocationReport {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        if let Some(failure) = &self.error {
            return Err(failure.into());
        }
        match self.coords {
            Some(coords) if coords.is_valid() => Ok(coords),
            Some(_) => Err(LocationError::Unavailable),
            None => Err(LocationError::Other("Geolocation is not supported by this browser.".to_string())),
        }
    }
}

/// Asks `provider` for the device position, giving up with [`LocationError::Timeout`]
/// after `timeout`.
///
/// A [`GeolocationReport`] is already complete when it arrives: the browser enforces the
/// limit itself and reports a late fix as code 3, which maps to the same
/// [`LocationError::Timeout`]. The wrapper only bounds providers that wait for a fix.
pub async fn current_device_location<P: LocationProvider>(provider: &P, timeout: Duration) -> Result<Coordinates, LocationError> {
    tokio::time::timeout(timeout, provider.locate()).await.unwrap_or(Err(LocationError::Timeout))
}

/// A point with the text to show for it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub address: String,
}

/// Names a picked point. Without a reverse geocoding answer the point keeps its
/// coordinate label.
pub async fn resolve_point<G: Geocoder>(geocoder: &G, coordinates: Coordinates) -> Result<ResolvedLocation, GeocodeError> {
    if !coordinates.is_valid() {
        return Err(GeocodeError::InvalidCoordinates);
    }
    let address = match geocoder.reverse(coordinates).await {
        Ok(name) => name,
        Err(e) => {
            debug!(error = %e, "reverse geocoding gave no address, using coordinate label");
            coordinates.fallback_label()
        }
    };
    Ok(ResolvedLocation { coordinates, address })
}

/// Finds typed text on the map, then names the point found.
pub async fn resolve_search<G: Geocoder>(geocoder: &G, query: &str) -> Result<ResolvedLocation, GeocodeError> {
    let coordinates = geocoder.forward(query).await?;
    resolve_point(geocoder, coordinates).await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeGeocoder {
        hit: Option<Coordinates>,
        name: Option<&'static str>,
    }

    impl Geocoder for FakeGeocoder {
        async fn forward(&self, query: &str) -> Result<Coordinates, GeocodeError> {
            if query.trim().is_empty() {
                return Err(GeocodeError::EmptyQuery);
            }
            self.hit.ok_or(GeocodeError::NotFound)
        }

        async fn reverse(&self, _coords: Coordinates) -> Result<String, GeocodeError> {
            self.name.map(str::to_string).ok_or(GeocodeError::Http(503))
        }
    }

    struct NeverAnswers;

    impl LocationProvider for NeverAnswers {
        async fn locate(&self) -> Result<Coordinates, LocationError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_search_then_name() {
        let geocoder = FakeGeocoder { hit: Some(Coordinates::new(28.6, 77.2)), name: Some("Connaught Place, New Delhi") };
        let found = resolve_search(&geocoder, "connaught").await.unwrap();
        assert_eq!(found.address, "Connaught Place, New Delhi");
    }

    #[tokio::test]
    async fn test_unnamed_point_keeps_label() {
        let geocoder = FakeGeocoder { hit: None, name: None };
        let found = resolve_point(&geocoder, Coordinates::new(28.6139, 77.209)).await.unwrap();
        assert_eq!(found.address, "Lat: 28.6139, Lng: 77.2090");
        assert!(matches!(resolve_point(&geocoder, Coordinates::new(0.0, 200.0)).await, Err(GeocodeError::InvalidCoordinates)));
    }

    #[tokio::test]
    async fn test_search_errors_have_distinct_messages() {
        let geocoder = FakeGeocoder { hit: None, name: None };
        let empty = resolve_search(&geocoder, "  ").await.unwrap_err();
        let missing = resolve_search(&geocoder, "atlantis").await.unwrap_err();
        assert_eq!(empty.user_message(), "Please enter a location to search.");
        assert_eq!(missing.user_message(), "Location not found. Please try a different search term.");
        assert_ne!(GeocodeError::Http(500).user_message(), missing.user_message());
    }

    #[tokio::test]
    async fn test_browser_error_codes() {
        let report = |code, message: Option<&str>| GeolocationReport {
            coords: None,
            error: Some(GeolocationFailure { code, message: message.map(str::to_string) }),
        };
        assert_eq!(report(1, None).locate().await, Err(LocationError::PermissionDenied));
        assert_eq!(report(2, None).locate().await, Err(LocationError::Unavailable));
        assert_eq!(report(3, None).locate().await, Err(LocationError::Timeout));
        assert_eq!(
            report(9, Some("kernel panic")).locate().await,
            Err(LocationError::Other("Location error: kernel panic".into()))
        );
        let ok = GeolocationReport { coords: Some(Coordinates::new(1.0, 2.0)), error: None };
        assert_eq!(current_device_location(&ok, DEFAULT_LOCATION_TIMEOUT).await, Ok(Coordinates::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_device_location_times_out() {
        let result = current_device_location(&NeverAnswers, Duration::from_millis(20)).await;
        assert_eq!(result, Err(LocationError::Timeout));
    }
}
