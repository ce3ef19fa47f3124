use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::ApiResult;
use crate::domain::value_objects::Coordinates;
use crate::geo::{self, GeolocationReport, ResolvedLocation};
use crate::repository::Repository;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lng: f64,
}

pub async fn search<R: Repository>(State(s): State<AppState<R>>, Query(q): Query<SearchQuery>) -> ApiResult<Json<ResolvedLocation>> {
    Ok(Json(geo::resolve_search(&s.geocoder, &q.q).await?))
}

/// Names a point picked on the map.
pub async fn reverse<R: Repository>(State(s): State<AppState<R>>, Query(q): Query<PointQuery>) -> ApiResult<Json<ResolvedLocation>> {
    Ok(Json(geo::resolve_point(&s.geocoder, Coordinates::new(q.lat, q.lng)).await?))
}

/// Turns the browser's geolocation report into a named delivery point. The browser
/// applies the location timeout and reports expiry as error code 3.
pub async fn locate<R: Repository>(
    State(s): State<AppState<R>>,
    Json(report): Json<GeolocationReport>,
) -> ApiResult<Json<ResolvedLocation>> {
    let coordinates = geo::current_device_location(&report, s.settings.geolocation_timeout).await?;
    Ok(Json(geo::resolve_point(&s.geocoder, coordinates).await?))
}
