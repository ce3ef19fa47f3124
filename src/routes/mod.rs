//! HTTP routes
//!
//! Handlers are generic over the repository so the same router serves Postgres in
//! production and the in-memory store in tests.

use axum::{
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::repository::Repository;
use crate::state::AppState;

mod cart;
mod catalog;
mod geocode;
mod orders;
mod profile;
mod staff;

pub type ApiResult<T> = std::result::Result<T, AppError>;

pub fn router<R: Repository>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "zoomies-storefront"})) }))
        .route("/api/v1/items", get(catalog::list_items::<R>).post(catalog::create_item::<R>))
        .route("/api/v1/items/:id", get(catalog::get_item::<R>).put(catalog::update_item::<R>).delete(catalog::delete_item::<R>))
        .route("/api/v1/stores", get(catalog::list_stores::<R>).post(catalog::create_store::<R>))
        .route("/api/v1/stores/:id", get(catalog::get_store::<R>).put(catalog::update_store::<R>).delete(catalog::delete_store::<R>))
        .route("/api/v1/cart/:session", get(cart::get_cart::<R>).post(cart::add_to_cart::<R>).delete(cart::clear_cart::<R>))
        .route("/api/v1/cart/:session/:item_id", patch(cart::change_quantity::<R>).delete(cart::remove_from_cart::<R>))
        .route("/api/v1/checkout/:session", post(orders::checkout::<R>))
        .route("/api/v1/orders/mine", get(orders::my_orders::<R>))
        .route("/api/v1/orders/:id/confirmation", get(orders::confirmation::<R>))
        .route("/api/v1/orders/:id/status", put(orders::update_status::<R>))
        .route("/api/v1/dashboard/orders", get(orders::dashboard_orders::<R>))
        .route("/api/v1/admin/orders", get(orders::admin_orders::<R>))
        .route("/api/v1/profile", get(profile::get_profile::<R>))
        .route("/api/v1/profile/pet", put(profile::save_pet::<R>))
        .route("/api/v1/employees/login/:session", post(staff::login::<R>).delete(staff::logout::<R>))
        .route("/api/v1/employees/me", get(staff::me::<R>))
        .route("/api/v1/admin/employees", get(staff::list_employees::<R>).post(staff::create_employee::<R>))
        .route(
            "/api/v1/admin/employees/:id",
            get(staff::get_employee::<R>).put(staff::update_employee::<R>).delete(staff::delete_employee::<R>),
        )
        .route("/api/v1/geocode/search", get(geocode::search::<R>))
        .route("/api/v1/geocode/reverse", get(geocode::reverse::<R>))
        .route("/api/v1/geocode/locate", post(geocode::locate::<R>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
