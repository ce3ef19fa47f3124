use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::domain::aggregates::{Cart, CartEntry};
use crate::domain::value_objects::ItemId;
use crate::repository::Repository;
use crate::services::catalog;
use crate::session::CartStore;
use crate::state::AppState;
use crate::StorefrontError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartEntry>,
    pub total_items: u32,
    pub subtotal: Decimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self { items: cart.entries().to_vec(), total_items: cart.total_items(), subtotal: cart.subtotal() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub item_id: ItemId,
}

#[derive(Debug, Deserialize)]
pub struct QuantityChange {
    pub delta: i64,
}

pub async fn get_cart<R: Repository>(State(s): State<AppState<R>>, Path(session): Path<String>) -> Json<CartView> {
    Json(CartView::from(CartStore::for_session(s.storage.clone(), &session).cart()))
}

/// Snapshots the catalog item into the cart.
pub async fn add_to_cart<R: Repository>(
    State(s): State<AppState<R>>,
    Path(session): Path<String>,
    Json(r): Json<AddToCart>,
) -> ApiResult<Json<CartView>> {
    let item = catalog::item_by_id(&s.repo, &r.item_id).await?.ok_or(StorefrontError::NotFound("item"))?;
    let _guard = s.carts.lock(&session).await;
    let mut store = CartStore::for_session(s.storage.clone(), &session);
    store.add(item.snapshot())?;
    Ok(Json(CartView::from(store.cart())))
}

pub async fn change_quantity<R: Repository>(
    State(s): State<AppState<R>>,
    Path((session, item_id)): Path<(String, ItemId)>,
    Json(r): Json<QuantityChange>,
) -> ApiResult<Json<CartView>> {
    let _guard = s.carts.lock(&session).await;
    let mut store = CartStore::for_session(s.storage.clone(), &session);
    store.change_quantity(&item_id, r.delta)?;
    Ok(Json(CartView::from(store.cart())))
}

pub async fn remove_from_cart<R: Repository>(
    State(s): State<AppState<R>>,
    Path((session, item_id)): Path<(String, ItemId)>,
) -> ApiResult<Json<CartView>> {
    let _guard = s.carts.lock(&session).await;
    let mut store = CartStore::for_session(s.storage.clone(), &session);
    store.remove(&item_id)?;
    Ok(Json(CartView::from(store.cart())))
}

pub async fn clear_cart<R: Repository>(State(s): State<AppState<R>>, Path(session): Path<String>) -> ApiResult<Json<CartView>> {
    let _guard = s.carts.lock(&session).await;
    let mut store = CartStore::for_session(s.storage.clone(), &session);
    store.clear()?;
    Ok(Json(CartView::from(store.cart())))
}
