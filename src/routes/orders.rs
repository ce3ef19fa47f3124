use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::auth::{resolve_actor, Actor};
use crate::domain::aggregates::{DeliveryOption, Order, OrderStatus, Store};
use crate::domain::value_objects::{OrderId, StoreId};
use crate::repository::Repository;
use crate::services::checkout::{CheckoutRequest, DeliverySelection};
use crate::services::{orders, stores};
use crate::session::CartStore;
use crate::state::AppState;
use crate::StorefrontError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(flatten)]
    pub delivery: DeliverySelection,
    pub pet_for: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub redirect: String,
}

pub async fn checkout<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(session): Path<String>,
    Json(body): Json<CheckoutBody>,
) -> ApiResult<(StatusCode, Json<CheckoutReceipt>)> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    let cart = CartStore::for_session(s.storage.clone(), &session).cart().clone();
    let request = CheckoutRequest { user_id: actor.user_id, delivery: body.delivery, pet_for: body.pet_for };
    let placed = s.orders.place_order(&session, request, &cart).await?;
    let redirect = format!("{}?orderId={}", placed.redirect_to, placed.order.id);
    Ok((StatusCode::CREATED, Json(CheckoutReceipt { order_id: placed.order.id, redirect })))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmationQuery {
    pub session: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub order: Order,
    /// Pickup store, for pickup orders.
    pub store: Option<Store>,
}

/// Shows the shopper's placed order and empties the session's cart.
pub async fn confirmation<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Query(q): Query<ConfirmationQuery>,
) -> ApiResult<Json<Confirmation>> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    let user_id = actor.require_customer()?;
    let _guard = s.carts.lock(&q.session).await;
    let mut cart = CartStore::for_session(s.storage.clone(), &q.session);
    let order = s.orders.confirm(&id, user_id, &mut cart).await?;
    let store = match (&order.delivery_option, &order.store_id) {
        (DeliveryOption::Store, Some(store_id)) => stores::store_by_id(&s.repo, store_id).await?,
        _ => None,
    };
    Ok(Json(Confirmation { order, store }))
}

pub async fn my_orders<R: Repository>(State(s): State<AppState<R>>, headers: HeaderMap) -> ApiResult<Json<Vec<Order>>> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    Ok(Json(orders::orders_for_user(&s.repo, actor.require_customer()?).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub delivery_only: bool,
    pub store_id: Option<StoreId>,
}

/// Which store a dashboard request is for: the one asked for, else the employee's own.
fn dashboard_store(actor: &Actor, requested: Option<StoreId>) -> crate::Result<StoreId> {
    if actor.user_id.is_none() && actor.employee.is_none() {
        return Err(StorefrontError::Unauthenticated);
    }
    let store_id = match (requested, &actor.employee) {
        (Some(store_id), _) => store_id,
        (None, Some(employee)) => employee.store_id.clone(),
        (None, None) => return Err(StorefrontError::Validation("Missing storeId".into())),
    };
    if actor.is_admin() || actor.can_view_store(&store_id) {
        Ok(store_id)
    } else {
        Err(StorefrontError::Forbidden)
    }
}

pub async fn dashboard_orders<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Query(q): Query<DashboardQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    let store_id = dashboard_store(&actor, q.store_id)?;
    let scan_limit = s.settings.legacy_scan_limit;
    let list = if q.delivery_only {
        orders::delivery_orders_for_store(&s.repo, &store_id, scan_limit).await?
    } else {
        orders::orders_for_store(&s.repo, &store_id, scan_limit).await?
    };
    Ok(Json(list))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

pub async fn update_status<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusBody>,
) -> ApiResult<StatusCode> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    if actor.user_id.is_none() && actor.employee.is_none() {
        return Err(StorefrontError::Unauthenticated.into());
    }
    let order = s.repo.get_order(&id).await.map_err(StorefrontError::from)?.ok_or(StorefrontError::NotFound("order"))?;
    if !actor.can_update_order(&order) {
        return Err(StorefrontError::Forbidden.into());
    }
    orders::set_order_status(&s.repo, &s.events, &id, body.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_orders<R: Repository>(State(s): State<AppState<R>>, headers: HeaderMap) -> ApiResult<Json<Vec<Order>>> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    Ok(Json(orders::all_orders(&s.repo).await?))
}
