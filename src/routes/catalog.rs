use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use super::ApiResult;
use crate::auth::resolve_actor;
use crate::domain::aggregates::{Item, ItemUpdate, NewItem, NewStore, Store, StoreUpdate};
use crate::domain::value_objects::{Category, ItemId, StoreId};
use crate::repository::Repository;
use crate::services::{catalog, stores};
use crate::state::AppState;
use crate::StorefrontError;

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub category: Option<Category>,
}

pub async fn list_items<R: Repository>(State(s): State<AppState<R>>, Query(q): Query<ItemQuery>) -> ApiResult<Json<Vec<Item>>> {
    let items = match q.category {
        Some(category) => catalog::items_by_category(&s.repo, category).await?,
        None => catalog::all_items(&s.repo).await?,
    };
    Ok(Json(items))
}

pub async fn get_item<R: Repository>(State(s): State<AppState<R>>, Path(id): Path<ItemId>) -> ApiResult<Json<Item>> {
    Ok(Json(catalog::item_by_id(&s.repo, &id).await?.ok_or(StorefrontError::NotFound("item"))?))
}

pub async fn create_item<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Json(r): Json<NewItem>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    Ok((StatusCode::CREATED, Json(catalog::create_item(&s.repo, &s.events, r).await?)))
}

pub async fn update_item<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<ItemId>,
    Json(r): Json<ItemUpdate>,
) -> ApiResult<StatusCode> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    catalog::update_item(&s.repo, &id, r).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_item<R: Repository>(State(s): State<AppState<R>>, headers: HeaderMap, Path(id): Path<ItemId>) -> ApiResult<StatusCode> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    catalog::delete_item(&s.repo, &s.events, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_stores<R: Repository>(State(s): State<AppState<R>>) -> ApiResult<Json<Vec<Store>>> {
    Ok(Json(stores::all_stores(&s.repo).await?))
}

/// Unknown ids answer with the placeholder store so pickup labels always render.
pub async fn get_store<R: Repository>(State(s): State<AppState<R>>, Path(id): Path<StoreId>) -> ApiResult<Json<Store>> {
    Ok(Json(stores::store_by_id(&s.repo, &id).await?.ok_or(StorefrontError::NotFound("store"))?))
}

pub async fn create_store<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Json(r): Json<NewStore>,
) -> ApiResult<(StatusCode, Json<Store>)> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    Ok((StatusCode::CREATED, Json(stores::create_store(&s.repo, r).await?)))
}

pub async fn update_store<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<StoreId>,
    Json(r): Json<StoreUpdate>,
) -> ApiResult<StatusCode> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    stores::update_store(&s.repo, &id, r).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_store<R: Repository>(State(s): State<AppState<R>>, headers: HeaderMap, Path(id): Path<StoreId>) -> ApiResult<StatusCode> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    stores::delete_store(&s.repo, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
