use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use super::ApiResult;
use crate::auth::resolve_actor;
use crate::domain::aggregates::{Employee, EmployeeSession, EmployeeUpdate, NewEmployee};
use crate::domain::value_objects::{EmployeeId, StoreId};
use crate::repository::Repository;
use crate::services::staff;
use crate::session::EmployeeSessionStore;
use crate::state::AppState;
use crate::StorefrontError;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub async fn login<R: Repository>(
    State(s): State<AppState<R>>,
    Path(session): Path<String>,
    Json(c): Json<Credentials>,
) -> ApiResult<Json<EmployeeSession>> {
    let mut store = EmployeeSessionStore::for_session(s.storage.clone(), &session);
    Ok(Json(store.login(&s.repo, &c.email, &c.password).await?))
}

pub async fn logout<R: Repository>(State(s): State<AppState<R>>, Path(session): Path<String>) -> ApiResult<StatusCode> {
    EmployeeSessionStore::for_session(s.storage.clone(), &session).logout()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me<R: Repository>(State(s): State<AppState<R>>, headers: HeaderMap) -> ApiResult<Json<EmployeeSession>> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    Ok(Json(actor.require_employee()?.clone()))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeQuery {
    pub store_id: Option<StoreId>,
}

pub async fn list_employees<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Query(q): Query<EmployeeQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    let employees = match q.store_id {
        Some(store_id) => staff::store_employees(&s.repo, &store_id).await?,
        None => staff::all_employees(&s.repo).await?,
    };
    Ok(Json(employees))
}

pub async fn create_employee<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Json(r): Json<NewEmployee>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    Ok((StatusCode::CREATED, Json(staff::create_employee(&s.repo, r).await?)))
}

pub async fn get_employee<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<EmployeeId>,
) -> ApiResult<Json<Employee>> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    Ok(Json(staff::employee_by_id(&s.repo, &id).await?.ok_or(StorefrontError::NotFound("employee"))?))
}

pub async fn update_employee<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<EmployeeId>,
    Json(r): Json<EmployeeUpdate>,
) -> ApiResult<StatusCode> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    staff::update_employee(&s.repo, &id, r).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_employee<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<EmployeeId>,
) -> ApiResult<StatusCode> {
    resolve_actor(&s.repo, &s.storage, &headers).await?.require_admin()?;
    staff::delete_employee(&s.repo, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
