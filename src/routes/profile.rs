use axum::{extract::State, http::HeaderMap, Json};

use super::ApiResult;
use crate::auth::resolve_actor;
use crate::domain::aggregates::UserProfile;
use crate::repository::Repository;
use crate::services::profile::{self, PetDetails};
use crate::state::AppState;

pub async fn get_profile<R: Repository>(State(s): State<AppState<R>>, headers: HeaderMap) -> ApiResult<Json<UserProfile>> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    Ok(Json(profile::profile_for(&s.repo, actor.require_customer()?).await?))
}

pub async fn save_pet<R: Repository>(
    State(s): State<AppState<R>>,
    headers: HeaderMap,
    Json(details): Json<PetDetails>,
) -> ApiResult<Json<UserProfile>> {
    let actor = resolve_actor(&s.repo, &s.storage, &headers).await?;
    Ok(Json(profile::save_pet_details(&s.repo, actor.require_customer()?, details).await?))
}
