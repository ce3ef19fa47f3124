//! Customer profile: role and pet details

use tracing::info;
use serde::Deserialize;
use validator::Validate;

use crate::domain::aggregates::UserProfile;
use crate::domain::value_objects::{Category, UserId};
use crate::repository::UserRepository;
use crate::Result;

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PetDetails {
    pub pet_type: Category,
    #[validate(length(min = 1, max = 100, message = "Please enter your pet's name"))]
    pub selected_pet_name: String,
}

/// The stored profile, or a fresh unsaved one for customers who never saved any.
pub async fn profile_for<R: UserRepository>(repo: &R, uid: &UserId) -> Result<UserProfile> {
    Ok(repo.get_profile(uid).await?.unwrap_or_else(|| UserProfile::new(uid.clone())))
}

/// Records which pet the customer shops for. Role and addresses are left alone.
pub async fn save_pet_details<R: UserRepository>(repo: &R, uid: &UserId, details: PetDetails) -> Result<UserProfile> {
    let details = PetDetails { selected_pet_name: details.selected_pet_name.trim().to_string(), ..details };
    details.validate()?;
    let mut profile = profile_for(repo, uid).await?;
    profile.has_pet_profile = true;
    profile.pet_type = Some(details.pet_type);
    profile.selected_pet_name = Some(details.selected_pet_name);
    repo.upsert_profile(profile.clone()).await?;
    info!(uid = %uid, pet_type = details.pet_type.as_str(), "pet profile saved");
    Ok(repo.get_profile(uid).await?.unwrap_or(profile))
}
