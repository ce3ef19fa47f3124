//! Customer profile kept beside the identity provider account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Category, UserId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub has_pet_profile: bool,
    pub pet_type: Option<Category>,
    pub selected_pet_name: Option<String>,
    #[serde(default)]
    pub addresses: Vec<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            role: UserRole::User,
            has_pet_profile: false,
            pet_type: None,
            selected_pet_name: None,
            addresses: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_admin(&self) -> bool { self.role == UserRole::Admin }
}
