//! Employee Aggregate
//!
//! Staff accounts live in their own collection, separate from the customer identity
//! provider. Passwords are stored and compared as plain text; this is a demo-grade
//! credential store and must not be reused for real accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;
use crate::domain::value_objects::{EmployeeId, StoreId, UnknownVariant};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeRole {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl EmployeeRole {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Employee => "employee", Self::Manager => "manager", Self::Admin => "admin" }
    }
}

impl FromStr for EmployeeRole {
    type Err = UnknownVariant;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub store_id: StoreId,
    pub role: EmployeeRole,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// Email comparison ignores case and surrounding whitespace, the password must match
    /// exactly, and inactive accounts never match.
    pub fn matches_credentials(&self, email: &str, password: &str) -> bool {
        self.is_active && self.email.to_lowercase() == normalize_email(email) && self.password == password
    }

    pub fn session(&self) -> EmployeeSession {
        EmployeeSession {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            store_id: self.store_id.clone(),
            role: self.role,
        }
    }
}

/// Signed-in staff identity. Never carries the password.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSession {
    pub id: EmployeeId,
    pub email: String,
    pub name: String,
    pub store_id: StoreId,
    pub role: EmployeeRole,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub store_id: StoreId,
    pub role: Option<EmployeeRole>,
}

impl NewEmployee {
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password,
            name: self.name.trim().to_string(),
            store_id: self.store_id,
            role: Some(self.role.unwrap_or_default()),
        }
    }
}

/// Partial edit. The password only changes when one is supplied.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub password: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub store_id: Option<StoreId>,
    pub role: Option<EmployeeRole>,
    pub is_active: Option<bool>,
}

impl EmployeeUpdate {
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.as_deref().map(normalize_email),
            name: self.name.map(|n| n.trim().to_string()),
            ..self
        }
    }

    pub fn apply(self, employee: &mut Employee, now: DateTime<Utc>) {
        if let Some(email) = self.email { employee.email = email; }
        if let Some(password) = self.password { employee.password = password; }
        if let Some(name) = self.name { employee.name = name; }
        if let Some(store_id) = self.store_id { employee.store_id = store_id; }
        if let Some(role) = self.role { employee.role = role; }
        if let Some(is_active) = self.is_active { employee.is_active = is_active; }
        employee.updated_at = Some(now);
    }
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
