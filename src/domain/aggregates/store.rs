//! Store Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::item::non_blank;
use crate::domain::value_objects::{Coordinates, StoreId};

/// Store that fulfils pickup orders with no explicit store and all delivery orders.
pub const DEFAULT_STORE_ID: &str = "store1";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Store {
    /// Stand-in for a store id with no document, so pickup labels still render.
    pub fn placeholder(id: StoreId) -> Self {
        Self {
            id,
            name: "Store".to_string(),
            address: Some("—".to_string()),
            phone: Some(String::new()),
            coordinates: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    #[validate(length(min = 1, max = 200, message = "Store name is required"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl NewStore {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            address: non_blank(self.address),
            phone: non_blank(self.phone),
            coordinates: self.coordinates,
        }
    }
}

/// Partial admin edit. Blank address or phone clears the field.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    #[validate(length(min = 1, max = 200, message = "Store name must not be empty"))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub address: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub coordinates: Option<Coordinates>,
}

impl StoreUpdate {
    pub fn normalized(self) -> StoreChanges {
        StoreChanges {
            name: self.name.map(|n| n.trim().to_string()),
            address: self.address.map(|a| non_blank(Some(a))),
            phone: self.phone.map(|p| non_blank(Some(p))),
            coordinates: self.coordinates,
        }
    }
}

impl StoreChanges {
    pub fn apply(self, store: &mut Store, now: DateTime<Utc>) {
        if let Some(name) = self.name { store.name = name; }
        if let Some(address) = self.address { store.address = address; }
        if let Some(phone) = self.phone { store.phone = phone; }
        if let Some(coordinates) = self.coordinates { store.coordinates = Some(coordinates); }
        store.updated_at = Some(now);
    }
}
