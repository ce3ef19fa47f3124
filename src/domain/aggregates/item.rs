//! Item Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::cart::CartProduct;
use crate::domain::value_objects::{Category, ItemId, Price};

/// Image shown for items saved without one.
pub const DEFAULT_ITEM_IMAGE: &str = "/logo.png";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub category: Category,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn snapshot(&self) -> CartProduct {
        CartProduct { id: self.id.clone(), name: self.name.clone(), price: self.price, image: self.image.clone() }
    }
}

/// Admin payload for a new item
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[validate(length(min = 1, max = 200, message = "Item name is required"))]
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
}

impl NewItem {
    /// Trims text, fills the default image and category, blanks become `None`.
    pub fn normalized(self) -> Result<NormalizedItem, crate::domain::value_objects::PriceError> {
        Ok(NormalizedItem {
            name: self.name.trim().to_string(),
            price: Price::new(self.price)?,
            image: non_blank(self.image).unwrap_or_else(|| DEFAULT_ITEM_IMAGE.to_string()),
            category: self.category.unwrap_or_default(),
            description: non_blank(self.description),
        })
    }
}

/// An item ready to be written
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedItem {
    pub name: String,
    pub price: Price,
    pub image: String,
    pub category: Category,
    pub description: Option<String>,
}

/// Partial admin edit. Absent fields are left untouched; a blank description clears it.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[validate(length(min = 1, max = 200, message = "Item name must not be empty"))]
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
}

/// [`ItemUpdate`] after trimming and price checks
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub price: Option<Price>,
    pub image: Option<String>,
    pub category: Option<Category>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl ItemUpdate {
    pub fn normalized(self) -> Result<ItemChanges, crate::domain::value_objects::PriceError> {
        Ok(ItemChanges {
            name: self.name.map(|n| n.trim().to_string()),
            price: self.price.map(Price::new).transpose()?,
            image: self.image,
            category: self.category,
            description: self.description.map(|d| non_blank(Some(d))),
        })
    }
}

impl ItemChanges {
    pub fn apply(self, item: &mut Item, now: DateTime<Utc>) {
        if let Some(name) = self.name { item.name = name; }
        if let Some(price) = self.price { item.price = price; }
        if let Some(image) = self.image { item.image = image; }
        if let Some(category) = self.category { item.category = category; }
        if let Some(description) = self.description { item.description = description; }
        item.updated_at = Some(now);
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
