//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::domain::aggregates::cart::CartEntry;
use crate::domain::value_objects::{Coordinates, OrderId, StoreId, UnknownVariant, UserId};

/// Address text stored on pickup orders.
pub const PICKUP_ADDRESS_LABEL: &str = "Store";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    /// Pickup at a grooming store
    #[default]
    Store,
    /// Delivery to a customer-chosen address
    Custom,
}

impl DeliveryOption {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Store => "store", Self::Custom => "custom" }
    }
}

impl FromStr for DeliveryOption {
    type Err = UnknownVariant;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(Self::Store),
            "custom" => Ok(Self::Custom),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Fulfilment progress. The variants are listed in their usual order, but staff may
/// set any status from any other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Ready,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [Self::Pending, Self::Confirmed, Self::Ready, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Ready => "ready",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == s).ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Structured part of a delivery address, as typed into the checkout form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressDetails {
    pub apartment: String,
    pub block: String,
    pub house: String,
    pub floor: String,
    pub street: String,
    pub landmark: String,
    pub pincode: String,
    pub city: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub address: String,
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub details: AddressDetails,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CartEntry>,
    pub pet_for: Option<String>,
    pub delivery_option: DeliveryOption,
    pub address: Option<String>,
    /// Missing only on legacy orders written before store assignment existed.
    pub store_id: Option<StoreId>,
    pub delivery_address: Option<DeliveryAddress>,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn from_new(id: OrderId, new: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            items: new.items,
            pet_for: new.pet_for,
            delivery_option: new.delivery_option,
            address: Some(new.address),
            store_id: Some(new.store_id),
            delivery_address: new.delivery_address,
            status: OrderStatus::Pending,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// True for legacy orders that no store has been assigned.
    pub fn is_unassigned(&self) -> bool {
        self.store_id.as_ref().map_or(true, StoreId::is_blank)
    }

    pub fn belongs_to_store(&self, store_id: &StoreId) -> bool { self.store_id.as_ref() == Some(store_id) }

    pub fn subtotal(&self) -> Decimal { self.items.iter().map(CartEntry::line_total).sum() }

    /// Overwrites the status whatever it was before.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
    }
}

/// An order as assembled at checkout, before the store assigns id and timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<CartEntry>,
    pub pet_for: Option<String>,
    pub delivery_option: DeliveryOption,
    pub address: String,
    pub store_id: StoreId,
    pub delivery_address: Option<DeliveryAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(store: Option<&str>) -> Order {
        Order {
            id: OrderId::generate(), user_id: "U1".into(), items: vec![], pet_for: None,
            delivery_option: DeliveryOption::Store, address: None, store_id: store.map(StoreId::from),
            delivery_address: None, status: OrderStatus::Pending, created_at: None, updated_at: None,
        }
    }

    #[test]
    fn test_any_status_to_any_status() {
        let mut o = order(Some("store1"));
        o.set_status(OrderStatus::Ready, Utc::now());
        assert_eq!(o.status, OrderStatus::Ready);
        o.set_status(OrderStatus::Pending, Utc::now());
        assert_eq!(o.status, OrderStatus::Pending);
        assert!(o.updated_at.is_some());
    }

    #[test]
    fn test_unassigned() {
        assert!(order(None).is_unassigned());
        assert!(order(Some("")).is_unassigned());
        assert!(!order(Some("store1")).is_unassigned());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("ready".parse::<OrderStatus>().unwrap(), OrderStatus::Ready);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(order(None)).unwrap();
        assert_eq!(json["deliveryOption"], "store");
        assert_eq!(json["status"], "pending");
        assert!(json["deliveryAddress"].is_null());
        assert!(json["storeId"].is_null());
    }
}
