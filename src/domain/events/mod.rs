//! Domain events
use serde::Serialize;
use crate::domain::aggregates::{DeliveryOption, OrderStatus};
use crate::domain::value_objects::{ItemId, OrderId, StoreId, UserId};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    Order(OrderEvent),
    Catalog(CatalogEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: OrderId, user_id: UserId, store_id: StoreId, delivery_option: DeliveryOption },
    StatusChanged { order_id: OrderId, status: OrderStatus },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    ItemCreated { item_id: ItemId },
    ItemDeleted { item_id: ItemId },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(OrderEvent::Placed { .. }) => "orders.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "orders.status_changed",
            Self::Catalog(CatalogEvent::ItemCreated { .. }) => "catalog.item_created",
            Self::Catalog(CatalogEvent::ItemDeleted { .. }) => "catalog.item_deleted",
        }
    }
}
