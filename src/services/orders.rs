//! Order reads for dashboards and order tracking, and status updates

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::aggregates::{DeliveryOption, Order, OrderStatus};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{OrderId, StoreId, UserId};
use crate::events::EventPublisher;
use crate::repository::OrderRepository;
use crate::{Result, StorefrontError};

/// How many orders are scanned for legacy orders with no store. Orders without a
/// creation time are scanned before the newest ones.
///
/// Timestamped legacy orders older than this window never show up on a store
/// dashboard. Raising it makes every dashboard load read more documents.
pub const LEGACY_SCAN_LIMIT: usize = 150;

/// Newest first; orders without a timestamp go last.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Unions the store's own orders with the unassigned ones from the scan window,
/// keeping the first copy of any id, newest first.
pub fn merge_store_orders(assigned: Vec<Order>, window: Vec<Order>) -> Vec<Order> {
    let mut seen: HashSet<OrderId> = assigned.iter().map(|o| o.id.clone()).collect();
    let mut merged = assigned;
    for order in window.into_iter().filter(Order::is_unassigned) {
        if seen.insert(order.id.clone()) {
            merged.push(order);
        }
    }
    sort_newest_first(&mut merged);
    merged
}

/// Everything a store dashboard should show: orders assigned to the store plus legacy
/// unassigned orders inside the newest `scan_limit`. If the scan fails the dashboard
/// still gets the assigned orders.
pub async fn orders_for_store<R: OrderRepository>(repo: &R, store_id: &StoreId, scan_limit: usize) -> Result<Vec<Order>> {
    if store_id.is_blank() {
        return Ok(vec![]);
    }
    let assigned = repo.orders_by_store(store_id).await?;
    let window = repo.recent_orders(scan_limit).await.unwrap_or_else(|e| {
        warn!(store_id = %store_id, error = %e, "legacy order scan failed, showing assigned orders only");
        vec![]
    });
    Ok(merge_store_orders(assigned, window))
}

pub async fn delivery_orders_for_store<R: OrderRepository>(repo: &R, store_id: &StoreId, scan_limit: usize) -> Result<Vec<Order>> {
    let mut orders = orders_for_store(repo, store_id, scan_limit).await?;
    orders.retain(|o| o.delivery_option == DeliveryOption::Custom);
    Ok(orders)
}

pub async fn all_orders<R: OrderRepository>(repo: &R) -> Result<Vec<Order>> {
    let mut orders = repo.all_orders().await?;
    sort_newest_first(&mut orders);
    Ok(orders)
}

pub async fn orders_for_user<R: OrderRepository>(repo: &R, user_id: &UserId) -> Result<Vec<Order>> {
    let mut orders = repo.orders_by_user(user_id).await?;
    sort_newest_first(&mut orders);
    Ok(orders)
}

/// Overwrites the order's status and update time. Any status may follow any other;
/// only the latest update time is kept.
pub async fn set_order_status<R: OrderRepository>(
    repo: &R,
    events: &EventPublisher,
    order_id: &OrderId,
    status: OrderStatus,
) -> Result<()> {
    if order_id.is_blank() {
        return Err(StorefrontError::Validation("Missing orderId".into()));
    }
    repo.set_order_status(order_id, status, Utc::now()).await?;
    info!(order_id = %order_id, status = %status, "order status set");
    events.publish(DomainEvent::Order(OrderEvent::StatusChanged { order_id: order_id.clone(), status })).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use chrono::{DateTime, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap() }

    fn order(id: &str, store: Option<&str>, created: Option<i64>, delivery: DeliveryOption) -> Order {
        Order {
            id: id.into(), user_id: "U1".into(), items: vec![], pet_for: None, delivery_option: delivery,
            address: None, store_id: store.map(StoreId::from), delivery_address: None,
            status: OrderStatus::Pending, created_at: created.map(at), updated_at: None,
        }
    }

    fn seeded(orders: Vec<Order>) -> MemoryRepository {
        let repo = MemoryRepository::new();
        for o in orders {
            repo.seed_order(o).unwrap();
        }
        repo
    }

    fn ids(orders: &[Order]) -> Vec<&str> { orders.iter().map(|o| o.id.as_str()).collect() }

    #[tokio::test]
    async fn test_store_orders_include_legacy() {
        let repo = seeded(vec![
            order("A", Some("S"), Some(2), DeliveryOption::Store),
            order("B", None, Some(3), DeliveryOption::Store),
            order("C", Some("T"), Some(1), DeliveryOption::Store),
        ]);
        let orders = orders_for_store(&repo, &"S".into(), LEGACY_SCAN_LIMIT).await.unwrap();
        assert_eq!(ids(&orders), ["B", "A"]);
    }

    #[tokio::test]
    async fn test_empty_store_id_counts_as_legacy() {
        let repo = seeded(vec![
            order("A", Some(""), Some(1), DeliveryOption::Store),
            order("B", Some("S"), None, DeliveryOption::Store),
        ]);
        let orders = orders_for_store(&repo, &"S".into(), LEGACY_SCAN_LIMIT).await.unwrap();
        assert_eq!(ids(&orders), ["A", "B"]);
        assert!(orders_for_store(&repo, &"".into(), LEGACY_SCAN_LIMIT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_outside_window_invisible() {
        let repo = seeded(vec![
            order("old-legacy", None, Some(1), DeliveryOption::Store),
            order("new-1", Some("T"), Some(5), DeliveryOption::Store),
            order("new-2", Some("T"), Some(6), DeliveryOption::Store),
        ]);
        let orders = orders_for_store(&repo, &"S".into(), 2).await.unwrap();
        assert!(orders.is_empty());
        let orders = orders_for_store(&repo, &"S".into(), 3).await.unwrap();
        assert_eq!(ids(&orders), ["old-legacy"]);
    }

    #[tokio::test]
    async fn test_untimestamped_legacy_survives_full_window() {
        let mut orders: Vec<Order> =
            (0..LEGACY_SCAN_LIMIT as i64).map(|i| order(&format!("T{i}"), Some("T"), Some(i), DeliveryOption::Store)).collect();
        orders.push(order("legacy", None, None, DeliveryOption::Store));
        let repo = seeded(orders);
        let orders = orders_for_store(&repo, &"S".into(), LEGACY_SCAN_LIMIT).await.unwrap();
        assert_eq!(ids(&orders), ["legacy"]);
    }

    #[tokio::test]
    async fn test_failed_scan_keeps_assigned_orders() {
        let repo = seeded(vec![
            order("A", Some("S"), Some(2), DeliveryOption::Store),
            order("B", None, Some(3), DeliveryOption::Store),
        ]);
        repo.set_scan_unavailable(true);
        let orders = orders_for_store(&repo, &"S".into(), LEGACY_SCAN_LIMIT).await.unwrap();
        assert_eq!(ids(&orders), ["A"]);
    }

    #[tokio::test]
    async fn test_failed_store_query_is_an_error() {
        let repo = seeded(vec![order("A", Some("S"), Some(2), DeliveryOption::Store)]);
        repo.set_unavailable(true);
        let err = orders_for_store(&repo, &"S".into(), LEGACY_SCAN_LIMIT).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Storage(_)));
    }

    #[test]
    fn test_merge_keeps_first_copy() {
        let mut first = order("A", None, Some(1), DeliveryOption::Store);
        first.pet_for = Some("assigned copy".into());
        let merged = merge_store_orders(vec![first], vec![order("A", None, Some(1), DeliveryOption::Store)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].pet_for.as_deref(), Some("assigned copy"));
    }

    #[tokio::test]
    async fn test_delivery_filter() {
        let repo = seeded(vec![
            order("pickup", Some("S"), Some(1), DeliveryOption::Store),
            order("delivery", Some("S"), Some(2), DeliveryOption::Custom),
        ]);
        let orders = delivery_orders_for_store(&repo, &"S".into(), LEGACY_SCAN_LIMIT).await.unwrap();
        assert_eq!(ids(&orders), ["delivery"]);
    }

    #[tokio::test]
    async fn test_status_jumps_straight_to_ready() {
        let repo = seeded(vec![order("A", Some("S"), Some(1), DeliveryOption::Store)]);
        set_order_status(&repo, &EventPublisher::disabled(), &"A".into(), OrderStatus::Ready).await.unwrap();
        let stored = repo.get_order(&"A".into()).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Ready);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_status_errors() {
        let repo = MemoryRepository::new();
        let events = EventPublisher::disabled();
        let err = set_order_status(&repo, &events, &"".into(), OrderStatus::Ready).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        let err = set_order_status(&repo, &events, &"ghost".into(), OrderStatus::Ready).await.unwrap_err();
        assert!(matches!(err, StorefrontError::NotFound("order")));
    }

    #[tokio::test]
    async fn test_user_orders_newest_first() {
        let repo = seeded(vec![
            order("A", Some("S"), Some(1), DeliveryOption::Store),
            order("B", Some("S"), Some(9), DeliveryOption::Store),
        ]);
        assert_eq!(ids(&orders_for_user(&repo, &"U1".into()).await.unwrap()), ["B", "A"]);
        assert_eq!(ids(&all_orders(&repo).await.unwrap()), ["B", "A"]);
        assert!(orders_for_user(&repo, &"U2".into()).await.unwrap().is_empty());
    }
}
