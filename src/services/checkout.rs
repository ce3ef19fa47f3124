//! Order placement
//!
//! A checkout moves `Idle → Validating → Submitting → Placed`. Validation failures
//! go `Validating → Rejected → Idle` and never touch the order store; a failed write
//! goes `Submitting → Failed → Idle`. The order is one document written in one call,
//! so a failure leaves nothing behind.
//!
//! There is no idempotency key: submitting twice places two orders. The only guard is
//! that a browser session cannot start a second submission while one is in flight.
//!
//! The cart is not cleared here. It is cleared when the shopper loads the order
//! confirmation ([`OrderPlacer::confirm`]), so nothing that watches for an empty cart
//! can fire before the confirmation exists.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::aggregates::order::PICKUP_ADDRESS_LABEL;
use crate::domain::aggregates::{AddressDetails, Cart, DeliveryAddress, DeliveryOption, NewOrder, Order};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Coordinates, OrderId, StoreId, UserId};
use crate::events::EventPublisher;
use crate::repository::{OrderRepository, RepositoryError};
use crate::session::CartStore;
use crate::{Result, StorefrontError};

pub const CONFIRMATION_PATH: &str = "/order-placed";
pub const SIGN_IN_PATH: &str = "/login";
pub const LISTING_PATH: &str = "/items";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Validating,
    Submitting,
    Placed,
    Rejected,
    Failed,
}

impl CheckoutState {
    pub fn can_advance_to(self, next: CheckoutState) -> bool {
        use CheckoutState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Submitting)
                | (Validating, Rejected)
                | (Submitting, Placed)
                | (Submitting, Failed)
                | (Rejected, Idle)
                | (Failed, Idle)
        )
    }
}

/// Progress of a single checkout attempt.
#[derive(Debug)]
pub struct CheckoutFlow {
    state: CheckoutState,
}

impl Default for CheckoutFlow {
    fn default() -> Self { Self { state: CheckoutState::Idle } }
}

impl CheckoutFlow {
    pub fn state(&self) -> CheckoutState { self.state }

    fn advance(&mut self, next: CheckoutState) {
        if !self.state.can_advance_to(next) {
            error!(from = ?self.state, to = ?next, "illegal checkout transition");
        }
        debug!(from = ?self.state, to = ?next, "checkout transition");
        self.state = next;
    }

    /// Records a rejection or failure and returns to `Idle`.
    fn fall_back(&mut self, via: CheckoutState) {
        self.advance(via);
        self.advance(CheckoutState::Idle);
    }
}

/// Where the order goes, as chosen on the checkout form.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "deliveryOption", rename_all = "lowercase")]
pub enum DeliverySelection {
    Store {
        #[serde(default, rename = "storeId")]
        store_id: Option<StoreId>,
    },
    Custom {
        #[serde(default)]
        address: Option<String>,
        #[serde(default)]
        coordinates: Option<Coordinates>,
        #[serde(default)]
        details: AddressDetails,
    },
}

#[derive(Clone, Debug)]
pub struct CheckoutRequest {
    pub user_id: Option<UserId>,
    pub delivery: DeliverySelection,
    pub pet_for: Option<String>,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please sign in to place your order.")]
    NotSignedIn,

    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Please select your delivery location")]
    MissingDeliveryAddress,

    #[error("Your order is already being placed.")]
    InFlight,

    #[error("Could not place your order. Please try again.")]
    Write(#[source] RepositoryError),
}

impl CheckoutError {
    /// Page the shopper is sent to instead of seeing the error inline.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::NotSignedIn => Some(SIGN_IN_PATH),
            Self::EmptyCart => Some(LISTING_PATH),
            _ => None,
        }
    }
}

/// Builds the order document for the current cart, or says why it cannot be placed.
pub fn assemble_order(request: CheckoutRequest, cart: &Cart, default_store: &StoreId) -> std::result::Result<NewOrder, CheckoutError> {
    let user_id = request.user_id.filter(|u| !u.is_blank()).ok_or(CheckoutError::NotSignedIn)?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let pet_for = request.pet_for.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());

    let (delivery_option, address, store_id, delivery_address) = match request.delivery {
        DeliverySelection::Store { store_id } => {
            let store_id = store_id.filter(|s| !s.is_blank()).unwrap_or_else(|| default_store.clone());
            (DeliveryOption::Store, PICKUP_ADDRESS_LABEL.to_string(), store_id, None)
        }
        DeliverySelection::Custom { address, coordinates, details } => {
            let address = address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .ok_or(CheckoutError::MissingDeliveryAddress)?;
            let coordinates = coordinates.filter(|c| {
                let valid = c.is_valid();
                if !valid {
                    warn!(lat = c.lat, lng = c.lng, "dropping out-of-range delivery coordinates");
                }
                valid
            });
            let delivery = DeliveryAddress { address: address.clone(), coordinates, details };
            (DeliveryOption::Custom, address, default_store.clone(), Some(delivery))
        }
    };

    Ok(NewOrder {
        user_id,
        items: cart.entries().to_vec(),
        pet_for,
        delivery_option,
        address,
        store_id,
        delivery_address,
    })
}

#[derive(Clone, Default)]
struct Submissions {
    active: Arc<Mutex<HashSet<String>>>,
}

/// Held for the duration of one submission; dropping it frees the session.
struct SubmissionTicket {
    key: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Submissions {
    fn begin(&self, key: &str) -> Option<SubmissionTicket> {
        let mut active = self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !active.insert(key.to_string()) {
            return None;
        }
        Some(SubmissionTicket { key: key.to_string(), active: self.active.clone() })
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        active.remove(&self.key);
    }
}

#[derive(Clone, Debug)]
pub struct PlacedOrder {
    pub order: Order,
    pub redirect_to: &'static str,
}

#[derive(Clone)]
pub struct OrderPlacer<R> {
    repo: R,
    default_store: StoreId,
    events: EventPublisher,
    submissions: Submissions,
}

impl<R: OrderRepository> OrderPlacer<R> {
    pub fn new(repo: R, default_store: StoreId, events: EventPublisher) -> Self {
        Self { repo, default_store, events, submissions: Submissions::default() }
    }

    /// Places the cart as a new `pending` order for `session`.
    pub async fn place_order(&self, session: &str, request: CheckoutRequest, cart: &Cart) -> std::result::Result<PlacedOrder, CheckoutError> {
        let _ticket = self.submissions.begin(session).ok_or(CheckoutError::InFlight)?;
        let mut flow = CheckoutFlow::default();

        flow.advance(CheckoutState::Validating);
        let new_order = match assemble_order(request, cart, &self.default_store) {
            Ok(order) => order,
            Err(e) => {
                info!(reason = %e, "checkout rejected");
                flow.fall_back(CheckoutState::Rejected);
                return Err(e);
            }
        };

        flow.advance(CheckoutState::Submitting);
        let order = match self.repo.insert_order(new_order).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "order write failed");
                flow.fall_back(CheckoutState::Failed);
                return Err(CheckoutError::Write(e));
            }
        };
        flow.advance(CheckoutState::Placed);

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            delivery = order.delivery_option.as_str(),
            "order placed"
        );
        if let Some(store_id) = order.store_id.clone() {
            self.events
                .publish(DomainEvent::Order(OrderEvent::Placed {
                    order_id: order.id.clone(),
                    user_id: order.user_id.clone(),
                    store_id,
                    delivery_option: order.delivery_option,
                }))
                .await;
        }
        Ok(PlacedOrder { order, redirect_to: CONFIRMATION_PATH })
    }

    /// Loads the confirmation for the shopper's own order, then empties their cart.
    pub async fn confirm(&self, order_id: &OrderId, user_id: &UserId, cart: &mut CartStore) -> Result<Order> {
        let order = self
            .repo
            .get_order(order_id)
            .await?
            .filter(|o| &o.user_id == user_id)
            .ok_or(StorefrontError::NotFound("order"))?;
        if let Err(e) = cart.clear() {
            warn!(order_id = %order.id, error = %e, "cart not cleared after confirmation");
        }
        Ok(order)
    }
}
