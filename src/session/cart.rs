use std::sync::Arc;

use tracing::warn;

use super::SessionError;
use crate::domain::aggregates::{Cart, CartEntry, CartProduct};
use crate::domain::value_objects::ItemId;
use crate::storage::LocalStorage;

/// Storage key the cart snapshot lives under.
pub const CART_STORAGE_KEY: &str = "cart";

/// A shopper's cart bound to its storage slot. Hydrated once on open; every change
/// that goes through is written back as a full snapshot.
pub struct CartStore {
    storage: Arc<dyn LocalStorage>,
    key: String,
    cart: Cart,
}

impl CartStore {
    pub fn open(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartEntry>>(&raw) {
                Ok(entries) => Cart::from_entries(entries),
                Err(e) => {
                    warn!(key = %key, error = %e, "discarding unreadable cart snapshot");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "cart storage unreadable, starting empty");
                Cart::new()
            }
        };
        Self { storage, key, cart }
    }

    /// Cart of one browser session, keyed `cart:<session>`.
    pub fn for_session(storage: Arc<dyn LocalStorage>, session: &str) -> Self {
        Self::open(storage, format!("{CART_STORAGE_KEY}:{session}"))
    }

    pub fn cart(&self) -> &Cart { &self.cart }

    pub fn add(&mut self, product: CartProduct) -> Result<(), SessionError> {
        self.cart.add(product)?;
        self.flush()
    }

    pub fn change_quantity(&mut self, id: &ItemId, delta: i64) -> Result<(), SessionError> {
        self.cart.change_quantity(id, delta)?;
        self.flush()
    }

    pub fn remove(&mut self, id: &ItemId) -> Result<(), SessionError> {
        self.cart.remove(id);
        self.flush()
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.cart.clear();
        self.flush()
    }

    fn flush(&self) -> Result<(), SessionError> {
        let snapshot = serde_json::to_string(&self.cart)?;
        self.storage.set(&self.key, &snapshot)?;
        Ok(())
    }
}
