//! Cart Aggregate
//!
//! The storefront runs a giveaway: a cart holds at most one product, one unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::value_objects::{ItemId, Price};

/// Most units of a single product a cart may hold.
pub const MAX_UNITS_PER_PRODUCT: u32 = 1;
/// Most distinct products a cart may hold.
pub const MAX_DISTINCT_PRODUCTS: usize = 1;

/// Product snapshot taken when the item is added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartEntry {
    pub fn line_total(&self) -> Decimal { self.price.times(self.quantity) }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    /// Rebuilds a cart from a stored snapshot, dropping anything the cart rules would
    /// never have produced: zero quantities, repeated ids, extra products.
    pub fn from_entries(entries: Vec<CartEntry>) -> Self {
        let mut cart = Self::new();
        for mut entry in entries {
            if entry.quantity == 0 || cart.contains(&entry.id) || cart.entries.len() >= MAX_DISTINCT_PRODUCTS {
                continue;
            }
            entry.quantity = entry.quantity.min(MAX_UNITS_PER_PRODUCT);
            cart.entries.push(entry);
        }
        cart
    }

    pub fn entries(&self) -> &[CartEntry] { &self.entries }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn contains(&self, id: &ItemId) -> bool { self.entries.iter().any(|e| &e.id == id) }

    pub fn total_items(&self) -> u32 { self.entries.iter().map(|e| e.quantity).sum() }
    pub fn subtotal(&self) -> Decimal { self.entries.iter().map(CartEntry::line_total).sum() }

    pub fn add(&mut self, product: CartProduct) -> Result<(), CartError> {
        if self.entries.len() >= MAX_DISTINCT_PRODUCTS {
            return Err(CartError::OnlyOneItem);
        }
        self.entries.push(CartEntry {
            id: product.id,
            name: product.name,
            price: product.price,
            image: product.image,
            quantity: 1,
        });
        Ok(())
    }

    /// Applies `delta` to the entry's quantity. Reaching zero removes the entry; going
    /// past the per-product ceiling is refused and leaves the entry as it was.
    /// Unknown ids are ignored.
    pub fn change_quantity(&mut self, id: &ItemId, delta: i64) -> Result<(), CartError> {
        let Some(pos) = self.entries.iter().position(|e| &e.id == id) else { return Ok(()) };
        let next = i64::from(self.entries[pos].quantity) + delta;
        if next > i64::from(MAX_UNITS_PER_PRODUCT) {
            return Err(CartError::QuantityLimit);
        }
        if next <= 0 {
            self.entries.remove(pos);
        } else {
            // next is within 1..=MAX_UNITS_PER_PRODUCT here
            self.entries[pos].quantity = next as u32;
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) { self.entries.clear(); }
}

/// Cart rule violations. The message is what the shopper sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Giveaway allows only 1 item")]
    OnlyOneItem,
    #[error("Only 1 quantity allowed")]
    QuantityLimit,
}
