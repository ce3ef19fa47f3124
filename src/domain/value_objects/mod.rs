//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
            pub fn generate() -> Self { Self(uuid::Uuid::now_v7().to_string()) }
            pub fn as_str(&self) -> &str { &self.0 }
            /// Empty or whitespace-only ids never address a document.
            pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self { Self::new(value) }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self { Self(value) }
        }
    };
}

document_id!(
    /// Document id in the `items` collection
    ItemId
);
document_id!(
    /// Document id in the `stores` collection
    StoreId
);
document_id!(
    /// Document id in the `orders` collection
    OrderId
);
document_id!(
    /// Document id in the `employees` collection
    EmployeeId
);
document_id!(
    /// Identity provider uid of a signed-in customer
    UserId
);

/// Non-negative item price
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(PriceError::Negative); }
        Ok(Self(amount))
    }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn times(&self, qty: u32) -> Decimal { self.0 * Decimal::from(qty) }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self { value.0 }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum PriceError { Negative }
impl std::error::Error for PriceError {}
impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "price must not be negative") }
}

/// Which pet an item is for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cat,
    #[default]
    Dog,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Cat => "cat", Self::Dog => "dog" }
    }

    /// Reads a stored category, falling back to `dog` for missing or unknown values.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cat" => Ok(Self::Cat),
            "dog" => Ok(Self::Dog),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Raised when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)] pub struct UnknownVariant(pub String);
impl std::error::Error for UnknownVariant {}
impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "unknown value `{}`", self.0) }
}

/// Geographic position in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates { pub lat: f64, pub lng: f64 }

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self { Self { lat, lng } }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Label shown for a picked point before a street address is known.
    pub fn fallback_label(&self) -> String { format!("Lat: {:.4}, Lng: {:.4}", self.lat, self.lng) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rejects_negative() {
        assert_eq!(Price::new(Decimal::new(-1, 2)), Err(PriceError::Negative));
        assert_eq!(Price::new(Decimal::new(1299, 2)).unwrap().times(1), Decimal::new(1299, 2));
    }

    #[test]
    fn test_category_fallback() {
        assert_eq!(Category::from_stored(Some("CAT")), Category::Cat);
        assert_eq!(Category::from_stored(Some("hamster")), Category::Dog);
        assert_eq!(Category::from_stored(None), Category::Dog);
    }

    #[test]
    fn test_coordinates_label() {
        let c = Coordinates::new(28.6139, 77.209);
        assert!(c.is_valid());
        assert_eq!(c.fallback_label(), "Lat: 28.6139, Lng: 77.2090");
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn test_blank_ids() {
        assert!(StoreId::new("  ").is_blank());
        assert!(!OrderId::generate().is_blank());
    }
}
