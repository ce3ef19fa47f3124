//! Storefront operations, generic over the repository traits
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod profile;
pub mod staff;
pub mod stores;
