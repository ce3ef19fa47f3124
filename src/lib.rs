//! Zoomies pet grooming storefront
//!
//! Backend for a grooming shop that gives away one product per customer.
//!
//! ## Features
//! - Cat and dog item catalog
//! - One-item giveaway cart kept in client-local storage
//! - Checkout with store pickup or geocoded home delivery
//! - Store dashboards that also surface legacy orders with no store assigned
//! - Admin management of items, stores and employees

use thiserror::Error;
use validator::ValidationErrors;

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod geo;
pub mod repository;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;

use repository::RepositoryError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Please sign in to continue")]
    Unauthenticated,

    #[error("You do not have access to this resource")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for StorefrontError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

impl From<ValidationErrors> for StorefrontError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        let message = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| e.message.as_ref().map_or_else(|| format!("Invalid {field}"), |m| m.to_string()))
            })
            .next()
            .unwrap_or_else(|| "Invalid input".to_string());
        Self::Validation(message)
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
