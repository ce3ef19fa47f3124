//! Per-browser session state: the cart and the staff session
//!
//! Both are explicit store objects over [`LocalStorage`](crate::storage::LocalStorage):
//! opened (hydrated) at the start of a request, changed only through their methods,
//! and flushed to storage on every change.

use thiserror::Error;

use crate::domain::aggregates::CartError;
use crate::repository::RepositoryError;
use crate::storage::StorageError;

pub mod cart;
pub mod employee;
pub mod locks;

pub use cart::{CartStore, CART_STORAGE_KEY};
pub use employee::{EmployeeSessionStore, EMPLOYEE_SESSION_KEY};
pub use locks::SessionLocks;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("session snapshot could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
