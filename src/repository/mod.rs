//! Document collections behind the storefront
//!
//! Five collections, one trait each: `items`, `stores`, `employees`, `orders` and
//! `users`. [`PgRepository`] keeps them in Postgres (nested order parts as JSONB);
//! [`MemoryRepository`] keeps them in process for tests and local runs.
//!
//! Every write is a single-document operation with last-writer-wins semantics. There
//! are no version columns and no compare-and-swap.

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::aggregates::{
    Employee, EmployeeUpdate, Item, ItemChanges, NewEmployee, NewOrder, NewStore, NormalizedItem, Order,
    OrderStatus, Store, StoreChanges, UserProfile,
};
use crate::domain::value_objects::{Category, EmployeeId, ItemId, OrderId, StoreId, UserId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("stored document is malformed: {0}")]
    DataCorruption(String),

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

pub trait ItemRepository: Send + Sync {
    /// All items, or only those in `category`.
    fn list_items(&self, category: Option<Category>) -> impl Future<Output = RepoResult<Vec<Item>>> + Send;
    fn get_item(&self, id: &ItemId) -> impl Future<Output = RepoResult<Option<Item>>> + Send;
    fn insert_item(&self, item: NormalizedItem) -> impl Future<Output = RepoResult<Item>> + Send;
    fn update_item(&self, id: &ItemId, changes: ItemChanges) -> impl Future<Output = RepoResult<()>> + Send;
    fn delete_item(&self, id: &ItemId) -> impl Future<Output = RepoResult<()>> + Send;
}

pub trait StoreRepository: Send + Sync {
    fn list_stores(&self) -> impl Future<Output = RepoResult<Vec<Store>>> + Send;
    fn get_store(&self, id: &StoreId) -> impl Future<Output = RepoResult<Option<Store>>> + Send;
    fn insert_store(&self, store: NewStore) -> impl Future<Output = RepoResult<Store>> + Send;
    fn update_store(&self, id: &StoreId, changes: StoreChanges) -> impl Future<Output = RepoResult<()>> + Send;
    fn delete_store(&self, id: &StoreId) -> impl Future<Output = RepoResult<()>> + Send;
}

/// Which employees to list
#[derive(Clone, Debug, Default)]
pub struct EmployeeFilter {
    pub store_id: Option<StoreId>,
    pub active_only: bool,
}

pub trait EmployeeRepository: Send + Sync {
    fn list_employees(&self, filter: EmployeeFilter) -> impl Future<Output = RepoResult<Vec<Employee>>> + Send;
    fn get_employee(&self, id: &EmployeeId) -> impl Future<Output = RepoResult<Option<Employee>>> + Send;
    /// Expects a payload already passed through [`NewEmployee::normalized`].
    fn insert_employee(&self, employee: NewEmployee) -> impl Future<Output = RepoResult<Employee>> + Send;
    fn update_employee(&self, id: &EmployeeId, update: EmployeeUpdate) -> impl Future<Output = RepoResult<()>> + Send;
    fn delete_employee(&self, id: &EmployeeId) -> impl Future<Output = RepoResult<()>> + Send;
}

pub trait OrderRepository: Send + Sync {
    /// Creates the order document in one write. Status starts at `pending`; the store
    /// assigns id and timestamps.
    fn insert_order(&self, order: NewOrder) -> impl Future<Output = RepoResult<Order>> + Send;
    fn get_order(&self, id: &OrderId) -> impl Future<Output = RepoResult<Option<Order>>> + Send;
    fn orders_by_store(&self, store_id: &StoreId) -> impl Future<Output = RepoResult<Vec<Order>>> + Send;
    /// Up to `limit` orders, unfiltered: those without a creation time first, then the
    /// most recently created.
    fn recent_orders(&self, limit: usize) -> impl Future<Output = RepoResult<Vec<Order>>> + Send;
    fn orders_by_user(&self, user_id: &UserId) -> impl Future<Output = RepoResult<Vec<Order>>> + Send;
    fn all_orders(&self) -> impl Future<Output = RepoResult<Vec<Order>>> + Send;
    fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> impl Future<Output = RepoResult<()>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn get_profile(&self, uid: &UserId) -> impl Future<Output = RepoResult<Option<UserProfile>>> + Send;
    fn upsert_profile(&self, profile: UserProfile) -> impl Future<Output = RepoResult<()>> + Send;
}

/// Everything the service needs from its document store.
pub trait Repository:
    ItemRepository + StoreRepository + EmployeeRepository + OrderRepository + UserRepository + Clone + 'static
{
}

impl<T> Repository for T where
    T: ItemRepository + StoreRepository + EmployeeRepository + OrderRepository + UserRepository + Clone + 'static
{
}
