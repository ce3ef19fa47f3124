//! Aggregates module
pub mod cart;
pub mod employee;
pub mod item;
pub mod order;
pub mod store;
pub mod user;

pub use cart::{Cart, CartEntry, CartError, CartProduct};
pub use employee::{Employee, EmployeeRole, EmployeeSession, EmployeeUpdate, NewEmployee};
pub use item::{Item, ItemChanges, ItemUpdate, NewItem, NormalizedItem};
pub use order::{AddressDetails, DeliveryAddress, DeliveryOption, NewOrder, Order, OrderStatus};
pub use store::{NewStore, Store, StoreChanges, StoreUpdate, DEFAULT_STORE_ID};
pub use user::{UserProfile, UserRole};
