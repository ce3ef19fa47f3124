//! Request identity and access rules
//!
//! Customers are identified by the upstream identity proxy through [`USER_HEADER`].
//! Staff sign in through the employee session store; [`SESSION_HEADER`] names the
//! browser session holding that sign-in.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::debug;

use crate::domain::aggregates::{EmployeeRole, EmployeeSession, Order, UserProfile};
use crate::domain::value_objects::{StoreId, UserId};
use crate::repository::{EmployeeRepository, UserRepository};
use crate::session::EmployeeSessionStore;
use crate::storage::LocalStorage;
use crate::{Result, StorefrontError};

pub const USER_HEADER: &str = "x-user-id";
pub const SESSION_HEADER: &str = "x-session-id";

/// Everyone a request may be acting as. A browser can carry both a customer sign-in
/// and a staff session at once.
#[derive(Clone, Debug, Default)]
pub struct Actor {
    pub user_id: Option<UserId>,
    pub profile: Option<UserProfile>,
    pub employee: Option<EmployeeSession>,
}

impl Actor {
    pub fn anonymous() -> Self { Self::default() }

    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(UserProfile::is_admin)
            || self.employee.as_ref().is_some_and(|e| e.role == EmployeeRole::Admin)
    }

    /// Staff see their own store; admin staff see any store.
    pub fn can_view_store(&self, store_id: &StoreId) -> bool {
        match &self.employee {
            Some(e) => e.role == EmployeeRole::Admin || &e.store_id == store_id,
            None => false,
        }
    }

    /// Admins may update any order. Staff may update orders of their store and the
    /// unassigned legacy orders their dashboard shows.
    pub fn can_update_order(&self, order: &Order) -> bool {
        if self.is_admin() {
            return true;
        }
        match &self.employee {
            Some(e) => order.belongs_to_store(&e.store_id) || order.is_unassigned(),
            None => false,
        }
    }

    pub fn require_customer(&self) -> Result<&UserId> { self.user_id.as_ref().ok_or(StorefrontError::Unauthenticated) }

    pub fn require_employee(&self) -> Result<&EmployeeSession> {
        self.employee.as_ref().ok_or(StorefrontError::Unauthenticated)
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            return Ok(());
        }
        if self.user_id.is_none() && self.employee.is_none() {
            return Err(StorefrontError::Unauthenticated);
        }
        Err(StorefrontError::Forbidden)
    }
}

pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
}

/// Builds the [`Actor`] for a request. A staff session only counts while the employee
/// record behind it still exists and is active; the returned session reflects the
/// record's current store and role.
pub async fn resolve_actor<R>(repo: &R, storage: &Arc<dyn LocalStorage>, headers: &HeaderMap) -> Result<Actor>
where
    R: UserRepository + EmployeeRepository,
{
    let user_id = header_value(headers, USER_HEADER).map(UserId::from);
    let profile = match &user_id {
        Some(uid) => repo.get_profile(uid).await?,
        None => None,
    };

    let employee = match header_value(headers, SESSION_HEADER) {
        Some(session) => {
            let stored = EmployeeSessionStore::for_session(storage.clone(), session).current().cloned();
            match stored {
                Some(s) => match repo.get_employee(&s.id).await? {
                    Some(record) if record.is_active => Some(record.session()),
                    _ => {
                        debug!(employee_id = %s.id, "stale employee session ignored");
                        None
                    }
                },
                None => None,
            }
        }
        None => None,
    };

    Ok(Actor { user_id, profile, employee })
}
