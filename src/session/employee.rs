use std::sync::Arc;

use tracing::{info, warn};

use super::SessionError;
use crate::domain::aggregates::EmployeeSession;
use crate::repository::EmployeeRepository;
use crate::services::staff;
use crate::storage::LocalStorage;

/// Storage key the staff session lives under.
pub const EMPLOYEE_SESSION_KEY: &str = "employeeSession";

/// Signed-in staff member for one browser. Sessions carry no expiry; they end on
/// logout only.
pub struct EmployeeSessionStore {
    storage: Arc<dyn LocalStorage>,
    key: String,
    current: Option<EmployeeSession>,
}

impl EmployeeSessionStore {
    pub fn open(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = match storage.get(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw)
                .map_err(|e| warn!(key = %key, error = %e, "discarding unreadable employee session"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "employee session storage unreadable");
                None
            }
        };
        Self { storage, key, current }
    }

    pub fn for_session(storage: Arc<dyn LocalStorage>, session: &str) -> Self {
        Self::open(storage, format!("{EMPLOYEE_SESSION_KEY}:{session}"))
    }

    pub fn current(&self) -> Option<&EmployeeSession> { self.current.as_ref() }
    pub fn is_logged_in(&self) -> bool { self.current.is_some() }

    pub async fn login<R: EmployeeRepository>(
        &mut self,
        repo: &R,
        email: &str,
        password: &str,
    ) -> Result<EmployeeSession, SessionError> {
        let session = staff::verify_employee(repo, email, password).await?.ok_or(SessionError::InvalidCredentials)?;
        self.storage.set(&self.key, &serde_json::to_string(&session)?)?;
        info!(employee_id = %session.id, store_id = %session.store_id, "employee signed in");
        self.current = Some(session.clone());
        Ok(session)
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.current = None;
        self.storage.remove(&self.key)?;
        Ok(())
    }
}
