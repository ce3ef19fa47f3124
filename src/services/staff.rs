//! Employee accounts

use tracing::{debug, info};
use validator::Validate;

use crate::domain::aggregates::{Employee, EmployeeSession, EmployeeUpdate, NewEmployee};
use crate::domain::value_objects::{EmployeeId, StoreId};
use crate::repository::{EmployeeFilter, EmployeeRepository, RepositoryError};
use crate::{Result, StorefrontError};

/// Checks staff credentials against active employees. Returns the session on a match
/// and `None` for any mismatch, without saying which part was wrong.
pub async fn verify_employee<R: EmployeeRepository>(
    repo: &R,
    email: &str,
    password: &str,
) -> std::result::Result<Option<EmployeeSession>, RepositoryError> {
    if email.trim().is_empty() || password.is_empty() {
        return Ok(None);
    }
    let active = repo.list_employees(EmployeeFilter { store_id: None, active_only: true }).await?;
    let session = active.iter().find(|e| e.matches_credentials(email, password)).map(Employee::session);
    if session.is_none() {
        debug!("employee sign-in rejected");
    }
    Ok(session)
}

pub async fn create_employee<R: EmployeeRepository>(repo: &R, new: NewEmployee) -> Result<Employee> {
    new.validate()?;
    let employee = repo.insert_employee(new.normalized()).await?;
    info!(employee_id = %employee.id, store_id = %employee.store_id, role = %employee.role, "employee created");
    Ok(employee)
}

pub async fn employee_by_id<R: EmployeeRepository>(repo: &R, id: &EmployeeId) -> Result<Option<Employee>> {
    if id.is_blank() {
        return Ok(None);
    }
    Ok(repo.get_employee(id).await?)
}

pub async fn store_employees<R: EmployeeRepository>(repo: &R, store_id: &StoreId) -> Result<Vec<Employee>> {
    if store_id.is_blank() {
        return Ok(vec![]);
    }
    Ok(repo.list_employees(EmployeeFilter { store_id: Some(store_id.clone()), active_only: false }).await?)
}

pub async fn all_employees<R: EmployeeRepository>(repo: &R) -> Result<Vec<Employee>> {
    Ok(repo.list_employees(EmployeeFilter::default()).await?)
}

pub async fn update_employee<R: EmployeeRepository>(repo: &R, id: &EmployeeId, update: EmployeeUpdate) -> Result<()> {
    require_id(id)?;
    update.validate()?;
    repo.update_employee(id, update.normalized()).await?;
    info!(employee_id = %id, "employee updated");
    Ok(())
}

/// Hard delete.
pub async fn delete_employee<R: EmployeeRepository>(repo: &R, id: &EmployeeId) -> Result<()> {
    require_id(id)?;
    repo.delete_employee(id).await?;
    info!(employee_id = %id, "employee deleted");
    Ok(())
}

fn require_id(id: &EmployeeId) -> Result<()> {
    if id.is_blank() {
        return Err(StorefrontError::Validation("Missing employee id".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::EmployeeRole;
    use crate::repository::MemoryRepository;

    fn new_employee(email: &str, store: &str) -> NewEmployee {
        NewEmployee { email: email.into(), password: "pw".into(), name: "Sam".into(), store_id: store.into(), role: None }
    }

    #[tokio::test]
    async fn test_verify_skips_inactive() {
        let repo = MemoryRepository::new();
        let e = create_employee(&repo, new_employee("sam@zoomies.test", "store1")).await.unwrap();
        assert_eq!(e.role, EmployeeRole::Employee);
        assert!(verify_employee(&repo, "SAM@zoomies.test", "pw").await.unwrap().is_some());

        update_employee(&repo, &e.id, EmployeeUpdate { is_active: Some(false), ..Default::default() }).await.unwrap();
        assert!(verify_employee(&repo, "sam@zoomies.test", "pw").await.unwrap().is_none());
        assert!(verify_employee(&repo, "", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_scoping_and_delete() {
        let repo = MemoryRepository::new();
        let a = create_employee(&repo, new_employee("a@zoomies.test", "store1")).await.unwrap();
        create_employee(&repo, new_employee("b@zoomies.test", "store2")).await.unwrap();
        assert_eq!(store_employees(&repo, &"store1".into()).await.unwrap().len(), 1);
        assert!(store_employees(&repo, &"".into()).await.unwrap().is_empty());

        delete_employee(&repo, &a.id).await.unwrap();
        assert_eq!(all_employees(&repo).await.unwrap().len(), 1);
        assert_eq!(employee_by_id(&repo, &a.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let repo = MemoryRepository::new();
        let err = create_employee(&repo, new_employee("not-an-email", "store1")).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }
}
