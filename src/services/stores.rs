//! Store lookup and admin store management

use tracing::info;
use validator::Validate;

use crate::domain::aggregates::{NewStore, Store, StoreUpdate};
use crate::domain::value_objects::StoreId;
use crate::repository::StoreRepository;
use crate::{Result, StorefrontError};

/// Pickup store details. A blank id gives `None`; an id with no document gives the
/// placeholder store.
pub async fn store_by_id<R: StoreRepository>(repo: &R, id: &StoreId) -> Result<Option<Store>> {
    if id.is_blank() {
        return Ok(None);
    }
    Ok(Some(repo.get_store(id).await?.unwrap_or_else(|| Store::placeholder(id.clone()))))
}

pub async fn all_stores<R: StoreRepository>(repo: &R) -> Result<Vec<Store>> { Ok(repo.list_stores().await?) }

pub async fn create_store<R: StoreRepository>(repo: &R, new: NewStore) -> Result<Store> {
    new.validate()?;
    let store = repo.insert_store(new.normalized()).await?;
    info!(store_id = %store.id, "store created");
    Ok(store)
}

pub async fn update_store<R: StoreRepository>(repo: &R, id: &StoreId, update: StoreUpdate) -> Result<()> {
    require_id(id)?;
    update.validate()?;
    repo.update_store(id, update.normalized()).await?;
    info!(store_id = %id, "store updated");
    Ok(())
}

pub async fn delete_store<R: StoreRepository>(repo: &R, id: &StoreId) -> Result<()> {
    require_id(id)?;
    repo.delete_store(id).await?;
    info!(store_id = %id, "store deleted");
    Ok(())
}

fn require_id(id: &StoreId) -> Result<()> {
    if id.is_blank() {
        return Err(StorefrontError::Validation("Missing store id".into()));
    }
    Ok(())
}
