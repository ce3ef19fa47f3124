//! Item listing and admin item management

use tracing::info;
use validator::Validate;

use crate::domain::aggregates::{Item, ItemUpdate, NewItem};
use crate::domain::events::{CatalogEvent, DomainEvent};
use crate::domain::value_objects::{Category, ItemId};
use crate::events::EventPublisher;
use crate::repository::ItemRepository;
use crate::{Result, StorefrontError};

pub async fn items_by_category<R: ItemRepository>(repo: &R, category: Category) -> Result<Vec<Item>> {
    Ok(repo.list_items(Some(category)).await?)
}

pub async fn all_items<R: ItemRepository>(repo: &R) -> Result<Vec<Item>> { Ok(repo.list_items(None).await?) }

/// Blank ids resolve to `None` without a lookup.
pub async fn item_by_id<R: ItemRepository>(repo: &R, id: &ItemId) -> Result<Option<Item>> {
    if id.is_blank() {
        return Ok(None);
    }
    Ok(repo.get_item(id).await?)
}

pub async fn create_item<R: ItemRepository>(repo: &R, events: &EventPublisher, new: NewItem) -> Result<Item> {
    new.validate()?;
    let item = new.normalized().map_err(|e| StorefrontError::Validation(e.to_string()))?;
    let item = repo.insert_item(item).await?;
    info!(item_id = %item.id, category = %item.category, "item created");
    events.publish(DomainEvent::Catalog(CatalogEvent::ItemCreated { item_id: item.id.clone() })).await;
    Ok(item)
}

pub async fn update_item<R: ItemRepository>(repo: &R, id: &ItemId, update: ItemUpdate) -> Result<()> {
    require_id(id)?;
    update.validate()?;
    let changes = update.normalized().map_err(|e| StorefrontError::Validation(e.to_string()))?;
    repo.update_item(id, changes).await?;
    info!(item_id = %id, "item updated");
    Ok(())
}

pub async fn delete_item<R: ItemRepository>(repo: &R, events: &EventPublisher, id: &ItemId) -> Result<()> {
    require_id(id)?;
    repo.delete_item(id).await?;
    info!(item_id = %id, "item deleted");
    events.publish(DomainEvent::Catalog(CatalogEvent::ItemDeleted { item_id: id.clone() })).await;
    Ok(())
}

fn require_id(id: &ItemId) -> Result<()> {
    if id.is_blank() {
        return Err(StorefrontError::Validation("Missing item id".into()));
    }
    Ok(())
}
