//! Inventory record storage boundary.
//!
//! The `InventoryStore` trait is the only way records are written. Every
//! operation touches a single record and is atomic on its own; nothing spans
//! multiple records.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stocktrack_core::{DomainError, ItemId};
use stocktrack_inventory::{InventoryFilter, InventoryItem, ItemChanges, ItemFields};

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryInventoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresInventoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// `Validation`, `NotFound` and `Conflict` are caller mistakes and carry a
/// message fit for clients. `Backend` is an infrastructure fault; its detail is
/// for logs only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Inventory item with id '{0}' was not found.")]
    NotFound(ItemId),

    #[error("{0}")]
    Conflict(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn duplicate_product(product_id: i64) -> Self {
        Self::Conflict(format!(
            "Inventory item with product_id '{product_id}' already exists."
        ))
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => StoreError::Validation(msg),
            DomainError::InvalidId(_) => StoreError::Validation(err.to_string()),
        }
    }
}

/// Durable record of inventory items, queryable by id or by filter.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Persist a new record under a freshly assigned id.
    async fn create(&self, fields: ItemFields) -> StoreResult<InventoryItem>;

    async fn get(&self, id: ItemId) -> StoreResult<InventoryItem>;

    /// Overwrite the supplied fields of an existing record.
    async fn update(&self, id: ItemId, changes: ItemChanges) -> StoreResult<InventoryItem>;

    /// Remove a record. Absent ids are not an error; returns whether a record was removed.
    async fn delete(&self, id: ItemId) -> StoreResult<bool>;

    /// Records matching `filter`, ordered by ascending id.
    async fn list(&self, filter: &InventoryFilter) -> StoreResult<Vec<InventoryItem>>;

    /// Apply the restock rule to one record and return it.
    async fn restock(&self, id: ItemId) -> StoreResult<InventoryItem>;

    /// Drop every record (dev/test reset). Ids are still never reused.
    async fn remove_all(&self) -> StoreResult<()>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn create(&self, fields: ItemFields) -> StoreResult<InventoryItem> {
        (**self).create(fields).await
    }

    async fn get(&self, id: ItemId) -> StoreResult<InventoryItem> {
        (**self).get(id).await
    }

    async fn update(&self, id: ItemId, changes: ItemChanges) -> StoreResult<InventoryItem> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        (**self).delete(id).await
    }

    async fn list(&self, filter: &InventoryFilter) -> StoreResult<Vec<InventoryItem>> {
        (**self).list(filter).await
    }

    async fn restock(&self, id: ItemId) -> StoreResult<InventoryItem> {
        (**self).restock(id).await
    }

    async fn remove_all(&self) -> StoreResult<()> {
        (**self).remove_all().await
    }
}
