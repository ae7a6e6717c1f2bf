use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use stocktrack_core::ItemId;
use stocktrack_inventory::{InventoryFilter, InventoryItem, ItemChanges, ItemFields};

use super::{InventoryStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    items: BTreeMap<ItemId, InventoryItem>,
    last_id: i64,
}

impl State {
    fn product_taken(&self, product_id: i64, except: Option<ItemId>) -> bool {
        self.items
            .values()
            .any(|i| i.product_id == product_id && Some(i.id) != except)
    }
}

/// In-memory inventory store.
///
/// Default backend for dev/tests. Each operation runs under a single lock guard,
/// id allocation included, so creates and deletes never interleave.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("inventory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("inventory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn create(&self, fields: ItemFields) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        if state.product_taken(fields.product_id, None) {
            return Err(StoreError::duplicate_product(fields.product_id));
        }

        state.last_id += 1;
        let item = fields.into_item(ItemId::new(state.last_id));
        state.items.insert(item.id, item.clone());
        tracing::debug!(id = %item.id, product_id = item.product_id, "inventory item stored");
        Ok(item)
    }

    async fn get(&self, id: ItemId) -> StoreResult<InventoryItem> {
        self.read()?
            .items
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: ItemId, changes: ItemChanges) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        if !state.items.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if let Some(product_id) = changes.product_id {
            if state.product_taken(product_id, Some(id)) {
                return Err(StoreError::duplicate_product(product_id));
            }
        }

        let item = state.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.apply_changes(changes);
        Ok(item.clone())
    }

    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        Ok(self.write()?.items.remove(&id).is_some())
    }

    async fn list(&self, filter: &InventoryFilter) -> StoreResult<Vec<InventoryItem>> {
        let state = self.read()?;
        Ok(state
            .items
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect())
    }

    async fn restock(&self, id: ItemId) -> StoreResult<InventoryItem> {
        let mut state = self.write()?;
        let item = state.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        // Work on a copy so an overflow leaves the stored record untouched.
        let mut next = item.clone();
        next.restock()?;
        *item = next.clone();
        Ok(next)
    }

    async fn remove_all(&self) -> StoreResult<()> {
        self.write()?.items.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stocktrack_inventory::Condition;

    use super::*;

    fn fields(product_id: i64, condition: Condition, quantity: u32) -> ItemFields {
        ItemFields::new(product_id, condition, quantity)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryInventoryStore::new();
        let created = store
            .create(fields(12345, Condition::New, 100).with_description("boxed"))
            .await
            .unwrap();

        assert_eq!(created.id, ItemId::new(1));
        assert_eq!(store.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = InMemoryInventoryStore::new();
        let a = store.create(fields(1, Condition::New, 1)).await.unwrap();
        store.delete(a.id).await.unwrap();
        store.remove_all().await.unwrap();
        let b = store.create(fields(1, Condition::New, 1)).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryInventoryStore::new();
        let item = store.create(fields(7, Condition::Used, 3)).await.unwrap();

        assert!(store.delete(item.id).await.unwrap());
        assert_eq!(store.get(item.id).await, Err(StoreError::NotFound(item.id)));
        assert!(!store.delete(item.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let store = InMemoryInventoryStore::new();
        let item = store
            .create(fields(7, Condition::New, 3).with_restock(2, 10).with_description("x"))
            .await
            .unwrap();

        let updated = store
            .update(item.id, ItemChanges::default().quantity(9))
            .await
            .unwrap();

        let fetched = store.get(item.id).await.unwrap();
        assert_eq!(updated, fetched);
        assert_eq!(fetched.quantity, 9);
        assert_eq!(fetched.condition, Condition::New);
        assert_eq!(fetched.restock_level, 2);
        assert_eq!(fetched.restock_amount, 10);
        assert_eq!(fetched.description, "x");
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let store = InMemoryInventoryStore::new();
        let err = store
            .update(ItemId::new(99), ItemChanges::default().quantity(1))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(ItemId::new(99)));
    }

    #[tokio::test]
    async fn duplicate_product_ids_conflict() {
        let store = InMemoryInventoryStore::new();
        let a = store.create(fields(100, Condition::New, 1)).await.unwrap();
        let b = store.create(fields(200, Condition::New, 1)).await.unwrap();

        let err = store.create(fields(100, Condition::Used, 5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m.contains("already exists")));

        let err = store
            .update(b.id, ItemChanges { product_id: Some(100), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Keeping its own product id is fine.
        store
            .update(a.id, ItemChanges { product_id: Some(100), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(store.list(&InventoryFilter::all()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn restock_follows_the_rule() {
        let store = InMemoryInventoryStore::new();
        let item = store
            .create(fields(1, Condition::New, 10).with_restock(5, 20))
            .await
            .unwrap();

        let same = store.restock(item.id).await.unwrap();
        assert_eq!(same.quantity, 10);

        store
            .update(item.id, ItemChanges::default().quantity(5))
            .await
            .unwrap();
        let topped = store.restock(item.id).await.unwrap();
        assert_eq!(topped.quantity, 25);
        assert_eq!(store.get(item.id).await.unwrap().quantity, 25);
    }

    #[tokio::test]
    async fn restock_overflow_keeps_record() {
        let store = InMemoryInventoryStore::new();
        let item = store
            .create(fields(1, Condition::New, u32::MAX).with_restock(u32::MAX, 1))
            .await
            .unwrap();

        let err = store.restock(item.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get(item.id).await.unwrap().quantity, u32::MAX);
    }

    #[tokio::test]
    async fn restock_missing_record_is_not_found() {
        let store = InMemoryInventoryStore::new();
        assert_eq!(
            store.restock(ItemId::new(3)).await,
            Err(StoreError::NotFound(ItemId::new(3)))
        );
    }

    #[tokio::test]
    async fn list_filters_and_orders_by_id() {
        let store = InMemoryInventoryStore::new();
        store.create(fields(22222, Condition::Used, 1)).await.unwrap();
        store.create(fields(11111, Condition::New, 1)).await.unwrap();
        store.create(fields(33333, Condition::New, 1).with_description("spare parts")).await.unwrap();

        let all = store.list(&InventoryFilter::all()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|i| i.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let new_only = store
            .list(&InventoryFilter::all().condition(Condition::New))
            .await
            .unwrap();
        assert_eq!(new_only.len(), 2);
        assert!(new_only.iter().all(|i| i.condition == Condition::New));

        let by_product = store
            .list(&InventoryFilter::all().product_id(11111))
            .await
            .unwrap();
        assert_eq!(by_product.len(), 1);
        assert_eq!(by_product[0].product_id, 11111);

        let by_text = store
            .list(&InventoryFilter::all().description_contains("parts"))
            .await
            .unwrap();
        assert_eq!(by_text.len(), 1);

        let none = store
            .list(&InventoryFilter::all().condition(Condition::OpenBox))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let mut handles = Vec::new();
        for n in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(ItemFields::new(n, Condition::New, 1)).await.unwrap().id
            }));
        }

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert_eq!(store.list(&InventoryFilter::all()).await.unwrap().len(), 50);
    }
}
