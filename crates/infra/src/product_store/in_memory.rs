use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crudapi_core::ProductId;
use crudapi_products::{NewProduct, Product};

use super::r#trait::{ProductStore, StoreError};

#[derive(Debug)]
struct Table {
    next_id: i32,
    // Keyed by id; ids grow with insertion so iteration order is insertion order.
    rows: BTreeMap<ProductId, Product>,
}

impl Table {
    fn allocate(&mut self) -> Result<ProductId, StoreError> {
        let id = ProductId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Backend("product id space exhausted".to_string()))?;
        Ok(id)
    }
}

/// In-memory product table.
///
/// Intended for tests/dev. Ids start at 1, like a Postgres `SERIAL`.
#[derive(Debug)]
pub struct InMemoryProductStore {
    table: RwLock<Table>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn save(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        let id = table.allocate()?;
        let stored = product.with_id(id);
        table.rows.insert(id, stored.clone());
        tracing::debug!(product_id = %id, "product saved");
        Ok(stored)
    }

    async fn save_all(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        let mut table = self.table.write().map_err(|_| poisoned())?;

        // Allocate every id before touching rows so a failure leaves the table unchanged.
        let first = table.next_id;
        let mut stored = Vec::with_capacity(products.len());
        for product in products {
            match table.allocate() {
                Ok(id) => stored.push(product.with_id(id)),
                Err(e) => {
                    table.next_id = first;
                    return Err(e);
                }
            }
        }

        for p in &stored {
            table.rows.insert(p.id, p.clone());
        }
        tracing::debug!(count = stored.len(), "products saved");
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.values().find(|p| p.name == name).cloned())
    }

    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        match table.rows.get_mut(&product.id) {
            Some(row) => {
                *row = product.clone();
                tracing::debug!(product_id = %product.id, "product updated");
                Ok(product)
            }
            None => Err(StoreError::NotFound(product.id)),
        }
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        match table.rows.remove(&id) {
            Some(_) => {
                tracing::debug!(product_id = %id, "product deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;

    fn new_product(name: &str, cents: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: format!("{name} description"),
            price: Decimal::new(cents, 2),
        }
    }

    #[tokio::test]
    async fn save_then_find_by_id_returns_equal_record() {
        let store = InMemoryProductStore::new();
        let saved = store.save(new_product("Pen", 150)).await.unwrap();

        let found = store.find_by_id(saved.id).await.unwrap();
        assert_eq!(found, Some(saved));
    }

    #[tokio::test]
    async fn ids_are_unique_and_start_at_one() {
        let store = InMemoryProductStore::new();
        let a = store.save(new_product("Pen", 150)).await.unwrap();
        let b = store.save(new_product("Ink", 300)).await.unwrap();
        assert_eq!(a.id, ProductId::new(1));
        assert_eq!(b.id, ProductId::new(2));
    }

    #[tokio::test]
    async fn save_all_preserves_input_order() {
        let store = InMemoryProductStore::new();
        let saved = store
            .save_all(vec![new_product("Pen", 150), new_product("Ink", 300)])
            .await
            .unwrap();

        let names: Vec<_> = saved.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pen", "Ink"]);
        assert!(saved[0].id < saved[1].id);
        assert_eq!(store.find_all().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn save_all_with_empty_batch_is_a_no_op() {
        let store = InMemoryProductStore::new();
        assert!(store.save_all(vec![]).await.unwrap().is_empty());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_name_prefers_first_inserted() {
        let store = InMemoryProductStore::new();
        let first = store.save(new_product("Pen", 150)).await.unwrap();
        store.save(new_product("Pen", 999)).await.unwrap();

        let found = store.find_by_name("Pen").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.find_by_name("pen").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_all_fields() {
        let store = InMemoryProductStore::new();
        let saved = store.save(new_product("Pen", 150)).await.unwrap();

        let updated = new_product("Pen v2", 175).with_id(saved.id);
        assert_eq!(store.update(updated.clone()).await.unwrap(), updated);
        assert_eq!(store.find_by_id(saved.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found_and_does_not_insert() {
        let store = InMemoryProductStore::new();
        let err = store
            .update(new_product("Ghost", 100).with_id(ProductId::new(42)))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::NotFound(ProductId::new(42)));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_then_find_is_not_found() {
        let store = InMemoryProductStore::new();
        let saved = store.save(new_product("Pen", 150)).await.unwrap();

        store.delete_by_id(saved.id).await.unwrap();
        assert_eq!(store.find_by_id(saved.id).await.unwrap(), None);
        assert_eq!(
            store.delete_by_id(saved.id).await.unwrap_err(),
            StoreError::NotFound(saved.id)
        );
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = InMemoryProductStore::new();
        let a = store.save(new_product("Pen", 150)).await.unwrap();
        store.delete_by_id(a.id).await.unwrap();
        let b = store.save(new_product("Ink", 300)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn concurrent_saves_get_distinct_ids() {
        let store = Arc::new(InMemoryProductStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.save(new_product(&format!("P{i}"), 100)).await.unwrap().id
            }));
        }

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let store: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::new());
        let saved = store.save(new_product("Pen", 150)).await.unwrap();
        assert_eq!(store.find_all().await.unwrap(), vec![saved]);
    }
}
