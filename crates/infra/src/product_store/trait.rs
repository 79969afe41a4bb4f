use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crudapi_core::ProductId;
use crudapi_products::{NewProduct, Product};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id exists.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The underlying storage failed. Not retried.
    #[error("storage failure: {0}")]
    Backend(String),
}

/// CRUD access to persisted products keyed by integer id.
///
/// Inputs are already validated; a store never re-checks field constraints.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Assign a fresh id and persist.
    async fn save(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Persist every product in order. All-or-nothing: on failure nothing is stored.
    async fn save_all(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError>;

    /// Every stored product. Callers must not rely on the order.
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Exact name match; with duplicates, the first inserted record wins.
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// Overwrite all fields of the record with `product.id`.
    ///
    /// Returns `StoreError::NotFound` when no such record exists; never inserts.
    async fn update(&self, product: Product) -> Result<Product, StoreError>;

    async fn delete_by_id(&self, id: ProductId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn save(&self, product: NewProduct) -> Result<Product, StoreError> {
        (**self).save(product).await
    }

    async fn save_all(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        (**self).save_all(products).await
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        (**self).find_by_name(name).await
    }

    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        (**self).update(product).await
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).delete_by_id(id).await
    }
}
