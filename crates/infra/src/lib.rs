//! Infrastructure layer: product persistence backends.

pub mod product_store;

pub use product_store::{InMemoryProductStore, PostgresProductStore, ProductStore, StoreError};
