//! Product persistence boundary.
//!
//! `ProductStore` is the only thing the HTTP layer talks to. Two backends:
//! an in-memory map for tests/dev and a Postgres table for real deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use r#trait::{ProductStore, StoreError};
