//! Postgres-backed product store.
//!
//! One table, `product_tbl`, with a `SERIAL` primary key. Ids are assigned by
//! the database, so uniqueness under concurrent inserts is the database's job.
//!
//! ## Error Mapping
//!
//! Every `sqlx::Error` becomes `StoreError::Backend`. Not-found is detected
//! from empty result sets / zero affected rows, never from an error.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use crudapi_core::ProductId;
use crudapi_products::{NewProduct, Product};

use super::r#trait::{ProductStore, StoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS product_tbl (
    id          SERIAL PRIMARY KEY,
    name        VARCHAR(100) NOT NULL,
    description VARCHAR(500) NOT NULL,
    price       NUMERIC(38, 2) NOT NULL
)
"#;

const INSERT: &str = r#"
INSERT INTO product_tbl (name, description, price)
VALUES ($1, $2, $3)
RETURNING id, name, description, price
"#;

/// Postgres-backed product store.
///
/// `Clone` is cheap: `PgPool` is reference counted internally.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` with a pool of at most `max_connections`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create `product_tbl` if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, product), err)]
    async fn save(&self, product: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query(INSERT)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("save", e))?;
        product_from_row(&row)
    }

    #[instrument(skip(self, products), fields(count = products.len()), err)]
    async fn save_all(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("save_all", e))?;

        let mut stored = Vec::with_capacity(products.len());
        for product in &products {
            let row = sqlx::query(INSERT)
                .bind(&product.name)
                .bind(&product.description)
                .bind(product.price)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("save_all", e))?;
            stored.push(product_from_row(&row)?);
        }

        // Dropping `tx` on an early return rolls the whole batch back.
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("save_all", e))?;
        Ok(stored)
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, name, description, price FROM product_tbl ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, description, price FROM product_tbl WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, price
            FROM product_tbl
            WHERE name = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_name", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE product_tbl
            SET name = $2, description = $3, price = $4
            WHERE id = $1
            RETURNING id, name, description, price
            "#,
        )
        .bind(product.id.get())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        match row {
            Some(row) => product_from_row(&row),
            None => Err(StoreError::NotFound(product.id)),
        }
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_by_id(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM product_tbl WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Backend(format!("failed to decode product row: {e}"));
    Ok(Product {
        id: ProductId::new(row.try_get::<i32, _>("id").map_err(decode)?),
        name: row.try_get::<String, _>("name").map_err(decode)?,
        description: row.try_get::<String, _>("description").map_err(decode)?,
        price: row.try_get::<Decimal, _>("price").map_err(decode)?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Backend(format!("connection pool timed out in {operation}"))
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

/// Runs only when `DATABASE_URL` points at a scratch Postgres database.
#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Option<PostgresProductStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let store = PostgresProductStore::connect(&url, 2).await.ok()?;
        store.ensure_schema().await.ok()?;
        Some(store)
    }

    fn new_product(name: &str, cents: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "postgres contract test".to_string(),
            price: Decimal::new(cents, 2),
        }
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let Some(store) = store().await else {
            return;
        };

        let saved = store.save(new_product("pg-round-trip", 150)).await.unwrap();
        assert_eq!(store.find_by_id(saved.id).await.unwrap(), Some(saved.clone()));

        let updated = new_product("pg-round-trip v2", 175).with_id(saved.id);
        assert_eq!(store.update(updated.clone()).await.unwrap(), updated);

        store.delete_by_id(saved.id).await.unwrap();
        assert_eq!(store.find_by_id(saved.id).await.unwrap(), None);
        assert_eq!(
            store.delete_by_id(saved.id).await.unwrap_err(),
            StoreError::NotFound(saved.id)
        );
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let Some(store) = store().await else {
            return;
        };

        let err = store
            .update(new_product("pg-missing", 100).with_id(ProductId::new(i32::MAX)))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(ProductId::new(i32::MAX)));
    }

    #[tokio::test]
    async fn large_prices_fit_the_column() {
        let Some(store) = store().await else {
            return;
        };

        let mut big = new_product("pg-big-price", 0);
        big.price = Decimal::new(1_000_000_000_000_000_000, 0);
        let saved = store.save(big.clone()).await.unwrap();
        assert_eq!(saved.price, big.price);

        store.delete_by_id(saved.id).await.unwrap();
    }

    #[tokio::test]
    async fn save_all_is_ordered() {
        let Some(store) = store().await else {
            return;
        };

        let saved = store
            .save_all(vec![new_product("pg-batch-a", 100), new_product("pg-batch-b", 200)])
            .await
            .unwrap();
        assert_eq!(saved[0].name, "pg-batch-a");
        assert_eq!(saved[1].name, "pg-batch-b");
        assert!(saved[0].id < saved[1].id);

        for p in saved {
            store.delete_by_id(p.id).await.unwrap();
        }
    }
}
