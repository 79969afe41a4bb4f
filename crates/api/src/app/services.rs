use std::sync::Arc;

use crudapi_infra::{InMemoryProductStore, PostgresProductStore, StoreError};

use crate::app::SharedStore;
use crate::config::AppConfig;

/// Pick the store backend: Postgres when `DATABASE_URL` is set, in-memory otherwise.
pub async fn build_store(config: &AppConfig) -> Result<SharedStore, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = PostgresProductStore::connect(url, config.max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!(max_connections = config.max_connections, "using postgres product store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; products are kept in memory and lost on restart");
            Ok(Arc::new(InMemoryProductStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use crudapi_infra::ProductStore;

    use super::*;

    #[tokio::test]
    async fn without_database_url_uses_memory() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let store = build_store(&config).await.unwrap();
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
