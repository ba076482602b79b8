//! Composition utilities for building the registry with a `SQLite` store.
//!
//! Construction only; no domain logic lives here.

use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use multimcp_core::domain::ServerConfig;
use multimcp_core::ports::ServerStore;
use multimcp_core::services::ConfigRegistry;

use crate::SqliteServerStore;
use crate::setup::setup_database;

/// Factory for `SQLite`-backed registry components.
pub struct StoreFactory;

impl StoreFactory {
    /// Wrap a pool in a trait-object store.
    pub fn build_store(pool: SqlitePool) -> Arc<dyn ServerStore> {
        Arc::new(SqliteServerStore::new(pool))
    }

    /// Open the database at `db_path` and initialize a registry over it,
    /// seeding `seed` when the database is empty.
    pub async fn open_registry(
        db_path: &Path,
        seed: BTreeMap<String, ServerConfig>,
    ) -> anyhow::Result<ConfigRegistry> {
        let pool = setup_database(db_path).await?;
        let registry = ConfigRegistry::initialize(Self::build_store(pool), seed).await?;
        Ok(registry)
    }

    /// Registry over a fresh in-memory database.
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn open_test_registry(
        seed: BTreeMap<String, ServerConfig>,
    ) -> anyhow::Result<ConfigRegistry> {
        let pool = crate::setup::setup_test_database().await?;
        let registry = ConfigRegistry::initialize(Self::build_store(pool), seed).await?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multimcp_core::domain::default_servers;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_registry_seeds_once() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("mcp.db");

        let registry = StoreFactory::open_registry(&db_path, default_servers())
            .await
            .unwrap();
        registry
            .add("demo", ServerConfig::new("x", vec![]))
            .await
            .unwrap();
        registry.delete("demo").await.unwrap();
        registry.delete("git-server").await.unwrap_err();
        registry.close().await;

        // Reopening a non-empty database leaves it as it was
        let registry = StoreFactory::open_registry(&db_path, default_servers())
            .await
            .unwrap();
        assert_eq!(registry.list().await.unwrap(), default_servers());
        registry.close().await;
    }
}
