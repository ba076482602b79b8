//! `SQLite` implementation of the server store.
//!
//! Each registry entry is one row; the config is stored as JSON text so the
//! optional fields round-trip exactly.

use async_trait::async_trait;
use sqlx::SqlitePool;

use multimcp_core::domain::{ServerConfig, StatusKind};
use multimcp_core::ports::{RepositoryError, ServerStore, StoredServer};

/// `SQLite` implementation of [`ServerStore`].
pub struct SqliteServerStore {
    pool: SqlitePool,
}

impl SqliteServerStore {
    /// Create a store over a pool whose schema is already set up.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal row types for database queries
// ─────────────────────────────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ServerRow {
    name: String,
    config: String,
    status: String,
    last_error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper functions
// ─────────────────────────────────────────────────────────────────────────────

fn row_to_server(row: ServerRow) -> Result<StoredServer, RepositoryError> {
    let config: ServerConfig = serde_json::from_str(&row.config).map_err(|e| {
        RepositoryError::Serialization(format!("config of \"{}\": {e}", row.name))
    })?;
    let status: StatusKind = row
        .status
        .parse()
        .map_err(RepositoryError::Serialization)?;

    Ok(StoredServer {
        name: row.name,
        config,
        status,
        last_error: row.last_error,
    })
}

fn encode_config(config: &ServerConfig) -> Result<String, RepositoryError> {
    serde_json::to_string(config).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Map `SQLx` errors to `RepositoryError`.
fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    if matches!(e, sqlx::Error::PoolClosed) {
        return RepositoryError::Closed;
    }
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        return RepositoryError::AlreadyExists(msg);
    }
    RepositoryError::Storage(msg)
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ServerStore for SqliteServerStore {
    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM servers")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn list(&self) -> Result<Vec<StoredServer>, RepositoryError> {
        let rows: Vec<ServerRow> = sqlx::query_as(
            "SELECT name, config, status, last_error FROM servers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(row_to_server).collect()
    }

    async fn get(&self, name: &str) -> Result<Option<StoredServer>, RepositoryError> {
        let row: Option<ServerRow> = sqlx::query_as(
            "SELECT name, config, status, last_error FROM servers WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(row_to_server).transpose()
    }

    async fn insert(&self, server: &StoredServer) -> Result<(), RepositoryError> {
        let config = encode_config(&server.config)?;

        sqlx::query("INSERT INTO servers (name, config, status, last_error) VALUES (?, ?, ?, ?)")
            .bind(&server.name)
            .bind(&config)
            .bind(server.status.as_str())
            .bind(&server.last_error)
            .execute(&self.pool)
            .await
            .map_err(|e| match map_sqlx_error(e) {
                RepositoryError::AlreadyExists(_) => {
                    RepositoryError::AlreadyExists(server.name.clone())
                }
                other => other,
            })?;

        Ok(())
    }

    async fn update_config(&self, name: &str, config: &ServerConfig) -> Result<(), RepositoryError> {
        let config = encode_config(config)?;

        let result = sqlx::query("UPDATE servers SET config = ? WHERE name = ?")
            .bind(&config)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn set_status(
        &self,
        name: &str,
        status: StatusKind,
        last_error: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE servers SET status = ?, last_error = ? WHERE name = ?")
            .bind(status.as_str())
            .bind(last_error)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM servers WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn replace_all(&self, servers: &[StoredServer]) -> Result<(), RepositoryError> {
        // Encode everything up front so a bad entry never opens a transaction
        let encoded = servers
            .iter()
            .map(|s| encode_config(&s.config).map(|config| (s, config)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM servers")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        for (server, config) in encoded {
            sqlx::query(
                "INSERT INTO servers (name, config, status, last_error) VALUES (?, ?, ?, ?)",
            )
            .bind(&server.name)
            .bind(&config)
            .bind(server.status.as_str())
            .bind(&server.last_error)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        // Dropping `tx` on any early return rolls back
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use std::collections::BTreeMap;

    async fn store() -> SqliteServerStore {
        SqliteServerStore::new(setup_test_database().await.unwrap())
    }

    fn sample(name: &str) -> StoredServer {
        let mut env = BTreeMap::new();
        env.insert("TOKEN".to_string(), "abc".to_string());
        StoredServer::stopped(
            name,
            ServerConfig::new("node", vec!["index.js".to_string()])
                .with_env(env)
                .with_auto_approve(vec!["find_files".to_string()]),
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = store().await;
        store.insert(&sample("a")).await.unwrap();

        let fetched = store.get("a").await.unwrap().unwrap();
        assert_eq!(fetched, sample("a"));
        assert!(store.get("b").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_name() {
        let store = store().await;
        store.insert(&sample("a")).await.unwrap();
        let err = store.insert(&sample("a")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(name) if name == "a"));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let store = store().await;
        for name in ["c", "a", "b"] {
            store.insert(&sample(name)).await.unwrap();
        }
        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_update_config_keeps_status() {
        let store = store().await;
        store.insert(&sample("a")).await.unwrap();
        store
            .set_status("a", StatusKind::Error, Some("boom"))
            .await
            .unwrap();

        let config = ServerConfig::new("python", vec![]);
        store.update_config("a", &config).await.unwrap();

        let fetched = store.get("a").await.unwrap().unwrap();
        assert_eq!(fetched.config, config);
        assert_eq!(fetched.status, StatusKind::Error);
        assert_eq!(fetched.last_error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = store().await;
        let config = ServerConfig::new("x", vec![]);
        assert!(matches!(
            store.update_config("nope", &config).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            store.set_status("nope", StatusKind::Running, None).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("nope").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_all_swaps_rows() {
        let store = store().await;
        store.insert(&sample("old")).await.unwrap();

        store
            .replace_all(&[sample("x"), sample("y")])
            .await
            .unwrap();

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_replace_all_rolls_back_on_failure() {
        let store = store().await;
        store.insert(&sample("keep")).await.unwrap();

        // Duplicate names violate the primary key mid-transaction
        let err = store
            .replace_all(&[sample("dup"), sample("dup")])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(_)));

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["keep"]);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_closed() {
        let store = store().await;
        store.close().await;
        assert!(matches!(store.count().await, Err(RepositoryError::Closed)));
    }
}
