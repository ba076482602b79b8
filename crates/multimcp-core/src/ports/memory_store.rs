//! In-memory store used for restore staging and tests.

use super::{RepositoryError, ServerStore, StoredServer};
use crate::domain::{ServerConfig, StatusKind};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryServerStore {
    rows: RwLock<BTreeMap<String, StoredServer>>,
    closed: AtomicBool,
}

impl InMemoryServerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), RepositoryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RepositoryError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl ServerStore for InMemoryServerStore {
    async fn count(&self) -> Result<u64, RepositoryError> {
        self.ensure_open()?;
        Ok(self.rows.read().await.len() as u64)
    }

    async fn list(&self) -> Result<Vec<StoredServer>, RepositoryError> {
        self.ensure_open()?;
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn get(&self, name: &str) -> Result<Option<StoredServer>, RepositoryError> {
        self.ensure_open()?;
        Ok(self.rows.read().await.get(name).cloned())
    }

    async fn insert(&self, server: &StoredServer) -> Result<(), RepositoryError> {
        self.ensure_open()?;
        let mut rows = self.rows.write().await;
        if rows.contains_key(&server.name) {
            return Err(RepositoryError::AlreadyExists(server.name.clone()));
        }
        rows.insert(server.name.clone(), server.clone());
        Ok(())
    }

    async fn update_config(&self, name: &str, config: &ServerConfig) -> Result<(), RepositoryError> {
        self.ensure_open()?;
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        row.config = config.clone();
        Ok(())
    }

    async fn set_status(
        &self,
        name: &str,
        status: StatusKind,
        last_error: Option<&str>,
    ) -> Result<(), RepositoryError> {
        self.ensure_open()?;
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(name)
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))?;
        row.status = status;
        row.last_error = last_error.map(str::to_string);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        self.ensure_open()?;
        self.rows
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(name.to_string()))
    }

    async fn replace_all(&self, servers: &[StoredServer]) -> Result<(), RepositoryError> {
        self.ensure_open()?;
        let next = servers
            .iter()
            .map(|s| (s.name.clone(), s.clone()))
            .collect();
        *self.rows.write().await = next;
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> StoredServer {
        StoredServer::stopped(name, ServerConfig::new("cmd", vec![]))
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected() {
        let store = InMemoryServerStore::new();
        store.insert(&row("a")).await.unwrap();
        let err = store.insert(&row("a")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_missing_rows_report_not_found() {
        let store = InMemoryServerStore::new();
        assert!(matches!(
            store.delete("nope").await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            store.set_status("nope", StatusKind::Running, None).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_all_swaps_contents() {
        let store = InMemoryServerStore::new();
        store.insert(&row("old")).await.unwrap();
        store.replace_all(&[row("new1"), row("new2")]).await.unwrap();

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["new1", "new2"]);
    }

    #[tokio::test]
    async fn test_closed_store_fails() {
        let store = InMemoryServerStore::new();
        store.close().await;
        assert!(matches!(store.count().await, Err(RepositoryError::Closed)));
    }
}
