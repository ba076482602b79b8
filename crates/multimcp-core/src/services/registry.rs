//! Config registry - the authoritative name to config mapping.

use super::RegistryError;
use crate::domain::{ServerConfig, ServerConfigPatch, ServerStatus, StatusKind};
use crate::ports::{RepositoryError, ServerStore, StoredServer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Registry of tool-server configurations and their observed status.
///
/// Every operation takes the operation lock for its whole duration and reads
/// the current record from the store after acquiring it, so interleaved
/// callers never act on stale state.
pub struct ConfigRegistry {
    store: Arc<dyn ServerStore>,
    protected: BTreeSet<String>,
    op_lock: Mutex<()>,
    closed: AtomicBool,
}

impl ConfigRegistry {
    /// Open a registry over `store`.
    ///
    /// When the store is empty, every `seed` entry is inserted at `stopped`.
    /// Seed names are protected from deletion whether or not seeding ran.
    pub async fn initialize(
        store: Arc<dyn ServerStore>,
        seed: BTreeMap<String, ServerConfig>,
    ) -> Result<Self, RegistryError> {
        if !seed.is_empty() && store.count().await? == 0 {
            let rows: Vec<StoredServer> = seed
                .iter()
                .map(|(name, config)| StoredServer::stopped(name.clone(), config.clone()))
                .collect();
            store.replace_all(&rows).await?;
            info!(count = rows.len(), "Seeded default servers");
        }

        Ok(Self {
            store,
            protected: seed.into_keys().collect(),
            op_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), RegistryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RegistryError::Store(RepositoryError::Closed));
        }
        Ok(())
    }

    /// Whether `name` is a protected default entry.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.contains(name)
    }

    /// All configs keyed by name.
    pub async fn list(&self) -> Result<BTreeMap<String, ServerConfig>, RegistryError> {
        self.ensure_open()?;
        let _guard = self.op_lock.lock().await;
        let rows = self.store.list().await?;
        Ok(rows.into_iter().map(|row| (row.name, row.config)).collect())
    }

    pub async fn get(&self, name: &str) -> Result<ServerConfig, RegistryError> {
        self.ensure_open()?;
        let _guard = self.op_lock.lock().await;
        self.store
            .get(name)
            .await?
            .map(|row| row.config)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Register a new server. It starts `stopped`.
    pub async fn add(&self, name: &str, config: ServerConfig) -> Result<(), RegistryError> {
        self.ensure_open()?;
        validate_name(name)?;
        config.validate().map_err(RegistryError::Validation)?;

        let _guard = self.op_lock.lock().await;
        if self.store.get(name).await?.is_some() {
            return Err(already_exists(name));
        }
        self.store
            .insert(&StoredServer::stopped(name, config))
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists(_) => already_exists(name),
                other => other.into(),
            })?;

        info!(server = %name, "Added server");
        Ok(())
    }

    /// Shallow-merge `patch` into the current config and return the result.
    pub async fn update(
        &self,
        name: &str,
        patch: ServerConfigPatch,
    ) -> Result<ServerConfig, RegistryError> {
        self.ensure_open()?;
        let _guard = self.op_lock.lock().await;

        let current = self
            .store
            .get(name)
            .await?
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let merged = current.config.merged(patch);
        merged.validate().map_err(RegistryError::Validation)?;

        self.store
            .update_config(name, &merged)
            .await
            .map_err(|e| not_found_or(name, e))?;

        debug!(server = %name, "Updated server config");
        Ok(merged)
    }

    /// Remove a server with its status. Protected defaults cannot be removed.
    pub async fn delete(&self, name: &str) -> Result<(), RegistryError> {
        self.ensure_open()?;
        if self.is_protected(name) {
            return Err(RegistryError::Conflict(format!(
                "Cannot delete default server \"{name}\""
            )));
        }

        let _guard = self.op_lock.lock().await;
        self.store
            .delete(name)
            .await
            .map_err(|e| not_found_or(name, e))?;

        info!(server = %name, "Deleted server");
        Ok(())
    }

    /// Record an observed status. Any previous error text is replaced.
    pub async fn set_status(
        &self,
        name: &str,
        status: StatusKind,
        last_error: Option<String>,
    ) -> Result<(), RegistryError> {
        self.ensure_open()?;
        let _guard = self.op_lock.lock().await;
        self.store
            .set_status(name, status, last_error.as_deref())
            .await
            .map_err(|e| not_found_or(name, e))?;

        debug!(server = %name, %status, "Status recorded");
        Ok(())
    }

    /// Status of `name`. An unknown name reads as `error` with no tools.
    pub async fn get_status(&self, name: &str) -> Result<ServerStatus, RegistryError> {
        self.ensure_open()?;
        let _guard = self.op_lock.lock().await;
        let status = match self.store.get(name).await? {
            Some(row) => ServerStatus {
                name: row.name,
                status: row.status,
                last_error: row.last_error,
                tools: Some(Vec::new()),
            },
            None => ServerStatus::missing(name),
        };
        Ok(status)
    }

    pub async fn enable(&self, name: &str) -> Result<(), RegistryError> {
        self.set_status(name, StatusKind::Running, None).await
    }

    pub async fn disable(&self, name: &str) -> Result<(), RegistryError> {
        self.set_status(name, StatusKind::Stopped, None).await
    }

    /// Swap in a complete new set of entries, all at `stopped`.
    pub(crate) async fn replace_all(
        &self,
        servers: BTreeMap<String, ServerConfig>,
    ) -> Result<(), RegistryError> {
        self.ensure_open()?;
        let rows: Vec<StoredServer> = servers
            .into_iter()
            .map(|(name, config)| StoredServer::stopped(name, config))
            .collect();

        let _guard = self.op_lock.lock().await;
        self.store.replace_all(&rows).await?;
        Ok(())
    }

    /// Close the registry and its store. Later operations fail with a store error.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _guard = self.op_lock.lock().await;
        self.store.close().await;
        debug!("Registry closed");
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        return Err(RegistryError::Validation(
            "server name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn already_exists(name: &str) -> RegistryError {
    RegistryError::Conflict(format!("Server \"{name}\" already exists"))
}

fn not_found_or(name: &str, err: RepositoryError) -> RegistryError {
    match err {
        RepositoryError::NotFound(_) => RegistryError::NotFound(name.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_servers;
    use crate::ports::InMemoryServerStore;

    async fn empty_registry() -> ConfigRegistry {
        ConfigRegistry::initialize(Arc::new(InMemoryServerStore::new()), BTreeMap::new())
            .await
            .unwrap()
    }

    fn demo_config() -> ServerConfig {
        ServerConfig::new("x", vec![])
    }

    #[tokio::test]
    async fn test_seeds_empty_store() {
        let registry =
            ConfigRegistry::initialize(Arc::new(InMemoryServerStore::new()), default_servers())
                .await
                .unwrap();

        let servers = registry.list().await.unwrap();
        assert_eq!(servers, default_servers());
        let status = registry.get_status("search-server").await.unwrap();
        assert_eq!(status.status, StatusKind::Stopped);
    }

    #[tokio::test]
    async fn test_does_not_reseed_non_empty_store() {
        let store = Arc::new(InMemoryServerStore::new());
        store
            .insert(&StoredServer::stopped("mine", demo_config()))
            .await
            .unwrap();

        let registry = ConfigRegistry::initialize(store, default_servers())
            .await
            .unwrap();

        let names: Vec<_> = registry.list().await.unwrap().into_keys().collect();
        assert_eq!(names, vec!["mine"]);
        assert!(registry.is_protected("search-server"));
    }

    #[tokio::test]
    async fn test_demo_lifecycle() {
        let registry = empty_registry().await;

        registry.add("demo", demo_config()).await.unwrap();
        assert_eq!(registry.get("demo").await.unwrap(), demo_config());
        assert_eq!(
            registry.get_status("demo").await.unwrap().status,
            StatusKind::Stopped
        );

        registry.enable("demo").await.unwrap();
        assert_eq!(
            registry.get_status("demo").await.unwrap().status,
            StatusKind::Running
        );

        registry.delete("demo").await.unwrap();
        assert!(matches!(
            registry.get("demo").await,
            Err(RegistryError::NotFound(_))
        ));
        assert_eq!(
            registry.get_status("demo").await.unwrap(),
            ServerStatus::missing("demo")
        );
    }

    #[tokio::test]
    async fn test_add_duplicate_conflicts() {
        let registry = empty_registry().await;
        registry.add("demo", demo_config()).await.unwrap();
        let err = registry.add("demo", demo_config()).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_add_validates() {
        let registry = empty_registry().await;
        assert!(matches!(
            registry.add("", demo_config()).await,
            Err(RegistryError::Validation(_))
        ));
        assert!(matches!(
            registry.add("demo", ServerConfig::new("", vec![])).await,
            Err(RegistryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_merges_shallowly() {
        let registry = empty_registry().await;
        let config = ServerConfig::new("x", vec!["a".to_string()])
            .with_auto_approve(vec!["t".to_string()]);
        registry.add("demo", config).await.unwrap();

        let patch = ServerConfigPatch {
            disabled: Some(true),
            ..Default::default()
        };
        let updated = registry.update("demo", patch).await.unwrap();

        assert!(updated.is_disabled());
        assert_eq!(updated.args, vec!["a".to_string()]);
        assert_eq!(updated.auto_approve, Some(vec!["t".to_string()]));
        assert_eq!(registry.get("demo").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let registry = empty_registry().await;
        let err = registry
            .update("ghost", ServerConfigPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_preserves_status() {
        let registry = empty_registry().await;
        registry.add("demo", demo_config()).await.unwrap();
        registry.enable("demo").await.unwrap();

        let patch = ServerConfigPatch {
            command: Some("y".to_string()),
            ..Default::default()
        };
        registry.update("demo", patch).await.unwrap();

        assert_eq!(
            registry.get_status("demo").await.unwrap().status,
            StatusKind::Running
        );
    }

    #[tokio::test]
    async fn test_default_entries_cannot_be_deleted() {
        let registry =
            ConfigRegistry::initialize(Arc::new(InMemoryServerStore::new()), default_servers())
                .await
                .unwrap();

        let err = registry.delete("search-server").await.unwrap_err();
        assert!(err.is_conflict());
        assert!(registry.get("search-server").await.is_ok());

        let patch = ServerConfigPatch {
            disabled: Some(true),
            ..Default::default()
        };
        assert!(registry.update("search-server", patch).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_and_status_unknown_name() {
        let registry = empty_registry().await;
        assert!(matches!(
            registry.delete("ghost").await,
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.enable("ghost").await,
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_error_status_keeps_message() {
        let registry = empty_registry().await;
        registry.add("demo", demo_config()).await.unwrap();
        registry
            .set_status("demo", StatusKind::Error, Some("spawn failed".to_string()))
            .await
            .unwrap();

        let status = registry.get_status("demo").await.unwrap();
        assert_eq!(status.status, StatusKind::Error);
        assert_eq!(status.last_error.as_deref(), Some("spawn failed"));

        registry.disable("demo").await.unwrap();
        assert_eq!(registry.get_status("demo").await.unwrap().last_error, None);
    }

    #[tokio::test]
    async fn test_operations_fail_after_close() {
        let registry = empty_registry().await;
        registry.close().await;
        registry.close().await;

        assert!(matches!(
            registry.list().await,
            Err(RegistryError::Store(RepositoryError::Closed))
        ));
        assert!(matches!(
            registry.add("demo", demo_config()).await,
            Err(RegistryError::Store(_))
        ));
    }
}
