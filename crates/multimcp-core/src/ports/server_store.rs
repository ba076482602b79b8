//! Server store trait definition.

use super::RepositoryError;
use crate::domain::{ServerConfig, StatusKind};
use async_trait::async_trait;

/// One persisted registry row: config and status live together so they are
/// created and removed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredServer {
    pub name: String,
    pub config: ServerConfig,
    pub status: StatusKind,
    pub last_error: Option<String>,
}

impl StoredServer {
    /// A new row in the `stopped` state.
    pub fn stopped(name: impl Into<String>, config: ServerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            status: StatusKind::Stopped,
            last_error: None,
        }
    }
}

/// Persistence for registry entries.
///
/// Implementations must be thread-safe and must make `replace_all` atomic:
/// either the full new set is visible afterwards or the prior set remains.
#[async_trait]
pub trait ServerStore: Send + Sync {
    /// Number of stored entries.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// All entries ordered by name.
    async fn list(&self) -> Result<Vec<StoredServer>, RepositoryError>;

    /// Fetch one entry, `None` when absent.
    async fn get(&self, name: &str) -> Result<Option<StoredServer>, RepositoryError>;

    /// Insert a new entry.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the name is taken.
    async fn insert(&self, server: &StoredServer) -> Result<(), RepositoryError>;

    /// Overwrite the config of an existing entry, leaving its status alone.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the name is absent.
    async fn update_config(&self, name: &str, config: &ServerConfig) -> Result<(), RepositoryError>;

    /// Record a status for an existing entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the name is absent.
    async fn set_status(
        &self,
        name: &str,
        status: StatusKind,
        last_error: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// Remove an entry with its status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the name is absent.
    async fn delete(&self, name: &str) -> Result<(), RepositoryError>;

    /// Atomically replace every entry with `servers`.
    async fn replace_all(&self, servers: &[StoredServer]) -> Result<(), RepositoryError>;

    /// Release the underlying resources. Later calls fail with `Closed`.
    async fn close(&self);
}
