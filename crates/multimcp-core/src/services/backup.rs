//! Backup coordinator - snapshot files of the whole registry.

use super::{ConfigRegistry, RegistryError};
use crate::domain::{SNAPSHOT_SUFFIX, SettingsDocument, is_snapshot_name, parse_snapshot, snapshot_name};
use crate::ports::{InMemoryServerStore, RepositoryError};
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const MAX_NAME_ATTEMPTS: u32 = 100;

/// Lists, creates and restores `settings-*.json` snapshots in one directory.
pub struct BackupCoordinator {
    registry: Arc<ConfigRegistry>,
    backup_dir: PathBuf,
}

impl BackupCoordinator {
    pub fn new(registry: Arc<ConfigRegistry>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Snapshot file names, sorted. A missing directory is created first.
    pub async fn list(&self) -> Result<Vec<String>, RegistryError> {
        tokio::fs::create_dir_all(&self.backup_dir).await?;

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.backup_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_snapshot_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write the current mapping to a new snapshot and return its file name.
    ///
    /// Existing snapshots are never overwritten; a numeric suffix is added
    /// when two snapshots land in the same second.
    pub async fn create(&self) -> Result<String, RegistryError> {
        let document = SettingsDocument {
            mcp_servers: self.registry.list().await?,
        };
        let body = serde_json::to_string_pretty(&document)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.backup_dir).await?;

        let base = snapshot_name(Utc::now());
        let stem = base.trim_end_matches(SNAPSHOT_SUFFIX);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!("{stem}-{attempt}{SNAPSHOT_SUFFIX}")
            };
            let path = self.backup_dir.join(&name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(body.as_bytes()).await?;
            file.flush().await?;

            info!(backup = %name, servers = document.mcp_servers.len(), "Created backup");
            return Ok(name);
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free snapshot name for {base}"),
        )
        .into())
    }

    /// Replace the registry contents with a snapshot.
    ///
    /// Entries are first re-added through a staging registry held in memory,
    /// so every entry passes the same checks as `add`. Only when the whole
    /// snapshot is accepted is the staged set swapped into the store in one
    /// step. Any failure leaves the current contents untouched. Restored
    /// entries start `stopped`. Returns the number of restored entries.
    pub async fn restore(&self, name: &str) -> Result<usize, RegistryError> {
        if !is_snapshot_name(name) {
            return Err(invalid(name, "not a snapshot file name"));
        }

        let path = self.backup_dir.join(name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RegistryError::BackupNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let entries = parse_snapshot(&text).map_err(|e| invalid(name, e))?;

        let staging =
            ConfigRegistry::initialize(Arc::new(InMemoryServerStore::new()), BTreeMap::new())
                .await?;
        for (server, config) in entries {
            if let Err(e) = staging.add(&server, config).await {
                warn!(backup = %name, server = %server, error = %e, "Rejected snapshot entry");
                return Err(invalid(name, e));
            }
        }
        let staged = staging.list().await?;
        staging.close().await;

        let count = staged.len();
        self.registry.replace_all(staged).await?;

        info!(backup = %name, servers = count, "Restored backup");
        Ok(count)
    }
}

fn invalid(name: &str, reason: impl ToString) -> RegistryError {
    RegistryError::InvalidBackup {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
