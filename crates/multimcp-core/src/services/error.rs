use crate::ports::RepositoryError;
use thiserror::Error;

/// Errors surfaced by [`ConfigRegistry`](super::ConfigRegistry) and
/// [`BackupCoordinator`](super::BackupCoordinator).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No server with this name.
    #[error("Server \"{0}\" not found")]
    NotFound(String),

    /// Name already taken, or the entry is protected.
    #[error("{0}")]
    Conflict(String),

    /// Rejected input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No snapshot with this name in the backup directory.
    #[error("Backup \"{0}\" not found")]
    BackupNotFound(String),

    /// Snapshot name or contents could not be used.
    #[error("Invalid backup \"{name}\": {reason}")]
    InvalidBackup { name: String, reason: String },

    /// Persistence failure, including use after close.
    #[error(transparent)]
    Store(#[from] RepositoryError),

    /// Backup directory I/O failure.
    #[error("Backup I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::BackupNotFound(_))
    }

    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
