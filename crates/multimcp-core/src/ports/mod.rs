//! Port definitions (trait abstractions) for external systems.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - Stores deal in domain types and fail with [`RepositoryError`]

mod memory_store;
mod server_store;

use thiserror::Error;

pub use memory_store::InMemoryServerStore;
pub use server_store::{ServerStore, StoredServer};

/// Domain-specific errors for store operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The store has been closed.
    #[error("Store is closed")]
    Closed,
}
