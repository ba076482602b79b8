//! Core services: the registry and its backup coordinator.
//!
//! Services orchestrate the [`ServerStore`](crate::ports::ServerStore) port and
//! domain validation. They never see a concrete store type.

mod backup;
mod error;
mod registry;

pub use backup::BackupCoordinator;
pub use error::RegistryError;
pub use registry::ConfigRegistry;
