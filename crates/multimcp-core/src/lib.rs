#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    ServerConfig, ServerConfigPatch, ServerStatus, SettingsDocument, StatusKind, ToolDescriptor,
    default_servers, is_snapshot_name, parse_snapshot, snapshot_name,
};
pub use paths::{
    PathError, ResolvedPaths, database_path, default_backup_dir, default_settings_path,
};
pub use ports::{InMemoryServerStore, RepositoryError, ServerStore, StoredServer};
pub use services::{BackupCoordinator, ConfigRegistry, RegistryError};
