//! Domain types for the server registry.
//!
//! These types are pure data: they carry no persistence or transport logic and
//! serialize to the camelCase JSON shape used by settings files, snapshots and
//! the HTTP surface.

mod defaults;
mod server;
mod snapshot;
mod tool;

pub use defaults::default_servers;
pub use server::{ServerConfig, ServerConfigPatch, ServerStatus, StatusKind};
pub use snapshot::{
    SNAPSHOT_PREFIX, SNAPSHOT_SUFFIX, SettingsDocument, is_snapshot_name, parse_snapshot,
    snapshot_name,
};
pub use tool::ToolDescriptor;
