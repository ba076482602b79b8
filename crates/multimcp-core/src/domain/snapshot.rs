//! Backup snapshot naming and parsing.

use super::ServerConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const SNAPSHOT_PREFIX: &str = "settings-";
pub const SNAPSHOT_SUFFIX: &str = ".json";

/// Settings-file shape: `{ "mcpServers": { name: config } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    pub mcp_servers: BTreeMap<String, ServerConfig>,
}

/// Whether `name` is a bare snapshot file name (`settings-*.json`).
///
/// Names containing path separators or parent references are rejected so a
/// snapshot name can never point outside the backup directory.
pub fn is_snapshot_name(name: &str) -> bool {
    name.starts_with(SNAPSHOT_PREFIX)
        && name.ends_with(SNAPSHOT_SUFFIX)
        && name.len() > SNAPSHOT_PREFIX.len() + SNAPSHOT_SUFFIX.len()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

/// File name for a snapshot taken at `at`.
pub fn snapshot_name(at: DateTime<Utc>) -> String {
    format!(
        "{SNAPSHOT_PREFIX}{}{SNAPSHOT_SUFFIX}",
        at.format("%Y%m%d-%H%M%S")
    )
}

/// Parse snapshot contents.
///
/// Accepts the settings-file shape as well as a bare name to config map.
/// The settings-file shape is only recognized when `mcpServers` is the sole
/// key, so a bare map may hold a server named `mcpServers`.
pub fn parse_snapshot(text: &str) -> Result<BTreeMap<String, ServerConfig>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    let wrapped = match &value {
        Value::Object(map) if map.len() == 1 => map.get("mcpServers").cloned(),
        _ => None,
    };

    match wrapped {
        Some(servers) => serde_json::from_value(servers)
            .or_else(|wrapped_err| serde_json::from_value(value).map_err(|_| wrapped_err)),
        None => serde_json::from_value(value),
    }
}
