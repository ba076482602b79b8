//! HTTP handlers grouped by resource.

pub mod backups;
pub mod servers;

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}
