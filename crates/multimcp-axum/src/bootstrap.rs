//! Manager bootstrap: the composition root.
//!
//! The only place where the `SQLite` store, the registry and the backup
//! coordinator are wired together for the HTTP adapter.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use multimcp_core::domain::default_servers;
use multimcp_core::paths::ResolvedPaths;
use multimcp_core::services::{BackupCoordinator, ConfigRegistry};
use multimcp_db::StoreFactory;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3500;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow only these origins.
    AllowOrigins(Vec<String>),
}

/// Runtime configuration for the manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub port: u16,
    pub paths: ResolvedPaths,
    pub cors: CorsConfig,
}

impl ManagerConfig {
    /// Default port and CORS over the given paths.
    pub fn new(paths: ResolvedPaths) -> Self {
        Self {
            port: DEFAULT_PORT,
            paths,
            cors: CorsConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Restrict CORS to specific origins. An empty list keeps allow-all.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        if !origins.is_empty() {
            self.cors = CorsConfig::AllowOrigins(origins);
        }
        self
    }
}

/// Services shared by all handlers.
pub struct AxumContext {
    pub registry: Arc<ConfigRegistry>,
    pub backups: Arc<BackupCoordinator>,
}

impl AxumContext {
    /// Wrap an already initialized registry, keeping snapshots in `backup_dir`.
    pub fn new(registry: Arc<ConfigRegistry>, backup_dir: impl Into<PathBuf>) -> Self {
        let backups = Arc::new(BackupCoordinator::new(Arc::clone(&registry), backup_dir));
        Self { registry, backups }
    }
}

/// Open the database and build the handler context.
pub async fn bootstrap(config: &ManagerConfig) -> Result<AxumContext> {
    let paths = &config.paths;
    info!(
        settings = %paths.settings_path.display(),
        database = %paths.database_path.display(),
        backups = %paths.backup_dir.display(),
        "Resolved manager paths"
    );

    let registry = StoreFactory::open_registry(&paths.database_path, default_servers())
        .await
        .with_context(|| {
            format!(
                "Failed to open server registry at {}",
                paths.database_path.display()
            )
        })?;

    Ok(AxumContext::new(Arc::new(registry), &paths.backup_dir))
}

/// Serve until Ctrl-C, then close the store.
pub async fn start_server(config: ManagerConfig) -> Result<()> {
    let ctx = bootstrap(&config).await?;
    let registry = Arc::clone(&ctx.registry);
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("multimcp manager listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    registry.close().await;
    info!("Server registry closed");
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> ManagerConfig {
        let paths =
            ResolvedPaths::resolve(Some(dir.path().join("settings.json")), None).unwrap();
        ManagerConfig::new(paths)
    }

    #[test]
    fn test_allowed_origins_builder() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir).with_allowed_origins(vec![]);
        assert_eq!(config.cors, CorsConfig::AllowAll);

        let config = config.with_allowed_origins(vec!["http://localhost:5173".into()]);
        assert_eq!(
            config.cors,
            CorsConfig::AllowOrigins(vec!["http://localhost:5173".into()])
        );
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_defaults() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let ctx = bootstrap(&config).await.unwrap();
        let servers = ctx.registry.list().await.unwrap();
        assert_eq!(servers, default_servers());
        assert!(config.paths.database_path.exists());
        assert_eq!(ctx.backups.backup_dir(), dir.path().join("backups"));

        ctx.registry.close().await;
    }
}
