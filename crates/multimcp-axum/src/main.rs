use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use multimcp_axum::{ManagerConfig, start_server};
use multimcp_core::paths::ResolvedPaths;
use tracing_subscriber::EnvFilter;

/// HTTP manager for the tool-server registry.
#[derive(Parser, Debug)]
#[command(name = "multimcp-manager", version, about)]
struct Args {
    /// Settings file; the database and default backup directory sit next to it
    #[arg(long, env = "SETTINGS_PATH")]
    settings_path: Option<PathBuf>,

    /// Directory holding settings snapshots
    #[arg(long, env = "BACKUP_DIR")]
    backup_dir: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = multimcp_axum::bootstrap::DEFAULT_PORT)]
    port: u16,

    /// Allowed CORS origin (repeatable, comma-separated in the env var)
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("multimcp_axum=info".parse()?)
                .add_directive("multimcp_core=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let paths = ResolvedPaths::resolve(args.settings_path, args.backup_dir)?;
    let config = ManagerConfig::new(paths)
        .with_port(args.port)
        .with_allowed_origins(args.allowed_origins);

    start_server(config).await
}
