use anyhow::Result;
use clap::Parser;
use multimcp_protocol::ToolServer;
use multimcp_search::{ERROR_PREFIX, search_tools};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filesystem search tool server speaking line-delimited JSON on stdio.
#[derive(Parser, Debug)]
#[command(name = "search-server", version, about)]
struct Args {
    /// Base directory for relative `directory` arguments (default: working directory)
    #[arg(long, env = "SEARCH_ROOT")]
    root: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("multimcp_search=info".parse()?)
                .add_directive("multimcp_protocol=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let server = ToolServer::new(
        "search-server",
        env!("CARGO_PKG_VERSION"),
        search_tools(root),
        ERROR_PREFIX,
    );
    server.run_stdio().await?;

    Ok(())
}
