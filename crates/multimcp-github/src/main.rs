use anyhow::{Context, Result};
use clap::Parser;
use multimcp_github::{ERROR_PREFIX, GithubClient, GithubClientConfig, github_tools};
use multimcp_protocol::ToolServer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// GitHub tool server speaking line-delimited JSON on stdio.
#[derive(Parser, Debug)]
#[command(name = "github-server", version, about)]
struct Args {
    /// Personal access token used for every request
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL (for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("multimcp_github=info".parse()?)
                .add_directive("multimcp_protocol=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let token = args
        .token
        .filter(|t| !t.trim().is_empty())
        .context("GITHUB_TOKEN environment variable is required")?;

    let mut config = GithubClientConfig::new().with_token(token);
    if let Some(url) = args.api_url {
        config = config.with_base_url(url);
    }
    let client = GithubClient::from_config(&config).context("failed to build GitHub client")?;

    let server = ToolServer::new(
        "github-server",
        env!("CARGO_PKG_VERSION"),
        github_tools(Arc::new(client)),
        ERROR_PREFIX,
    );
    server.run_stdio().await?;

    Ok(())
}
