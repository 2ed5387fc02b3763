use anyhow::Result;
use autoindex::cli::{run, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // AWS_* credentials and RUST_LOG may come from a local .env
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "autoindex starting");

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "autoindex exited with error");
    }
    result
}
