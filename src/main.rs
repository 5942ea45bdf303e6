use clap::Parser;
use nightcompare::{Config, ViewerServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nightcompare=info,tower_http=warn")),
        )
        .init();

    let config = Config::parse();
    let server = ViewerServer::new(config)?;
    server.start().await
}
