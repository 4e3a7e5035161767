use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("Starting MethodInsight v{}", env!("CARGO_PKG_VERSION"));

    cli.execute()
}
