// src/main.rs
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use reverse_code_analyzer::{Config, Engine};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    config.apply_env_overrides()?;

    // RUST_LOG wins over the configured level
    let default_level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting reverse-code-analyzer v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = cli.config.as_deref().filter(|path| !path.exists()) {
        warn!("Config file {} not found, using defaults", path.display());
    }

    let engine = Engine::new(&config.analysis)?;

    cli.execute(engine, config).await
}
