use std::sync::Arc;

use clap::Parser;
use hoshi_config::Config;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod commands;
pub mod state;

#[cfg(test)]
mod tests;

use self::cli::Cli;
use self::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,hoshi=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::new();
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    tracing::debug!("Using data directory {}", config.storage.data_dir.display());

    let state = Arc::new(AppState::new(config));
    let output = commands::run(&state, cli.command, cli.json).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
