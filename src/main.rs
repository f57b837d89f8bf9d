//! copilot-probe CLI binary entry point.

use clap::Parser;
use copilot_probe::cli::errors::format_error_help;
use copilot_probe::cli::{commands, Cli, Commands};
use copilot_probe::config::ClientConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("copilot_probe=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match ClientConfig::resolve() {
        Ok(config) => match cli.command {
            Commands::Chat(args) => commands::handle_chat(args, config).await,
            Commands::Models(args) => commands::handle_models(args, config).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error_help(&e));
        std::process::exit(1);
    }
}
