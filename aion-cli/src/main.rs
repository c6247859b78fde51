//! Aion CLI
//!
//! Binary entry point:
//! - `chat` (default): interactive finance-assistant REPL
//! - `config`: configuration management

mod commands;

use anyhow::Result;
use clap::Parser;

use aion_core::config::AionConfig;

use crate::commands::chat::run_chat_mode;
use crate::commands::config::run_config_command;
use crate::commands::{Cli, Commands};

#[tokio::main]
async fn main() {
    // All logging goes to stderr; stdout carries the conversation.
    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(is_tty)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("aion fatal error: {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        AionConfig::load_from(path)?
    } else {
        AionConfig::load_default()?
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat_mode(config).await,
        Commands::Config { action } => run_config_command(action, config),
    }
}
