//! CLI argument definitions.

pub mod chat;
pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aion", version, about = "Personal finance assistant")]
pub struct Cli {
    /// Path to a config file (defaults to ~/.config/aion/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a sample config file to the default location
    Init,
    /// Show the resolved configuration
    Show,
}
