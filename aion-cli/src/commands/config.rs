//! `config` subcommands.

use anyhow::{bail, Context, Result};

use aion_core::config::{sample_config, AionConfig};

use super::ConfigAction;

pub fn run_config_command(action: ConfigAction, config: AionConfig) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = AionConfig::default_path()?;
            if path.exists() {
                bail!("config file already exists at {}", path.display());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, sample_config())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote sample config to {}", path.display());
            eprintln!("Set your API key there or via the GEMINI_API_KEY environment variable.");
            Ok(())
        }
        ConfigAction::Show => {
            eprintln!("model:      {}", config.gemini.model);
            eprintln!(
                "api key:    {}",
                if config.resolve_api_key().is_some() {
                    "set"
                } else {
                    "missing"
                }
            );
            eprintln!("max rounds: {}", config.agent.max_rounds);
            eprintln!("user:       {}", config.storage.user);
            eprintln!("data dir:   {}", config.user_data_dir()?.display());
            Ok(())
        }
    }
}
