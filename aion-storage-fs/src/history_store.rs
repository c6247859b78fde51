//! File-backed conversation history store.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use aion_core::{HistoryStore, Turn};

use crate::{read_json_or_default, write_json};

/// Stores one JSON file of turns per agent under `history/`.
pub struct FsHistoryStore {
    dir: PathBuf,
}

impl FsHistoryStore {
    pub fn new(user_dir: &std::path::Path) -> Self {
        Self {
            dir: user_dir.join("history"),
        }
    }

    fn agent_path(&self, agent: &str) -> PathBuf {
        self.dir.join(format!("{agent}.json"))
    }
}

#[async_trait]
impl HistoryStore for FsHistoryStore {
    async fn load(&self, agent: &str) -> Result<Vec<Turn>> {
        read_json_or_default(&self.agent_path(agent)).await
    }

    async fn save(&self, agent: &str, turns: &[Turn]) -> Result<()> {
        write_json(&self.agent_path(agent), &turns).await?;
        debug!(agent, turn_count = turns.len(), "saved history");
        Ok(())
    }
}
