//! File-backed profile store.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use aion_core::{ProfileStore, UserProfile};

use crate::{read_json_or_default, write_json};

/// Stores the profile as `profile.json` in the user's directory.
pub struct FsProfileStore {
    path: PathBuf,
}

impl FsProfileStore {
    pub fn new(user_dir: &std::path::Path) -> Self {
        Self {
            path: user_dir.join("profile.json"),
        }
    }
}

#[async_trait]
impl ProfileStore for FsProfileStore {
    async fn get(&self) -> Result<UserProfile> {
        read_json_or_default(&self.path).await
    }

    async fn save(&self, profile: &UserProfile) -> Result<()> {
        write_json(&self.path, profile).await?;
        debug!(path = %self.path.display(), "saved profile");
        Ok(())
    }
}
