//! File-backed budget store.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use aion_core::{BudgetCategory, BudgetStore};

use crate::{read_json_or_default, write_json};

/// Stores all budget categories in one `budgets.json` file. A mutex
/// serializes read-modify-write cycles within this process.
pub struct FsBudgetStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FsBudgetStore {
    pub fn new(user_dir: &std::path::Path) -> Self {
        Self {
            path: user_dir.join("budgets.json"),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<BudgetCategory>> {
        read_json_or_default(&self.path).await
    }
}

#[async_trait]
impl BudgetStore for FsBudgetStore {
    async fn get(&self, title: &str) -> Result<Option<BudgetCategory>> {
        Ok(self.read_all().await?.into_iter().find(|c| c.title == title))
    }

    async fn list(&self) -> Result<Vec<BudgetCategory>> {
        self.read_all().await
    }

    async fn save(&self, category: &BudgetCategory) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut categories = self.read_all().await?;
        match categories.iter_mut().find(|c| c.title == category.title) {
            Some(existing) => *existing = category.clone(),
            None => categories.push(category.clone()),
        }
        write_json(&self.path, &categories).await?;
        debug!(title = %category.title, "saved budget category");
        Ok(())
    }

    async fn delete(&self, title: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut categories = self.read_all().await?;
        let before = categories.len();
        categories.retain(|c| c.title != title);
        if categories.len() == before {
            return Ok(false);
        }
        write_json(&self.path, &categories).await?;
        debug!(%title, "deleted budget category");
        Ok(true)
    }
}
