//! File-backed expense store.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use aion_core::{ExpenseRecord, ExpenseStore};

use crate::{read_json_or_default, write_json};

/// Stores expenses in `expenses.json`, oldest first.
pub struct FsExpenseStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FsExpenseStore {
    pub fn new(user_dir: &std::path::Path) -> Self {
        Self {
            path: user_dir.join("expenses.json"),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ExpenseStore for FsExpenseStore {
    async fn append(&self, expense: &ExpenseRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut expenses: Vec<ExpenseRecord> = read_json_or_default(&self.path).await?;
        expenses.push(expense.clone());
        write_json(&self.path, &expenses).await?;
        debug!(id = %expense.id, amount = expense.amount, "appended expense");
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ExpenseRecord>> {
        let expenses: Vec<ExpenseRecord> = read_json_or_default(&self.path).await?;
        Ok(expenses.into_iter().rev().take(limit).collect())
    }
}
