//! Filesystem Storage Backend for Aion
//!
//! Implements the core's store traits using pretty-printed JSON files, one
//! directory per user:
//!
//! ```text
//! <data_dir>/aion/<user>/
//! ├── profile.json          # UserProfile
//! ├── budgets.json          # Vec<BudgetCategory>
//! ├── expenses.json         # Vec<ExpenseRecord>, oldest first
//! └── history/
//!     ├── chatbot.json      # Vec<Turn> per agent
//!     └── ...
//! ```
//!
//! Missing files read as empty state, so a brand-new user needs no setup.

mod budget_store;
mod expense_store;
mod history_store;
mod profile_store;

pub use budget_store::FsBudgetStore;
pub use expense_store::FsExpenseStore;
pub use history_store::FsHistoryStore;
pub use profile_store::FsProfileStore;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read a JSON file, or the type's default if the file does not exist.
pub(crate) async fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read_to_string(path).await {
        Ok(json) => serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Write a value as pretty JSON, creating parent directories as needed.
pub(crate) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("failed to serialize")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}
