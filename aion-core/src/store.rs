//! Storage Traits and Entities
//!
//! Domain records plus the async store traits the tool handlers talk to.
//! A store instance is scoped to one user at construction time, so handlers
//! never pass user identifiers around. `aion-storage-fs` provides the
//! file-backed implementations; tests use in-memory ones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Turn;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The user's financial profile. All amounts are monthly unless noted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub monthly_income: f64,
    pub savings: f64,
    pub investments: f64,
    pub debts: f64,
}

/// One budget category with an allocation and a running spent total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCategory {
    /// Category title, unique per user.
    pub title: String,
    /// Amount allocated for the period.
    pub allocated: f64,
    /// Amount spent so far, accumulated from recorded expenses.
    pub spent: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// One recorded expense. `category` is None for uncategorized spending;
/// deleting a budget leaves its expenses uncategorized rather than deleting
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: uuid::Uuid,
    pub product_name: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Store traits
// ---------------------------------------------------------------------------

/// Profile storage for one user.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The stored profile, or the zeroed default if none was saved yet.
    async fn get(&self) -> anyhow::Result<UserProfile>;
    async fn save(&self, profile: &UserProfile) -> anyhow::Result<()>;
}

/// Budget-category storage for one user, keyed by title.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn get(&self, title: &str) -> anyhow::Result<Option<BudgetCategory>>;
    async fn list(&self) -> anyhow::Result<Vec<BudgetCategory>>;
    /// Insert or overwrite the category with the same title.
    async fn save(&self, category: &BudgetCategory) -> anyhow::Result<()>;
    /// Remove a category. Returns false if no category had that title.
    async fn delete(&self, title: &str) -> anyhow::Result<bool>;
}

/// Expense storage for one user.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn append(&self, expense: &ExpenseRecord) -> anyhow::Result<()>;
    /// Most recent expenses, newest first, at most `limit`.
    async fn list_recent(&self, limit: usize) -> anyhow::Result<Vec<ExpenseRecord>>;
}

/// Per-agent conversation persistence for one user.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Turns previously saved for this agent, oldest first. Empty if none.
    async fn load(&self, agent: &str) -> anyhow::Result<Vec<Turn>>;
    async fn save(&self, agent: &str, turns: &[Turn]) -> anyhow::Result<()>;
}
