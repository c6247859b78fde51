//! Advisor Agent
//!
//! Purchase-advice agent. Its single tool gathers the user's financial
//! context (profile, budgets, last few expenses); the model weighs a
//! prospective purchase against it.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::agent::AgentSpec;
use crate::error::OrchestratorError;
use crate::registry::ToolHandler;
use crate::store::{BudgetStore, ExpenseStore, ProfileStore};
use crate::types::{ForcingMode, ToolDeclaration};

use super::Stores;

pub const SYSTEM_INSTRUCTION: &str = "\
You are a financial advisor. When the user asks whether they can afford \
something or how to plan a purchase, call fetch_financial_context first, \
then advise based on their income, savings, debts, budget headroom, and \
recent spending. Be direct: say whether the purchase fits and why.";

const CONTEXT_EXPENSE_LIMIT: usize = 10;

struct FetchContextHandler {
    profile: Arc<dyn ProfileStore>,
    budgets: Arc<dyn BudgetStore>,
    expenses: Arc<dyn ExpenseStore>,
}

#[async_trait]
impl ToolHandler for FetchContextHandler {
    async fn call(&self, _arguments: Value) -> Result<Value> {
        let profile = self.profile.get().await?;
        let budgets = self.budgets.list().await?;
        let expenses = self.expenses.list_recent(CONTEXT_EXPENSE_LIMIT).await?;

        Ok(json!({
            "profile": profile,
            "budgets": budgets,
            "recent_expenses": expenses,
        }))
    }
}

fn fetch_context_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: "fetch_financial_context".to_string(),
        description: "Fetch the user's profile, budgets, and recent expenses".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn spec(stores: &Stores, max_rounds: usize) -> Result<Arc<AgentSpec>, OrchestratorError> {
    AgentSpec::builder("advisor")
        .description("Gives purchase advice grounded in the user's finances")
        .instruction(SYSTEM_INSTRUCTION)
        .forcing_mode(ForcingMode::Optional)
        .max_rounds(max_rounds)
        .tool(
            fetch_context_declaration(),
            Arc::new(FetchContextHandler {
                profile: stores.profile.clone(),
                budgets: stores.budgets.clone(),
                expenses: stores.expenses.clone(),
            }),
        )
        .build()
}
