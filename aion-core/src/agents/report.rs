//! Report Agent
//!
//! Reads budgets and recent expenses and hands the model the raw numbers;
//! the model writes the report text.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::agent::AgentSpec;
use crate::error::OrchestratorError;
use crate::registry::ToolHandler;
use crate::store::{BudgetStore, ExpenseStore};
use crate::types::{ForcingMode, ToolDeclaration};

use super::Stores;

pub const SYSTEM_INSTRUCTION: &str = "\
You are a financial reporting agent. Call summarize_finances to get the \
user's budget categories and recent expenses, then write a short plain-text \
report: spending per category, remaining allocation, and anything over \
budget. Keep it factual and concise.";

const RECENT_EXPENSE_LIMIT: usize = 20;

struct SummarizeHandler {
    budgets: Arc<dyn BudgetStore>,
    expenses: Arc<dyn ExpenseStore>,
}

#[async_trait]
impl ToolHandler for SummarizeHandler {
    async fn call(&self, _arguments: Value) -> Result<Value> {
        let budgets = self.budgets.list().await?;
        let expenses = self.expenses.list_recent(RECENT_EXPENSE_LIMIT).await?;

        let categories: Vec<Value> = budgets
            .iter()
            .map(|b| {
                json!({
                    "title": b.title,
                    "allocated": b.allocated,
                    "spent": b.spent,
                    "remaining": b.allocated - b.spent,
                })
            })
            .collect();
        let total_spent: f64 = budgets.iter().map(|b| b.spent).sum();

        Ok(json!({
            "categories": categories,
            "total_spent": total_spent,
            "recent_expenses": expenses,
        }))
    }
}

fn summarize_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: "summarize_finances".to_string(),
        description: "Fetch budget totals, remaining allocations, and recent expenses".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn spec(stores: &Stores, max_rounds: usize) -> Result<Arc<AgentSpec>, OrchestratorError> {
    AgentSpec::builder("report_agent")
        .description("Summarizes spending against budgets")
        .instruction(SYSTEM_INSTRUCTION)
        .forcing_mode(ForcingMode::Optional)
        .max_rounds(max_rounds)
        .tool(
            summarize_declaration(),
            Arc::new(SummarizeHandler {
                budgets: stores.budgets.clone(),
                expenses: stores.expenses.clone(),
            }),
        )
        .build()
}
