//! Expense Manager Agent
//!
//! Forced-call agent: its entire purpose is the `record_expense` side
//! effect, so it runs with [`ForcingMode::Required`]. Recording an expense
//! also bumps the matching budget category's spent total and runs the
//! overspend check; an alert rides back inside the tool result.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::agent::AgentSpec;
use crate::error::OrchestratorError;
use crate::overspend::check_overspend;
use crate::registry::ToolHandler;
use crate::store::{BudgetStore, ExpenseRecord, ExpenseStore};
use crate::types::{ForcingMode, ToolDeclaration};

use super::Stores;

pub const SYSTEM_INSTRUCTION: &str = "\
You are an expense manager for a personal finance assistant. Record every \
expense the user describes by calling record_expense with the amount, the \
product or service name, and the budget category it belongs to. If the \
message names no category, pick the closest match from everyday categories \
(Food, Transport, Housing, Entertainment) or omit it. After the call, \
confirm the recorded expense in one short sentence and mention any \
overspending alert the tool reports.";

struct RecordExpenseHandler {
    budgets: Arc<dyn BudgetStore>,
    expenses: Arc<dyn ExpenseStore>,
}

#[async_trait]
impl ToolHandler for RecordExpenseHandler {
    async fn call(&self, arguments: Value) -> Result<Value> {
        let amount = arguments
            .get("amount")
            .and_then(Value::as_f64)
            .context("missing expense amount")?;
        let product_name = arguments
            .get("product_name")
            .and_then(Value::as_str)
            .context("missing product name")?
            .to_string();
        let category = arguments
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string);
        let description = arguments
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        // A category with no matching budget leaves the expense
        // uncategorized; the record is kept either way.
        let matched = match &category {
            Some(title) => self.budgets.get(title).await?,
            None => None,
        };

        // The expense is persisted before the budget is touched: a failed
        // append must not leave an inflated spent total behind, which a
        // forced retry would then double-count.
        let expense = ExpenseRecord {
            id: uuid::Uuid::new_v4(),
            product_name,
            amount,
            category: matched.as_ref().map(|b| b.title.clone()),
            description,
            recorded_at: Utc::now(),
        };
        self.expenses.append(&expense).await?;

        let mut alert = None;
        if let Some(mut budget) = matched {
            budget.spent += amount;
            self.budgets.save(&budget).await?;
            alert = check_overspend(&budget);
        }
        info!(
            product = %expense.product_name,
            amount,
            overspent = alert.is_some(),
            "expense recorded"
        );

        let mut result = json!({ "expense": expense });
        if let Some(alert) = alert {
            result["alert"] = serde_json::to_value(alert)?;
        }
        Ok(result)
    }
}

fn record_expense_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: "record_expense".to_string(),
        description: "Record one expense and update the matching budget category".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "amount": {"type": "number", "description": "Amount spent"},
                "product_name": {"type": "string", "description": "What was bought"},
                "category": {"type": "string", "description": "Budget category title"},
                "description": {"type": "string", "description": "Optional details"}
            },
            "required": ["amount", "product_name"]
        }),
    }
}

pub fn spec(stores: &Stores, max_rounds: usize) -> Result<Arc<AgentSpec>, OrchestratorError> {
    AgentSpec::builder("expense_manager")
        .description("Records expenses and tracks budget category spending")
        .instruction(SYSTEM_INSTRUCTION)
        .forcing_mode(ForcingMode::Required)
        .max_rounds(max_rounds)
        .tool(
            record_expense_declaration(),
            Arc::new(RecordExpenseHandler {
                budgets: stores.budgets.clone(),
                expenses: stores.expenses.clone(),
            }),
        )
        .build()
}
