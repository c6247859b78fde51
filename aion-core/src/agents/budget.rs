//! Budget Coordinator Agent
//!
//! Forced-call agent managing budget categories: add, edit, delete. Handler
//! failures (missing category, duplicate title) are ordinary tool failures
//! fed back to the model, which relays them to the user.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::agent::AgentSpec;
use crate::error::OrchestratorError;
use crate::registry::ToolHandler;
use crate::store::{BudgetCategory, BudgetStore};
use crate::types::{ForcingMode, ToolDeclaration};

use super::Stores;

pub const SYSTEM_INSTRUCTION: &str = "\
You are a budget coordinator for a personal finance assistant. Manage the \
user's budget categories with the add_budget, edit_budget, and delete_budget \
tools. Always act through a tool call, then confirm what changed in one \
short sentence. If a tool reports a failure, explain it plainly and suggest \
the closest valid action.";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

struct AddBudgetHandler {
    budgets: Arc<dyn BudgetStore>,
}

#[async_trait]
impl ToolHandler for AddBudgetHandler {
    async fn call(&self, arguments: Value) -> Result<Value> {
        let title = required_title(&arguments)?;
        let allocated = arguments
            .get("allocated")
            .and_then(Value::as_f64)
            .context("missing allocated amount")?;

        if self.budgets.get(&title).await?.is_some() {
            bail!("budget '{title}' already exists");
        }

        let category = BudgetCategory {
            title,
            allocated,
            spent: 0.0,
            description: arguments
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        };
        self.budgets.save(&category).await?;
        info!(title = %category.title, allocated, "budget added");
        Ok(json!({ "budget": category }))
    }
}

struct EditBudgetHandler {
    budgets: Arc<dyn BudgetStore>,
}

#[async_trait]
impl ToolHandler for EditBudgetHandler {
    async fn call(&self, arguments: Value) -> Result<Value> {
        let title = required_title(&arguments)?;
        let Some(mut category) = self.budgets.get(&title).await? else {
            bail!("no budget named '{title}'");
        };

        if let Some(allocated) = arguments.get("allocated").and_then(Value::as_f64) {
            category.allocated = allocated;
        }
        if let Some(spent) = arguments.get("spent").and_then(Value::as_f64) {
            category.spent = spent;
        }
        if let Some(description) = arguments.get("description").and_then(Value::as_str) {
            category.description = Some(description.to_string());
        }

        self.budgets.save(&category).await?;
        info!(title = %category.title, "budget edited");
        Ok(json!({ "budget": category }))
    }
}

struct DeleteBudgetHandler {
    budgets: Arc<dyn BudgetStore>,
}

#[async_trait]
impl ToolHandler for DeleteBudgetHandler {
    async fn call(&self, arguments: Value) -> Result<Value> {
        let title = required_title(&arguments)?;
        if !self.budgets.delete(&title).await? {
            bail!("no budget named '{title}'");
        }
        info!(%title, "budget deleted");
        Ok(json!({ "deleted": title }))
    }
}

fn required_title(arguments: &Value) -> Result<String> {
    Ok(arguments
        .get("title")
        .and_then(Value::as_str)
        .context("missing budget title")?
        .to_string())
}

// ---------------------------------------------------------------------------
// Declarations and spec
// ---------------------------------------------------------------------------

fn add_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: "add_budget".to_string(),
        description: "Create a budget category with an allocated amount".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "allocated": {"type": "number"},
                "description": {"type": "string"}
            },
            "required": ["title", "allocated"]
        }),
    }
}

fn edit_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: "edit_budget".to_string(),
        description: "Change an existing budget category's allocation, spent total, or description"
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "allocated": {"type": "number"},
                "spent": {"type": "number"},
                "description": {"type": "string"}
            },
            "required": ["title"]
        }),
    }
}

fn delete_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: "delete_budget".to_string(),
        description: "Delete a budget category by title".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"}
            },
            "required": ["title"]
        }),
    }
}

pub fn spec(stores: &Stores, max_rounds: usize) -> Result<Arc<AgentSpec>, OrchestratorError> {
    AgentSpec::builder("budget_coordinator")
        .description("Creates, edits, and deletes budget categories")
        .instruction(SYSTEM_INSTRUCTION)
        .forcing_mode(ForcingMode::Required)
        .max_rounds(max_rounds)
        .tool(
            add_declaration(),
            Arc::new(AddBudgetHandler {
                budgets: stores.budgets.clone(),
            }),
        )
        .tool(
            edit_declaration(),
            Arc::new(EditBudgetHandler {
                budgets: stores.budgets.clone(),
            }),
        )
        .tool(
            delete_declaration(),
            Arc::new(DeleteBudgetHandler {
                budgets: stores.budgets.clone(),
            }),
        )
        .build()
}
