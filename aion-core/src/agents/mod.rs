//! Agent Set
//!
//! One module per agent: the user-facing chatbot plus the specialist agents
//! it can hand a message to. Each module exports a system instruction and a
//! `spec(…)` constructor; `chatbot::spec` wires the whole set together and
//! is the entry point callers use.
//!
//! Delegation is modeled as an ordinary tool: a [`DelegateHandler`] runs a
//! nested orchestration loop against the target agent with a fresh history.
//! The target sees only the forwarded message, never the caller's
//! conversation.

pub mod advisor;
pub mod budget;
pub mod chatbot;
pub mod expense;
pub mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::agent::AgentSpec;
use crate::gateway::ModelGateway;
use crate::history::ConversationHistory;
use crate::orchestrator::Orchestrator;
use crate::registry::ToolHandler;
use crate::store::{BudgetStore, ExpenseStore, ProfileStore};
use crate::types::ToolDeclaration;

// ---------------------------------------------------------------------------
// Shared store bundle
// ---------------------------------------------------------------------------

/// The per-user stores the tool handlers operate on.
#[derive(Clone)]
pub struct Stores {
    pub profile: Arc<dyn ProfileStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub expenses: Arc<dyn ExpenseStore>,
}

// ---------------------------------------------------------------------------
// Delegate tool
// ---------------------------------------------------------------------------

/// Tool handler that forwards a message to a sub-agent by running a nested
/// orchestration loop to completion and returning the sub-agent's final
/// answer as the tool result.
pub struct DelegateHandler {
    target: Arc<AgentSpec>,
    gateway: Arc<dyn ModelGateway>,
}

impl DelegateHandler {
    pub fn new(target: Arc<AgentSpec>, gateway: Arc<dyn ModelGateway>) -> Self {
        Self { target, gateway }
    }
}

#[async_trait]
impl ToolHandler for DelegateHandler {
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let message = arguments
            .get("message")
            .and_then(serde_json::Value::as_str)
            .context("delegate call missing 'message'")?;

        info!(agent = self.target.name(), "delegating message to sub-agent");
        let orchestrator = Orchestrator::new(self.gateway.clone());
        let mut history = ConversationHistory::new();
        let run = orchestrator
            .run(
                &self.target,
                &mut history,
                message,
                &CancellationToken::new(),
            )
            .await
            .with_context(|| format!("sub-agent '{}' failed", self.target.name()))?;

        Ok(json!({
            "agent": self.target.name(),
            "message": run.final_text,
        }))
    }

    fn delegate_spec(&self) -> Option<&AgentSpec> {
        Some(&self.target)
    }
}

/// Declaration shared by all delegate tools: one required `message` string.
pub fn delegate_declaration(name: &str, description: &str) -> ToolDeclaration {
    ToolDeclaration {
        name: name.to_string(),
        description: description.to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The user's request, forwarded verbatim"
                }
            },
            "required": ["message"]
        }),
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------
