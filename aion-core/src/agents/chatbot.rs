//! Chatbot Agent
//!
//! The user-facing agent. Answers general finance questions itself, edits
//! the user's profile directly, and hands specialist requests to the other
//! agents through delegate tools. Building the chatbot spec builds the
//! whole agent set, so delegation-cycle validation covers every agent.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::agent::AgentSpec;
use crate::error::OrchestratorError;
use crate::gateway::ModelGateway;
use crate::registry::ToolHandler;
use crate::store::{ProfileStore, UserProfile};
use crate::types::{ForcingMode, ToolDeclaration};

use super::{advisor, budget, delegate_declaration, expense, report, DelegateHandler, Stores};

pub const SYSTEM_INSTRUCTION: &str = "\
You are a personal finance assistant. Answer general questions about the \
user's finances yourself. Use edit_user_profile when the user states or \
changes their income, savings, investments, or debts. Hand specialist work \
to the right agent: call_expense_manager for recording spending, \
call_budget_coordinator for creating or changing budgets, call_report_agent \
for spending summaries, call_advisor for purchase advice. Forward the \
user's request as the message, then relay the agent's answer in your own \
words. Reply in plain text without any markup.";

// ---------------------------------------------------------------------------
// Profile tool
// ---------------------------------------------------------------------------

struct EditProfileHandler {
    profile: Arc<dyn ProfileStore>,
}

#[async_trait]
impl ToolHandler for EditProfileHandler {
    async fn call(&self, arguments: Value) -> Result<Value> {
        let mut profile = self.profile.get().await?;
        apply_profile_update(&mut profile, &arguments);
        self.profile.save(&profile).await?;
        info!("user profile updated");
        Ok(json!({ "profile": profile }))
    }
}

/// Partial update: only fields present in `arguments` change.
fn apply_profile_update(profile: &mut UserProfile, arguments: &Value) {
    if let Some(v) = arguments.get("monthly_income").and_then(Value::as_f64) {
        profile.monthly_income = v;
    }
    if let Some(v) = arguments.get("savings").and_then(Value::as_f64) {
        profile.savings = v;
    }
    if let Some(v) = arguments.get("investments").and_then(Value::as_f64) {
        profile.investments = v;
    }
    if let Some(v) = arguments.get("debts").and_then(Value::as_f64) {
        profile.debts = v;
    }
}

fn edit_profile_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: "edit_user_profile".to_string(),
        description: "Update one or more fields of the user's financial profile".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "monthly_income": {"type": "number"},
                "savings": {"type": "number"},
                "investments": {"type": "number"},
                "debts": {"type": "number"}
            }
        }),
    }
}

// ---------------------------------------------------------------------------
// Message helpers
// ---------------------------------------------------------------------------

/// Prefix the first message of a fresh conversation with the user's
/// profile, so the model has financial context without a tool round trip.
pub fn compose_first_message(profile: &UserProfile, message: &str) -> String {
    format!(
        "[User profile: monthly income {:.2}, savings {:.2}, investments {:.2}, debts {:.2}]\n{}",
        profile.monthly_income, profile.savings, profile.investments, profile.debts, message
    )
}

/// Remove HTML tags from a model answer. Models occasionally wrap replies
/// in markup despite the instruction; the chat surface is plain text.
pub fn strip_html_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// Build the chatbot and, beneath it, the full agent set. `max_rounds`
/// applies to every agent in the set.
pub fn spec(
    stores: &Stores,
    gateway: Arc<dyn ModelGateway>,
    max_rounds: usize,
) -> Result<Arc<AgentSpec>, OrchestratorError> {
    let expense = expense::spec(stores, max_rounds)?;
    let budget = budget::spec(stores, max_rounds)?;
    let report = report::spec(stores, max_rounds)?;
    let advisor = advisor::spec(stores, max_rounds)?;

    AgentSpec::builder("chatbot")
        .description("User-facing personal finance assistant")
        .instruction(SYSTEM_INSTRUCTION)
        .forcing_mode(ForcingMode::Optional)
        .max_rounds(max_rounds)
        .tool(
            edit_profile_declaration(),
            Arc::new(EditProfileHandler {
                profile: stores.profile.clone(),
            }),
        )
        .tool(
            delegate_declaration(
                "call_expense_manager",
                "Record an expense the user describes",
            ),
            Arc::new(DelegateHandler::new(expense, gateway.clone())),
        )
        .tool(
            delegate_declaration(
                "call_budget_coordinator",
                "Create, edit, or delete a budget category",
            ),
            Arc::new(DelegateHandler::new(budget, gateway.clone())),
        )
        .tool(
            delegate_declaration(
                "call_report_agent",
                "Summarize spending against the user's budgets",
            ),
            Arc::new(DelegateHandler::new(report, gateway.clone())),
        )
        .tool(
            delegate_declaration(
                "call_advisor",
                "Advise on whether a purchase fits the user's finances",
            ),
            Arc::new(DelegateHandler::new(advisor, gateway)),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::memory_stores;
    use crate::error::GatewayError;
    use crate::gateway::ModelTurn;
    use crate::types::Turn;

    struct SilentGateway;

    #[async_trait]
    impl ModelGateway for SilentGateway {
        fn name(&self) -> &str {
            "silent"
        }
        async fn converse(
            &self,
            _: &str,
            _: &[Turn],
            _: &[ToolDeclaration],
            _: ForcingMode,
        ) -> std::result::Result<ModelTurn, GatewayError> {
            Ok(ModelTurn::text(""))
        }
    }

    #[tokio::test]
    async fn partial_profile_update_keeps_other_fields() {
        let stores = memory_stores();
        stores
            .profile
            .save(&UserProfile {
                monthly_income: 50000.0,
                savings: 10000.0,
                investments: 0.0,
                debts: 2000.0,
            })
            .await
            .unwrap();

        let handler = EditProfileHandler {
            profile: stores.profile.clone(),
        };
        let result = handler.call(json!({"monthly_income": 75000.0})).await.unwrap();

        assert_eq!(result["profile"]["monthly_income"], 75000.0);
        assert_eq!(result["profile"]["savings"], 10000.0);
        assert_eq!(result["profile"]["debts"], 2000.0);
    }

    #[test]
    fn full_agent_set_builds_without_cycles() {
        let spec = spec(&memory_stores(), Arc::new(SilentGateway), 5).unwrap();
        assert_eq!(spec.registry().len(), 5);
        assert_eq!(spec.forcing_mode(), ForcingMode::Optional);
    }

    #[test]
    fn html_tags_are_stripped() {
        assert_eq!(
            strip_html_tags("<p>Your income is <b>updated</b>.</p>"),
            "Your income is updated."
        );
        assert_eq!(strip_html_tags("no markup"), "no markup");
        assert_eq!(strip_html_tags("a < b and a > b"), "a  b");
    }

    #[test]
    fn first_message_carries_profile_context() {
        let profile = UserProfile {
            monthly_income: 75000.0,
            ..UserProfile::default()
        };
        let composed = compose_first_message(&profile, "can I afford a laptop?");
        assert!(composed.contains("monthly income 75000.00"));
        assert!(composed.ends_with("can I afford a laptop?"));
    }
}
