//! Orchestration Loop
//!
//! Core loop: user message → model → if call requests, execute them and
//! feed the results back → repeat until the model answers in plain text or
//! the round ceiling is hit.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::AgentSpec;
use crate::error::OrchestratorError;
use crate::executor;
use crate::gateway::ModelGateway;
use crate::history::ConversationHistory;

// ---------------------------------------------------------------------------
// Loop result
// ---------------------------------------------------------------------------

/// Result of driving one user message through the loop.
#[derive(Debug)]
pub struct LoopRun {
    /// The model's final text answer (empty if the run was cancelled).
    pub final_text: String,
    /// Number of model round trips performed.
    pub rounds: usize,
    /// Number of tool calls executed across all rounds.
    pub calls_executed: usize,
    /// Whether the run was cancelled before completing.
    pub cancelled: bool,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives the model/tool loop for any agent. Holds no per-agent state; the
/// same orchestrator serves the top-level chatbot and every nested
/// delegate run.
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> Arc<dyn ModelGateway> {
        self.gateway.clone()
    }

    /// Run one user message to completion.
    ///
    /// Appends the user turn, then alternates model rounds and tool
    /// execution until the model produces plain text. Tool failures are fed
    /// back as failure results and never abort the run; gateway errors and
    /// the round ceiling do.
    pub async fn run(
        &self,
        spec: &AgentSpec,
        history: &mut ConversationHistory,
        user_message: &str,
        cancel_token: &CancellationToken,
    ) -> Result<LoopRun, OrchestratorError> {
        history.push_user(user_message);

        let declarations = spec.registry().declarations();
        let mut calls_executed = 0;

        for round in 1..=spec.max_rounds() {
            if cancel_token.is_cancelled() {
                info!(agent = spec.name(), round, "orchestration cancelled");
                return Ok(LoopRun {
                    final_text: String::new(),
                    rounds: round - 1,
                    calls_executed,
                    cancelled: true,
                });
            }

            debug!(
                agent = spec.name(),
                round,
                turn_count = history.len(),
                "calling model gateway"
            );
            let response = self
                .gateway
                .converse(
                    spec.system_instruction(),
                    history.turns(),
                    &declarations,
                    spec.forcing_mode(),
                )
                .await?;

            if response.calls.is_empty() {
                debug!(agent = spec.name(), round, "model answered in text");
                history.push_model(&response.text);
                return Ok(LoopRun {
                    final_text: response.text,
                    rounds: round,
                    calls_executed,
                    cancelled: false,
                });
            }

            info!(
                agent = spec.name(),
                round,
                call_count = response.calls.len(),
                "model requested calls, executing"
            );
            for request in &response.calls {
                let result = executor::execute(spec.registry(), request).await;
                if result.is_failure() {
                    warn!(agent = spec.name(), tool = %request.tool_name, "call failed");
                }
                calls_executed += 1;
                history.push_result(result);
            }
        }

        warn!(
            agent = spec.name(),
            max_rounds = spec.max_rounds(),
            "loop ceiling exceeded"
        );
        Err(OrchestratorError::LoopExceeded {
            max_rounds: spec.max_rounds(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::GatewayError;
    use crate::gateway::ModelTurn;
    use crate::registry::ToolHandler;
    use crate::types::{
        CallRequest, ForcingMode, Role, ToolDeclaration, Turn, TurnContent,
    };

    /// Gateway that replays a fixed script of turns. Once the script runs
    /// out, it keeps requesting the same call so ceiling tests can use it.
    struct ScriptedGateway {
        script: Mutex<VecDeque<ModelTurn>>,
        conversations: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(turns: Vec<ModelTurn>) -> Self {
            Self {
                script: Mutex::new(turns.into()),
                conversations: AtomicUsize::new(0),
            }
        }

        fn conversations(&self) -> usize {
            self.conversations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn converse(
            &self,
            _system_instruction: &str,
            _turns: &[Turn],
            _tools: &[ToolDeclaration],
            _mode: ForcingMode,
        ) -> Result<ModelTurn, GatewayError> {
            self.conversations.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            Ok(script.pop_front().unwrap_or_else(|| {
                ModelTurn::calls(vec![CallRequest {
                    tool_name: "edit_user_profile".to_string(),
                    arguments: json!({}),
                }])
            }))
        }
    }

    struct RecordingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ToolHandler for RecordingHandler {
        async fn call(&self, _arguments: serde_json::Value) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"status": "ok"}))
        }
    }

    fn profile_spec() -> Arc<AgentSpec> {
        AgentSpec::builder("chatbot")
            .tool(
                ToolDeclaration {
                    name: "edit_user_profile".to_string(),
                    description: "Update the user's financial profile".to_string(),
                    parameters: json!({
                        "type": "object",
                        "properties": {"monthly_income": {"type": "number"}}
                    }),
                },
                Arc::new(RecordingHandler {
                    calls: AtomicUsize::new(0),
                }),
            )
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn text_only_answer_is_two_turns() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ModelTurn::text("Hello!")]));
        let orchestrator = Orchestrator::new(gateway.clone());
        let spec = profile_spec();
        let mut history = ConversationHistory::new();

        let run = orchestrator
            .run(&spec, &mut history, "Hi", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.final_text, "Hello!");
        assert_eq!(run.rounds, 1);
        assert_eq!(run.calls_executed, 0);
        assert_eq!(history.len(), 2);
        assert_eq!(gateway.conversations(), 1);
    }

    #[tokio::test]
    async fn tool_round_trip_leaves_user_tool_model_turns() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            ModelTurn::calls(vec![CallRequest {
                tool_name: "edit_user_profile".to_string(),
                arguments: json!({"monthly_income": 75000}),
            }]),
            ModelTurn::text("Your income is updated."),
        ]));
        let orchestrator = Orchestrator::new(gateway);
        let spec = profile_spec();
        let mut history = ConversationHistory::new();

        let run = orchestrator
            .run(
                &spec,
                &mut history,
                "My income is 75000",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(run.rounds, 2);
        assert_eq!(run.calls_executed, 1);

        let roles: Vec<Role> = history.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Tool, Role::Model]);
        match &history.turns()[1].content {
            TurnContent::CallResult(result) => {
                assert_eq!(result.tool_name, "edit_user_profile");
                assert!(!result.is_failure());
            }
            _ => panic!("expected call result turn"),
        }
    }

    #[tokio::test]
    async fn ceiling_aborts_a_looping_model() {
        // Empty script: the gateway requests a call on every round.
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let orchestrator = Orchestrator::new(gateway.clone());
        let spec = profile_spec();
        let mut history = ConversationHistory::new();

        let err = orchestrator
            .run(&spec, &mut history, "loop forever", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::LoopExceeded { max_rounds: 5 }
        ));
        assert_eq!(gateway.conversations(), 5);
        // One user turn plus one tool turn per round.
        assert_eq!(history.len(), 6);
    }

    #[tokio::test]
    async fn failure_result_is_fed_back_not_fatal() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            ModelTurn::calls(vec![CallRequest {
                tool_name: "no_such_tool".to_string(),
                arguments: json!({}),
            }]),
            ModelTurn::text("Sorry, I can't do that."),
        ]));
        let orchestrator = Orchestrator::new(gateway);
        let spec = profile_spec();
        let mut history = ConversationHistory::new();

        let run = orchestrator
            .run(&spec, &mut history, "do the thing", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.calls_executed, 1);
        match &history.turns()[1].content {
            TurnContent::CallResult(result) => assert!(result.is_failure()),
            _ => panic!("expected call result turn"),
        }
        assert_eq!(run.final_text, "Sorry, I can't do that.");
    }

    #[tokio::test]
    async fn several_calls_in_one_round_all_execute_in_order() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            ModelTurn::calls(vec![
                CallRequest {
                    tool_name: "edit_user_profile".to_string(),
                    arguments: json!({"monthly_income": 75000}),
                },
                CallRequest {
                    tool_name: "no_such_tool".to_string(),
                    arguments: json!({}),
                },
            ]),
            ModelTurn::text("Done."),
        ]));
        let orchestrator = Orchestrator::new(gateway);
        let spec = profile_spec();
        let mut history = ConversationHistory::new();

        let run = orchestrator
            .run(&spec, &mut history, "update things", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.calls_executed, 2);
        let names: Vec<&str> = history
            .turns()
            .iter()
            .filter_map(|t| match &t.content {
                TurnContent::CallResult(r) => Some(r.tool_name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["edit_user_profile", "no_such_tool"]);
    }

    #[tokio::test]
    async fn cancellation_stops_before_the_first_round() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ModelTurn::text("unreached")]));
        let orchestrator = Orchestrator::new(gateway.clone());
        let spec = profile_spec();
        let mut history = ConversationHistory::new();

        let token = CancellationToken::new();
        token.cancel();

        let run = orchestrator
            .run(&spec, &mut history, "Hi", &token)
            .await
            .unwrap();

        assert!(run.cancelled);
        assert_eq!(run.rounds, 0);
        assert_eq!(gateway.conversations(), 0);
    }

    #[tokio::test]
    async fn gateway_error_propagates() {
        struct BrokenGateway;

        #[async_trait]
        impl ModelGateway for BrokenGateway {
            fn name(&self) -> &str {
                "broken"
            }
            async fn converse(
                &self,
                _: &str,
                _: &[Turn],
                _: &[ToolDeclaration],
                _: ForcingMode,
            ) -> Result<ModelTurn, GatewayError> {
                Err(GatewayError::Unavailable("HTTP 503".to_string()))
            }
        }

        let orchestrator = Orchestrator::new(Arc::new(BrokenGateway));
        let spec = profile_spec();
        let mut history = ConversationHistory::new();

        let err = orchestrator
            .run(&spec, &mut history, "Hi", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Gateway(_)));
    }
}
