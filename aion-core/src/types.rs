//! Core Data Types
//!
//! Shared turn, call, and tool-declaration types used across the
//! orchestration core.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Turn types
// ---------------------------------------------------------------------------

/// One step in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn tool_result(result: CallResult) -> Self {
        Self {
            role: Role::Tool,
            content: TurnContent::CallResult(result),
        }
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Model,
    Tool,
}

/// Turn content — free text, call requests proposed by the model, or the
/// result of executing one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnContent {
    Text(String),
    CallRequests(Vec<CallRequest>),
    CallResult(CallResult),
}

// ---------------------------------------------------------------------------
// Call types
// ---------------------------------------------------------------------------

/// A structured call emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRequest {
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// JSON arguments for the tool.
    pub arguments: serde_json::Value,
}

/// The outcome of executing one CallRequest. Produced for every request,
/// including failed ones — a call is never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResult {
    pub tool_name: String,
    pub outcome: CallOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Success(serde_json::Value),
    Failure(String),
}

impl CallResult {
    pub fn success(tool_name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: CallOutcome::Success(value),
        }
    }

    pub fn failure(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: CallOutcome::Failure(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, CallOutcome::Failure(_))
    }
}

// ---------------------------------------------------------------------------
// Tool declarations
// ---------------------------------------------------------------------------

/// A tool declaration advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Tool name, unique within one registry.
    pub name: String,
    /// Human-readable description the model uses to pick the tool.
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub parameters: serde_json::Value,
}

/// Per-agent policy for whether the model must emit a structured call when
/// applicable tools exist. `Required` is used for agents whose entire
/// purpose is a side effect; a free model tends to describe the action in
/// text instead of emitting it structurally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForcingMode {
    Required,
    Optional,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_result_round_trips_through_serde() {
        let result = CallResult::success(
            "record_expense",
            serde_json::json!({"amount": 500.0, "category": "Food"}),
        );
        let turn = Turn::tool_result(result);

        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();

        assert_eq!(back.role, Role::Tool);
        match back.content {
            TurnContent::CallResult(r) => {
                assert_eq!(r.tool_name, "record_expense");
                match r.outcome {
                    CallOutcome::Success(v) => assert_eq!(v["amount"], 500.0),
                    CallOutcome::Failure(_) => panic!("expected success"),
                }
            }
            _ => panic!("expected call result content"),
        }
    }

    #[test]
    fn failure_round_trips_through_serde() {
        let turn = Turn::tool_result(CallResult::failure("edit_budget", "no such category"));
        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();

        match back.content {
            TurnContent::CallResult(r) => {
                assert!(r.is_failure());
                assert_eq!(r.tool_name, "edit_budget");
            }
            _ => panic!("expected call result content"),
        }
    }

    #[test]
    fn turn_constructors() {
        assert_eq!(Turn::user_text("hi").role, Role::User);
        assert_eq!(Turn::model_text("hello").role, Role::Model);
    }
}
