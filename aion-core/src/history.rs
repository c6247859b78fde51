//! Conversation History
//!
//! An ordered, append-only log of turns. Each user-facing request (or each
//! persisted per-user session) owns exactly one history; the orchestration
//! loop appends to it and hands it back to the caller. There is no removal
//! API — turns are immutable once appended.

use serde::{Deserialize, Serialize};

use crate::types::{CallResult, Turn};

/// Append-only sequence of turns for one conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from previously persisted turns.
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Append a user text turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user_text(text));
    }

    /// Append a model text turn.
    pub fn push_model(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::model_text(text));
    }

    /// Append a tool turn carrying one call result.
    pub fn push_result(&mut self, result: CallResult) {
        self.turns.push(Turn::tool_result(result));
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
