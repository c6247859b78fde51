//! Model Gateway Trait
//!
//! Opaque boundary to the generative model: given a conversation and a set
//! of declared tools, produce either text or structured call requests.
//! Implemented by `aion-provider-gemini`; tests use scripted gateways.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{CallRequest, ForcingMode, ToolDeclaration, Turn};

/// One model response turn. A response may carry several proposed calls;
/// when any calls are present the loop executes them all before asking the
/// model again, and `text` (if any) is informational only.
#[derive(Debug, Clone)]
pub struct ModelTurn {
    /// Text content (may be empty when the model only requests calls).
    pub text: String,
    /// Call requests collected across all parts of the response.
    pub calls: Vec<CallRequest>,
}

impl ModelTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Vec::new(),
        }
    }

    pub fn calls(calls: Vec<CallRequest>) -> Self {
        Self {
            text: String::new(),
            calls,
        }
    }
}

/// Boundary to the generative model.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Gateway identifier (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send the conversation and declared tools, get back one model turn.
    ///
    /// Fails with [`GatewayError::Unavailable`] on transport or rate-limit
    /// failure and [`GatewayError::Malformed`] when the response cannot be
    /// parsed into text or call requests. Never retries internally.
    async fn converse(
        &self,
        system_instruction: &str,
        turns: &[Turn],
        tools: &[ToolDeclaration],
        mode: ForcingMode,
    ) -> Result<ModelTurn, GatewayError>;
}
