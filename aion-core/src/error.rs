//! Error Taxonomy
//!
//! Three layers, matching how far each error travels:
//! - [`ToolError`] — recovered locally by the executor into a `failure`
//!   CallResult and fed back to the model.
//! - [`GatewayError`] — surfaced to the caller of the loop, never retried
//!   by the core.
//! - [`OrchestratorError`] — fatal for the current request (or, for
//!   [`OrchestratorError::DelegationCycle`], fatal at configuration time).

use thiserror::Error;

/// Errors raised while resolving or invoking a tool.
///
/// `UnknownTool` and `InvalidArguments` never escape the executor: they are
/// folded into a failure CallResult so the model gets a chance to
/// self-correct. `DuplicateTool` is a configuration error raised while an
/// agent is being built.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}

/// Errors from the model gateway boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport or rate-limit failure. Propagated, not retried internally;
    /// retry policy belongs to the transport layer above the loop.
    #[error("model gateway unavailable: {0}")]
    Unavailable(String),

    /// The response could not be parsed into text or call requests.
    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// Fatal errors for a single orchestration run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The model kept requesting calls past the round ceiling.
    #[error("loop ceiling of {max_rounds} round trips exceeded")]
    LoopExceeded { max_rounds: usize },

    /// An agent's delegate tools reach back to an agent already on the
    /// delegation path. Raised while building the agent set, before any
    /// loop runs.
    #[error("delegation cycle through agent '{0}'")]
    DelegationCycle(String),

    /// The agent could not be constructed (e.g. duplicate tool name).
    #[error("invalid agent configuration: {0}")]
    InvalidAgent(#[from] ToolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = ToolError::UnknownTool("edit_user_profile".into());
        assert!(err.to_string().contains("edit_user_profile"));

        let err = OrchestratorError::LoopExceeded { max_rounds: 5 };
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn gateway_errors_convert() {
        let err: OrchestratorError = GatewayError::Unavailable("HTTP 429".into()).into();
        assert!(matches!(err, OrchestratorError::Gateway(GatewayError::Unavailable(_))));
    }
}
