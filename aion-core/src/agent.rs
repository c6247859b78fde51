//! Agent Specifications
//!
//! An [`AgentSpec`] is a named, immutable configuration: system
//! instruction, tool set, forcing mode, and round ceiling. Specs are built
//! once at startup via [`AgentSpecBuilder`] and never mutated at runtime.
//! Building validates the tool set and the delegation graph, so a
//! misconfigured agent set fails before any loop runs.

use std::sync::Arc;

use crate::error::OrchestratorError;
use crate::registry::{ToolHandler, ToolRegistry};
use crate::types::{ForcingMode, ToolDeclaration};

/// Round ceiling applied when the builder is not given one. A misbehaving
/// model that keeps calling tools is cut off after this many model round
/// trips.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

// ---------------------------------------------------------------------------
// AgentSpec
// ---------------------------------------------------------------------------

/// Immutable configuration for one agent.
pub struct AgentSpec {
    name: String,
    description: String,
    system_instruction: String,
    forcing_mode: ForcingMode,
    max_rounds: usize,
    registry: ToolRegistry,
}

impl AgentSpec {
    pub fn builder(name: impl Into<String>) -> AgentSpecBuilder {
        AgentSpecBuilder {
            name: name.into(),
            description: String::new(),
            system_instruction: String::new(),
            forcing_mode: ForcingMode::Optional,
            max_rounds: DEFAULT_MAX_ROUNDS,
            tools: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn forcing_mode(&self) -> ForcingMode {
        self.forcing_mode
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSpec")
            .field("name", &self.name)
            .field("forcing_mode", &self.forcing_mode)
            .field("tools", &self.registry.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`AgentSpec`]. Tool registration and delegation-cycle
/// validation happen in [`AgentSpecBuilder::build`].
pub struct AgentSpecBuilder {
    name: String,
    description: String,
    system_instruction: String,
    forcing_mode: ForcingMode,
    max_rounds: usize,
    tools: Vec<(ToolDeclaration, Arc<dyn ToolHandler>)>,
}

impl AgentSpecBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn forcing_mode(mut self, mode: ForcingMode) -> Self {
        self.forcing_mode = mode;
        self
    }

    pub fn max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Add a tool. Duplicate names are reported by `build`.
    pub fn tool(mut self, declaration: ToolDeclaration, handler: Arc<dyn ToolHandler>) -> Self {
        self.tools.push((declaration, handler));
        self
    }

    /// Register all tools and validate the delegation graph.
    pub fn build(self) -> Result<Arc<AgentSpec>, OrchestratorError> {
        let mut registry = ToolRegistry::new();
        for (declaration, handler) in self.tools {
            registry.register(declaration, handler)?;
        }

        let spec = Arc::new(AgentSpec {
            name: self.name,
            description: self.description,
            system_instruction: self.system_instruction,
            forcing_mode: self.forcing_mode,
            max_rounds: self.max_rounds,
            registry,
        });

        validate_delegation(&spec)?;
        Ok(spec)
    }
}

// ---------------------------------------------------------------------------
// Delegation-cycle validation
// ---------------------------------------------------------------------------

/// Walk the delegation graph rooted at `spec` and fail if any delegate
/// reaches an agent already on the path. Delegates are built leaf-first, so
/// this is a configuration check, not a runtime guard.
pub fn validate_delegation(spec: &AgentSpec) -> Result<(), OrchestratorError> {
    fn walk(spec: &AgentSpec, path: &mut Vec<String>) -> Result<(), OrchestratorError> {
        if path.iter().any(|name| name == spec.name()) {
            return Err(OrchestratorError::DelegationCycle(spec.name().to_string()));
        }
        path.push(spec.name().to_string());
        for handler in spec.registry().handlers() {
            if let Some(child) = handler.delegate_spec() {
                walk(child, path)?;
            }
        }
        path.pop();
        Ok(())
    }

    walk(spec, &mut Vec::new())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    struct NoopHandler;

    #[async_trait]
    impl ToolHandler for NoopHandler {
        async fn call(&self, _arguments: serde_json::Value) -> Result<serde_json::Value> {
            Ok(serde_json::json!({}))
        }
    }

    /// Handler that delegates to a fixed sub-agent spec.
    struct FakeDelegate {
        target: Arc<AgentSpec>,
    }

    #[async_trait]
    impl ToolHandler for FakeDelegate {
        async fn call(&self, _arguments: serde_json::Value) -> Result<serde_json::Value> {
            Ok(serde_json::json!({}))
        }
        fn delegate_spec(&self) -> Option<&AgentSpec> {
            Some(&self.target)
        }
    }

    fn decl(name: &str) -> ToolDeclaration {
        ToolDeclaration {
            name: name.to_string(),
            description: String::new(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    #[test]
    fn builder_defaults() {
        let spec = AgentSpec::builder("chatbot").build().unwrap();
        assert_eq!(spec.name(), "chatbot");
        assert_eq!(spec.forcing_mode(), ForcingMode::Optional);
        assert_eq!(spec.max_rounds(), DEFAULT_MAX_ROUNDS);
        assert!(spec.registry().is_empty());
    }

    #[test]
    fn duplicate_tool_fails_build() {
        let result = AgentSpec::builder("expense_manager")
            .tool(decl("record_expense"), Arc::new(NoopHandler))
            .tool(decl("record_expense"), Arc::new(NoopHandler))
            .build();
        assert!(matches!(result, Err(OrchestratorError::InvalidAgent(_))));
    }

    #[test]
    fn acyclic_delegation_passes() {
        let expense = AgentSpec::builder("expense_manager")
            .tool(decl("record_expense"), Arc::new(NoopHandler))
            .build()
            .unwrap();
        let chatbot = AgentSpec::builder("chatbot")
            .tool(
                decl("call_expense_manager"),
                Arc::new(FakeDelegate { target: expense }),
            )
            .build()
            .unwrap();
        assert!(validate_delegation(&chatbot).is_ok());
    }

    #[test]
    fn delegation_back_to_caller_is_rejected() {
        // A delegate whose target carries the same name as the root agent
        // models a configuration that routes back to its own caller.
        let impostor = AgentSpec::builder("chatbot").build().unwrap();
        let coordinator = AgentSpec::builder("coordinator")
            .tool(
                decl("call_chatbot"),
                Arc::new(FakeDelegate { target: impostor }),
            )
            .build()
            .unwrap();

        let result = AgentSpec::builder("chatbot")
            .tool(
                decl("call_coordinator"),
                Arc::new(FakeDelegate { target: coordinator }),
            )
            .build();

        assert!(matches!(
            result,
            Err(OrchestratorError::DelegationCycle(name)) if name == "chatbot"
        ));
    }
}
