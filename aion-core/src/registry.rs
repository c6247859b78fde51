//! Tool Registry
//!
//! Maps tool names to handlers and declared argument schemas. Registered
//! once while an agent is built, read-only thereafter. `declarations()`
//! preserves registration order so the model sees a stable tool list for
//! the agent's whole lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::agent::AgentSpec;
use crate::error::ToolError;
use crate::types::ToolDeclaration;

// ---------------------------------------------------------------------------
// Tool handler trait
// ---------------------------------------------------------------------------

/// A callable tool. Handlers receive arguments already validated against
/// the declared schema and may mutate external state (exactly once per
/// call — the executor never retries). Failures are returned as errors and
/// folded into a failure CallResult, never allowed to crash the loop.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value>;

    /// For delegate tools: the sub-agent this handler hands the message to.
    /// Used for configuration-time cycle validation only.
    fn delegate_spec(&self) -> Option<&AgentSpec> {
        None
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Registered tool entry: declaration plus handler.
struct ToolEntry {
    declaration: ToolDeclaration,
    handler: Arc<dyn ToolHandler>,
}

/// Name → handler/schema registry for one agent.
#[derive(Default)]
pub struct ToolRegistry {
    /// Entries in registration order.
    entries: Vec<ToolEntry>,
    /// Name → index into `entries`.
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already present.
    pub fn register(
        &mut self,
        declaration: ToolDeclaration,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), ToolError> {
        let name = declaration.name.clone();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(ToolEntry {
            declaration,
            handler,
        });
        Ok(())
    }

    /// Resolve a handler by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ToolHandler>, ToolError> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].handler.clone())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// The declaration for a registered tool.
    pub fn declaration(&self, name: &str) -> Result<&ToolDeclaration, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i].declaration)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Declarations in registration order, stable across calls.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.entries.iter().map(|e| e.declaration.clone()).collect()
    }

    /// All handlers, for delegation-graph walks.
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn ToolHandler>> {
        self.entries.iter().map(|e| &e.handler)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
