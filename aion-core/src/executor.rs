//! Tool Executor
//!
//! Executes one [`CallRequest`] against a [`ToolRegistry`] and always
//! produces a [`CallResult`]. Unknown tools, invalid arguments, and handler
//! failures all become failure results fed back to the model; the loop
//! itself never sees a tool error. Each handler runs exactly once per
//! request — there is no retry here.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::registry::ToolRegistry;
use crate::types::{CallRequest, CallResult, ToolDeclaration};

/// Execute a single call request. Infallible by design: every outcome,
/// including a panic-free handler error, is expressed as a [`CallResult`].
pub async fn execute(registry: &ToolRegistry, request: &CallRequest) -> CallResult {
    let handler = match registry.resolve(&request.tool_name) {
        Ok(handler) => handler,
        Err(err) => {
            warn!(tool = %request.tool_name, "call to unregistered tool");
            return CallResult::failure(&request.tool_name, err.to_string());
        }
    };

    // Some models send null instead of an empty argument object.
    let arguments = match &request.arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };

    // resolve() succeeded, so the declaration lookup cannot fail.
    if let Ok(declaration) = registry.declaration(&request.tool_name) {
        if let Err(err) = validate_arguments(declaration, &arguments) {
            warn!(tool = %request.tool_name, %err, "rejecting call arguments");
            return CallResult::failure(&request.tool_name, err.to_string());
        }
    }

    debug!(tool = %request.tool_name, "invoking tool handler");
    match handler.call(arguments).await {
        Ok(value) => CallResult::success(&request.tool_name, value),
        Err(err) => {
            warn!(tool = %request.tool_name, error = %err, "tool handler failed");
            CallResult::failure(&request.tool_name, err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Argument validation
// ---------------------------------------------------------------------------

/// Check `arguments` against the declared JSON schema: required fields must
/// be present and every provided field must match its declared type. Runs
/// before the handler so a handler never sees malformed input.
pub fn validate_arguments(declaration: &ToolDeclaration, arguments: &Value) -> Result<(), ToolError> {
    let invalid = |reason: String| ToolError::InvalidArguments {
        tool: declaration.name.clone(),
        reason,
    };

    let Some(args) = arguments.as_object() else {
        return Err(invalid("arguments must be a JSON object".to_string()));
    };

    let schema = &declaration.parameters;
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(field) {
                return Err(invalid(format!("missing required field '{field}'")));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (field, value) in args {
        let Some(expected) = properties
            .get(field)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        if !type_matches(expected, value) {
            return Err(invalid(format!(
                "field '{field}' should be of type {expected}"
            )));
        }
    }

    Ok(())
}

/// JSON-schema type check. `number` accepts integers; everything else is
/// strict. Null is allowed for any field not listed as required.
fn type_matches(expected: &str, value: &Value) -> bool {
    if value.is_null() {
        return true;
    }
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::json;

    use crate::registry::ToolHandler;

    struct EchoHandler {
        invoked: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ToolHandler for EchoHandler {
        async fn call(&self, arguments: Value) -> Result<Value> {
            self.invoked.store(true, Ordering::SeqCst);
            Ok(arguments)
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl ToolHandler for FailingHandler {
        async fn call(&self, _arguments: Value) -> Result<Value> {
            bail!("storage offline")
        }
    }

    fn expense_decl() -> ToolDeclaration {
        ToolDeclaration {
            name: "record_expense".to_string(),
            description: "Record one expense".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "amount": {"type": "number"},
                    "product_name": {"type": "string"},
                    "category": {"type": "string"}
                },
                "required": ["amount", "product_name"]
            }),
        }
    }

    fn registry_with(handler: Arc<dyn ToolHandler>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(expense_decl(), handler).unwrap();
        registry
    }

    #[tokio::test]
    async fn successful_call_returns_handler_value() {
        let invoked = Arc::new(AtomicBool::new(false));
        let registry = registry_with(Arc::new(EchoHandler {
            invoked: invoked.clone(),
        }));

        let result = execute(
            &registry,
            &CallRequest {
                tool_name: "record_expense".to_string(),
                arguments: json!({"amount": 500, "product_name": "groceries"}),
            },
        )
        .await;

        assert!(!result.is_failure());
        assert!(invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failure_result() {
        let registry = ToolRegistry::new();
        let result = execute(
            &registry,
            &CallRequest {
                tool_name: "fetch_weather".to_string(),
                arguments: json!({}),
            },
        )
        .await;

        assert!(result.is_failure());
        assert_eq!(result.tool_name, "fetch_weather");
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_handler() {
        let invoked = Arc::new(AtomicBool::new(false));
        let registry = registry_with(Arc::new(EchoHandler {
            invoked: invoked.clone(),
        }));

        // Missing required field.
        let result = execute(
            &registry,
            &CallRequest {
                tool_name: "record_expense".to_string(),
                arguments: json!({"amount": 500}),
            },
        )
        .await;
        assert!(result.is_failure());

        // Wrong type.
        let result = execute(
            &registry,
            &CallRequest {
                tool_name: "record_expense".to_string(),
                arguments: json!({"amount": "five hundred", "product_name": "groceries"}),
            },
        )
        .await;
        assert!(result.is_failure());
        assert!(!invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn handler_error_becomes_failure_result() {
        let registry = registry_with(Arc::new(FailingHandler));
        let result = execute(
            &registry,
            &CallRequest {
                tool_name: "record_expense".to_string(),
                arguments: json!({"amount": 500, "product_name": "groceries"}),
            },
        )
        .await;

        assert!(result.is_failure());
        match &result.outcome {
            crate::types::CallOutcome::Failure(reason) => {
                assert!(reason.contains("storage offline"));
            }
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn null_arguments_are_treated_as_empty_object() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDeclaration {
                    name: "summarize_finances".to_string(),
                    description: String::new(),
                    parameters: json!({"type": "object", "properties": {}}),
                },
                Arc::new(EchoHandler {
                    invoked: Arc::new(AtomicBool::new(false)),
                }),
            )
            .unwrap();

        let result = execute(
            &registry,
            &CallRequest {
                tool_name: "summarize_finances".to_string(),
                arguments: Value::Null,
            },
        )
        .await;
        assert!(!result.is_failure());
    }

    #[test]
    fn number_accepts_integer_values() {
        let decl = expense_decl();
        assert!(validate_arguments(
            &decl,
            &json!({"amount": 500, "product_name": "rent"})
        )
        .is_ok());
        assert!(validate_arguments(
            &decl,
            &json!({"amount": 499.99, "product_name": "rent"})
        )
        .is_ok());
    }
}
