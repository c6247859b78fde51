//! Google Gemini Model Gateway
//!
//! Implements [`ModelGateway`] for the Gemini `generateContent` API.
//! Maps the turn model onto Gemini contents, advertises tool declarations,
//! and translates the forcing mode into `functionCallingConfig`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use aion_core::{
    CallRequest, CallResult, ForcingMode, GatewayError, ModelGateway, ModelTurn, Role,
    ToolDeclaration, Turn, TurnContent,
};

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Gemini `ModelGateway`.
pub struct GeminiGateway {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Convert turns, declarations, and the forcing mode into a
/// `generateContent` request body.
fn build_request_body(
    system_instruction: &str,
    turns: &[Turn],
    tools: &[ToolDeclaration],
    mode: ForcingMode,
) -> Value {
    let contents = turns_to_contents(turns);

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "maxOutputTokens": 8192,
        }
    });

    if !system_instruction.is_empty() {
        body["systemInstruction"] = json!({
            "parts": [{ "text": system_instruction }]
        });
    }

    if !tools.is_empty() {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters
                })
            })
            .collect();
        body["tools"] = json!([{ "functionDeclarations": declarations }]);
        body["toolConfig"] = json!({
            "functionCallingConfig": {
                "mode": match mode {
                    ForcingMode::Required => "ANY",
                    ForcingMode::Optional => "AUTO",
                }
            }
        });
    }

    body
}

/// Map the history onto Gemini contents. The history keeps only the tool
/// turns of a call round (the model's call-request turn is never
/// appended), but the API rejects a `functionResponse` with no paired
/// `functionCall` in the preceding model content — so each run of tool
/// turns is preceded by a reconstructed model content carrying one
/// `functionCall` per result.
fn turns_to_contents(turns: &[Turn]) -> Vec<Value> {
    let mut contents = Vec::new();
    let mut i = 0;
    while i < turns.len() {
        match (&turns[i].role, &turns[i].content) {
            (Role::User, TurnContent::Text(text)) => {
                contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": text }]
                }));
                i += 1;
            }
            (Role::Model, TurnContent::Text(text)) => {
                contents.push(json!({
                    "role": "model",
                    "parts": [{ "text": text }]
                }));
                i += 1;
            }
            (Role::Model, TurnContent::CallRequests(calls)) => {
                let parts: Vec<Value> = calls
                    .iter()
                    .map(|c| {
                        json!({
                            "functionCall": {
                                "name": c.tool_name,
                                "args": c.arguments,
                            }
                        })
                    })
                    .collect();
                contents.push(json!({ "role": "model", "parts": parts }));
                i += 1;
            }
            (Role::Tool, TurnContent::CallResult(_)) => {
                // One call round: collect the whole run of tool turns.
                let mut results = Vec::new();
                while i < turns.len() {
                    match (&turns[i].role, &turns[i].content) {
                        (Role::Tool, TurnContent::CallResult(result)) => {
                            results.push(result);
                            i += 1;
                        }
                        _ => break,
                    }
                }

                let call_parts: Vec<Value> = results
                    .iter()
                    .map(|r| {
                        json!({
                            "functionCall": {
                                "name": r.tool_name,
                                "args": {},
                            }
                        })
                    })
                    .collect();
                contents.push(json!({ "role": "model", "parts": call_parts }));

                let response_parts: Vec<Value> = results
                    .iter()
                    .map(|r| {
                        json!({
                            "functionResponse": {
                                "name": r.tool_name,
                                "response": result_payload(r),
                            }
                        })
                    })
                    .collect();
                contents.push(json!({ "role": "user", "parts": response_parts }));
            }
            _ => {
                i += 1;
            }
        }
    }
    contents
}

/// Gemini expects a JSON object in `functionResponse.response`.
fn result_payload(result: &CallResult) -> Value {
    match &result.outcome {
        aion_core::CallOutcome::Success(value) => json!({ "result": value }),
        aion_core::CallOutcome::Failure(reason) => json!({ "error": reason }),
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Extract text and function calls from a `generateContent` response. All
/// parts of the first candidate are inspected; a single response may carry
/// text and several calls at once.
fn parse_response(parsed: &Value) -> Result<ModelTurn, GatewayError> {
    let parts = parsed
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| GatewayError::Malformed("response has no candidate parts".to_string()))?;

    let mut text = String::new();
    let mut calls = Vec::new();
    for part in parts {
        if let Some(t) = part.get("text").and_then(Value::as_str) {
            text.push_str(t);
        }
        if let Some(fc) = part.get("functionCall") {
            let tool_name = fc
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    GatewayError::Malformed("functionCall part without a name".to_string())
                })?
                .to_string();
            calls.push(CallRequest {
                tool_name,
                arguments: fc.get("args").cloned().unwrap_or(Value::Null),
            });
        }
    }

    if text.is_empty() && calls.is_empty() {
        return Err(GatewayError::Malformed(
            "response carries neither text nor function calls".to_string(),
        ));
    }

    Ok(ModelTurn { text, calls })
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn converse(
        &self,
        system_instruction: &str,
        turns: &[Turn],
        tools: &[ToolDeclaration],
        mode: ForcingMode,
    ) -> Result<ModelTurn, GatewayError> {
        let body = build_request_body(system_instruction, turns, tools, mode);
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        debug!(model = %self.model, turn_count = turns.len(), "calling Gemini API");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Unavailable(format!(
                "Gemini API error (HTTP {status}): {body}"
            )));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        parse_response(&parsed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
