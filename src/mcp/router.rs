//! JSON-RPC 2.0 routing for the tool protocol.
//!
//! Methods: `initialize`, `ping`, `tools/list`, `tools/call`. Notifications
//! (messages without an id) are accepted and never answered.

use serde_json::{json, Map, Value};

use crate::tools::{ToolCall, ToolDispatcher, ToolResult};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "jira-admin-mcp";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: Self::PARSE_ERROR,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: Self::INVALID_REQUEST,
            message: message.into(),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: Self::METHOD_NOT_FOUND,
            message: format!("Method not found: {method}"),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: message.into(),
        }
    }
}

pub fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

pub fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message,
        },
    })
}

// =============================================================================
// Router
// =============================================================================

#[derive(Debug, Clone)]
pub struct McpRouter {
    dispatcher: ToolDispatcher,
}

impl McpRouter {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Handle one decoded message (single or batch). Returns the responses to
    /// write, possibly none.
    pub async fn handle_message(&self, incoming: Value) -> Vec<Value> {
        match incoming {
            Value::Array(batch) if batch.is_empty() => vec![error_response(
                Value::Null,
                RpcError::invalid_request("Batch request must not be empty"),
            )],
            Value::Array(batch) => {
                let mut responses = Vec::new();
                for item in batch {
                    if let Some(response) = self.handle_single(item).await {
                        responses.push(response);
                    }
                }
                responses
            }
            single => self.handle_single(single).await.into_iter().collect(),
        }
    }

    async fn handle_single(&self, incoming: Value) -> Option<Value> {
        let Value::Object(obj) = incoming else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        let id = obj.get("id").cloned();
        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return Some(error_response(
                id.unwrap_or(Value::Null),
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            // A response to something we never sent; nothing to answer.
            return match id {
                Some(id) if obj.get("result").is_none() && obj.get("error").is_none() => Some(
                    error_response(id, RpcError::invalid_request("Missing method")),
                ),
                _ => None,
            };
        };

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        match id {
            Some(id) => {
                tracing::debug!(method, "rpc_request");
                Some(match self.handle_request(method, params).await {
                    Ok(result) => success_response(id, result),
                    Err(err) => error_response(id, err),
                })
            }
            None => {
                tracing::debug!(method, "rpc_notification");
                None
            }
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn tools_list_payload(&self) -> Value {
        json!({ "tools": self.dispatcher.list_tools() })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let arguments = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ))
            }
        };

        let result = self
            .dispatcher
            .call_tool(ToolCall::new(name, arguments))
            .await;
        Ok(tool_call_payload(&result))
    }
}

fn initialize_payload() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn tool_call_payload(result: &ToolResult) -> Value {
    let structured = result.to_value();
    let text = serde_json::to_string_pretty(&structured).unwrap_or_else(|_| structured.to_string());
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
        "isError": !result.is_ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::transport::MockHttpTransport;
    use crate::backend::JiraAdminClient;
    use crate::types::CredentialContext;
    use std::sync::Arc;

    fn router() -> McpRouter {
        let mut mock = MockHttpTransport::new();
        mock.expect_send().times(0);
        let creds = CredentialContext::new("https://acme.atlassian.net", "admin", "tok").unwrap();
        McpRouter::new(ToolDispatcher::new(JiraAdminClient::new(
            Arc::new(creds),
            Arc::new(mock),
        )))
    }

    #[tokio::test]
    async fn test_initialize() {
        let out = router()
            .handle_message(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}))
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 1);
        assert_eq!(out[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(out[0]["result"]["serverInfo"]["name"], SERVER_NAME);
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let out = router()
            .handle_message(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let out = router()
            .handle_message(json!({"jsonrpc": "2.0", "id": "x", "method": "resources/list"}))
            .await;
        assert_eq!(out[0]["error"]["code"], RpcError::METHOD_NOT_FOUND);
        assert_eq!(out[0]["id"], "x");
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let r = router();
        let out = r.handle_message(json!({"id": 1, "method": "ping"})).await;
        assert_eq!(out[0]["error"]["code"], RpcError::INVALID_REQUEST);

        let out = r.handle_message(json!([])).await;
        assert_eq!(out[0]["error"]["code"], RpcError::INVALID_REQUEST);

        let out = r.handle_message(json!(42)).await;
        assert_eq!(out[0]["error"]["code"], RpcError::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_tools_call_bad_params() {
        let out = router()
            .handle_message(json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": {"name": "create_user", "arguments": [1]}
            }))
            .await;
        assert_eq!(out[0]["error"]["code"], RpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_validation_error_is_tool_result() {
        let out = router()
            .handle_message(json!({
                "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": {"name": "create_user", "arguments": {}}
            }))
            .await;
        let result = &out[0]["result"];
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["ok"], false);
        assert_eq!(result["structuredContent"]["payload"]["kind"], "ValidationError");
        let text = result["content"][0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, result["structuredContent"]);
    }

    #[tokio::test]
    async fn test_batch() {
        let out = router()
            .handle_message(json!([
                {"jsonrpc": "2.0", "id": 1, "method": "ping"},
                {"jsonrpc": "2.0", "method": "notifications/initialized"},
                {"jsonrpc": "2.0", "id": 2, "method": "tools/list"}
            ]))
            .await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[1]["result"]["tools"].as_array().unwrap().len(), 9);
    }
}
