//! JSON-RPC 2.0 envelope types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Protocol version string every envelope must carry
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard and bridge-specific JSON-RPC error codes
pub mod codes {
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Upstream answered with a 4xx that has no more specific mapping
    pub const UPSTREAM_REJECTED: i32 = -32000;
    /// Upstream resource not found (404/410)
    pub const NOT_FOUND: i32 = -32001;
    /// Upstream refused credentials (401/403)
    pub const UNAUTHORIZED: i32 = -32002;
    /// Upstream unreachable, timed out, or failed with 5xx
    pub const UPSTREAM_UNAVAILABLE: i32 = -32003;
}

/// Incoming JSON-RPC request.
///
/// Fields are kept loose so the transport can report envelope problems as
/// `-32600` instead of a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

impl JsonRpcRequest {
    /// Request id to echo back, `null` when the caller sent none
    pub fn response_id(&self) -> JsonValue {
        self.id.clone().unwrap_or(JsonValue::Null)
    }

    /// Notifications carry no id and expect no response body
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
            && self
                .method
                .as_deref()
                .is_some_and(|m| m.starts_with("notifications/"))
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }
}

/// Outgoing JSON-RPC response; exactly one of `result` or `error` is set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: JsonValue, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}
