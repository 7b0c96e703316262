//! Bridge error handling
//!
//! Every failure a tool call can hit ends up here and is turned into a
//! JSON-RPC error object by [`BridgeError::to_rpc_error`].

use fhir_mcp_core::jsonrpc::codes;
use fhir_mcp_core::{JsonRpcError, OperationOutcome, ToolError};
use serde_json::{Value as JsonValue, json};
use thiserror::Error;

/// Why the upstream could not be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    Timeout,
    Connect,
    Other,
}

impl UnavailableReason {
    pub fn as_str(self) -> &'static str {
        match self {
            UnavailableReason::Timeout => "timeout",
            UnavailableReason::Connect => "connect",
            UnavailableReason::Other => "transport",
        }
    }
}

/// Application error type
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("FHIR server unavailable ({}): {message}", .reason.as_str())]
    UpstreamUnavailable {
        reason: UnavailableReason,
        message: String,
    },

    #[error("FHIR server returned HTTP {status}")]
    UpstreamError { status: u16, body: JsonValue },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Map the error onto a JSON-RPC error object.
    ///
    /// Upstream failures carry the original HTTP status and body in `data`.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        match self {
            BridgeError::MethodNotFound(method) => JsonRpcError::method_not_found(method),
            BridgeError::Tool(err) => JsonRpcError::from(err),
            BridgeError::UpstreamUnavailable { reason, .. } => {
                JsonRpcError::new(codes::UPSTREAM_UNAVAILABLE, self.to_string())
                    .with_data(json!({ "status": null, "reason": reason.as_str() }))
            }
            BridgeError::UpstreamError { status, body } => {
                let (code, _, label) = upstream_code(*status);
                let message = match OperationOutcome::diagnostics_of(body) {
                    Some(diag) => format!("{label} (HTTP {status}): {diag}"),
                    None => format!("{label} (HTTP {status})"),
                };
                JsonRpcError::new(code, message)
                    .with_data(json!({ "status": status, "body": body }))
            }
            BridgeError::Internal(msg) => JsonRpcError::new(codes::INTERNAL_ERROR, msg.clone()),
        }
    }

    /// Short outcome label for metrics and audit events
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::MethodNotFound(_) => "method_not_found",
            BridgeError::Tool(ToolError::UnknownTool(_)) => "unknown_tool",
            BridgeError::Tool(_) => "invalid_params",
            BridgeError::UpstreamUnavailable { .. } => "upstream_unavailable",
            BridgeError::UpstreamError { status, .. } => upstream_code(*status).1,
            BridgeError::Internal(_) => "internal",
        }
    }
}

/// JSON-RPC code, outcome label and message for an upstream HTTP status
fn upstream_code(status: u16) -> (i32, &'static str, &'static str) {
    match status {
        400 | 422 => (codes::INVALID_PARAMS, "invalid_params", "Invalid params"),
        401 | 403 => (codes::UNAUTHORIZED, "unauthorized", "Unauthorized"),
        404 | 410 => (codes::NOT_FOUND, "not_found", "Not found"),
        500..=599 => (
            codes::UPSTREAM_UNAVAILABLE,
            "upstream_unavailable",
            "Upstream unavailable",
        ),
        _ => (
            codes::UPSTREAM_REJECTED,
            "upstream_rejected",
            "Upstream rejected request",
        ),
    }
}
