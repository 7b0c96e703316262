//! JSON-RPC 2.0 transport for MCP clients

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fhir_mcp_core::jsonrpc::JSONRPC_VERSION;
use fhir_mcp_core::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Tool};
use serde_json::{Value as JsonValue, json};

use crate::dispatch::call_tool;
use crate::error::BridgeError;
use crate::middleware::RequestId;
use crate::{AppState, MCP_PROTOCOL_VERSION, SERVICE_NAME, VERSION};

/// POST / and POST /rpc - Handle one JSON-RPC request.
///
/// Envelope problems answer HTTP 400 with `-32600`, and an unreadable or
/// oversized body keeps its HTTP status (e.g. 413) with the same error code.
/// Everything past the envelope answers HTTP 200, with either `result` or
/// `error` set.
pub async fn handle(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(request_id = %request_id, error = %rejection, "Request body rejected");
            let error = JsonRpcError::invalid_request(rejection.body_text());
            return reply(rejection.status(), JsonRpcResponse::failure(JsonValue::Null, error));
        }
    };

    let request = match parse_envelope(&body) {
        Ok(request) => request,
        Err((id, error)) => {
            tracing::warn!(request_id = %request_id, error = %error.message, "Invalid JSON-RPC request");
            return reply(StatusCode::BAD_REQUEST, JsonRpcResponse::failure(id, error));
        }
    };

    if request.is_notification() {
        tracing::debug!(method = ?request.method, "Notification acknowledged");
        return StatusCode::ACCEPTED.into_response();
    }

    let id = request.response_id();
    let method = request.method.as_deref().unwrap_or_default();

    let result = match method {
        "initialize" => Ok(initialize_result()),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(tools_list_result()),
        "tools/call" => match &request.params {
            Some(params @ JsonValue::Object(_)) => call_tool(&state, &request_id, params).await,
            _ => {
                let error = JsonRpcError::invalid_request("tools/call requires an object 'params'");
                return reply(StatusCode::BAD_REQUEST, JsonRpcResponse::failure(id, error));
            }
        },
        other => Err(BridgeError::MethodNotFound(other.to_string())),
    };

    match result {
        Ok(result) => reply(StatusCode::OK, JsonRpcResponse::success(id, result)),
        Err(err) => reply(StatusCode::OK, JsonRpcResponse::failure(id, err.to_rpc_error())),
    }
}

fn reply(status: StatusCode, response: JsonRpcResponse) -> Response {
    (status, Json(response)).into_response()
}

/// Check the envelope shape; on failure return the id to echo with the error
fn parse_envelope(body: &[u8]) -> Result<JsonRpcRequest, (JsonValue, JsonRpcError)> {
    let value: JsonValue = serde_json::from_slice(body).map_err(|e| {
        (
            JsonValue::Null,
            JsonRpcError::invalid_request(format!("Parse error: {}", e)),
        )
    })?;

    let id = value.get("id").cloned().unwrap_or(JsonValue::Null);
    let fail = |message: &str| (id.clone(), JsonRpcError::invalid_request(message));

    if !value.is_object() {
        return Err(fail("Request must be a single JSON object"));
    }
    if !matches!(id, JsonValue::Null | JsonValue::Number(_) | JsonValue::String(_)) {
        return Err((JsonValue::Null, JsonRpcError::invalid_request("'id' must be a number or string")));
    }

    match value.get("jsonrpc") {
        Some(JsonValue::String(version)) if version == JSONRPC_VERSION => {}
        _ => return Err(fail("'jsonrpc' must be the string \"2.0\"")),
    }
    match value.get("method") {
        Some(JsonValue::String(_)) => {}
        None | Some(JsonValue::Null) => return Err(fail("Missing 'method'")),
        Some(_) => return Err(fail("'method' must be a string")),
    }

    serde_json::from_value(value).map_err(|e| fail(&format!("Invalid request: {}", e)))
}

fn initialize_result() -> JsonValue {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": SERVICE_NAME, "version": VERSION }
    })
}

fn tools_list_result() -> JsonValue {
    let tools: Vec<JsonValue> = Tool::ALL
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name(),
                "description": tool.description(),
                "inputSchema": tool.input_schema(),
            })
        })
        .collect();

    json!({ "tools": tools })
}
