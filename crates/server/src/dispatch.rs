//! Tool dispatch: validate a `tools/call`, run it upstream, shape the result

use fhir_mcp_core::{FhirRequest, Tool, ToolCall, ToolError};
use serde_json::Value as JsonValue;

use crate::AppState;
use crate::audit;
use crate::error::BridgeError;
use crate::normalize::normalize;

/// Handle the `params` of a `tools/call` request.
///
/// Validation happens before the upstream call, so a bad tool name or a
/// missing argument never reaches the FHIR server.
pub async fn call_tool(
    state: &AppState,
    request_id: &str,
    params: &JsonValue,
) -> Result<JsonValue, BridgeError> {
    let name = params
        .get("name")
        .ok_or(ToolError::MissingArgument("name"))?
        .as_str()
        .ok_or(ToolError::InvalidArgument {
            name: "name",
            expected: "a string",
        })?;
    let arguments = params.get("arguments").unwrap_or(&JsonValue::Null);

    let result = execute(state, request_id, name, arguments).await;

    let tool = Tool::from_name(name).map_or("unknown", Tool::name);
    let outcome = match &result {
        Ok(_) => "success",
        Err(err) => err.kind(),
    };
    metrics::counter!("fhir_tool_calls_total", "tool" => tool, "outcome" => outcome).increment(1);

    result
}

async fn execute(
    state: &AppState,
    request_id: &str,
    name: &str,
    arguments: &JsonValue,
) -> Result<JsonValue, BridgeError> {
    let invocation = ToolCall::parse(name, arguments)
        .and_then(|inv| FhirRequest::from_call(&inv.call).map(|req| (inv, req)));
    let (invocation, request) = match invocation {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!(request_id = %request_id, tool = %name, error = %err, "Rejected tool call");
            return Err(err.into());
        }
    };

    let tool = invocation.call.tool();
    tracing::info!(
        request_id = %request_id,
        tool = %tool,
        method = %request.method,
        path = %request.path,
        "Dispatching tool call"
    );

    let response = state.fhir.execute(&request).await;
    if tool.is_mutation() {
        audit::record(
            request_id,
            tool,
            &request,
            response.as_ref().map(|r| r.status),
        );
    }

    normalize(&invocation, response?)
}
