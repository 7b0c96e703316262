//! Audit logging for tool calls that change upstream data

use fhir_mcp_core::{FhirRequest, Tool};

use crate::error::BridgeError;

/// Emit an audit event for a create/update/delete tool call.
///
/// Events go to the `audit` target so they can be routed separately from
/// the regular service log.
pub fn record(
    request_id: &str,
    tool: Tool,
    request: &FhirRequest,
    outcome: Result<u16, &BridgeError>,
) {
    match outcome {
        Ok(status) => tracing::info!(
            target: "audit",
            request_id = %request_id,
            tool = %tool,
            method = %request.method,
            path = %request.path,
            status = status,
            "FHIR mutation"
        ),
        Err(err) => tracing::warn!(
            target: "audit",
            request_id = %request_id,
            tool = %tool,
            method = %request.method,
            path = %request.path,
            outcome = err.kind(),
            error = %err,
            "FHIR mutation failed"
        ),
    }
}
