//! Response normalization
//!
//! Turns a successful upstream response into the `result` of a tool call.
//! Upstream failures never reach this module; they are mapped to JSON-RPC
//! errors by [`crate::error::BridgeError::to_rpc_error`].

use fhir_mcp_core::summary;
use fhir_mcp_core::{
    Bundle, BundleEntry, CapabilityStatement, OperationOutcome, OutputFormat, ToolCall,
    ToolInvocation,
};
use serde_json::{Map, Value as JsonValue};

use crate::error::BridgeError;
use crate::fhir::FhirResponse;

/// Build the JSON-RPC result for `invocation` from the upstream response
pub fn normalize(
    invocation: &ToolInvocation,
    response: FhirResponse,
) -> Result<JsonValue, BridgeError> {
    let result = shape(&invocation.call, response)?;

    Ok(match invocation.format {
        OutputFormat::Fhir => result,
        OutputFormat::Mcp => summary::text_content(summary::render(&invocation.call, &result)),
    })
}

fn shape(call: &ToolCall, response: FhirResponse) -> Result<JsonValue, BridgeError> {
    let FhirResponse { body, location, .. } = response;

    let value = match call {
        ToolCall::GetCapabilities {
            resource_type: Some(resource_type),
        } => match body {
            Some(body) => match CapabilityStatement::from_value(body.clone()) {
                Some(statement) => to_json(&statement.narrowed_to(resource_type))?,
                None => body,
            },
            None => JsonValue::Null,
        },
        ToolCall::Search { .. } => search_result(body)?,
        ToolCall::Create {
            resource_type,
            resource,
        } => match body {
            Some(body) => body,
            None => created_from_location(resource_type, resource, location.as_deref()),
        },
        ToolCall::Update { resource, .. } => {
            body.unwrap_or_else(|| JsonValue::Object(resource.clone()))
        }
        ToolCall::Delete { resource_type, id } => match body {
            Some(body) => body,
            None => to_json(&OperationOutcome::success(&format!(
                "Deleted {}/{}",
                resource_type, id
            )))?,
        },
        ToolCall::GetCapabilities {
            resource_type: None,
        }
        | ToolCall::Read { .. } => body.unwrap_or(JsonValue::Null),
    };

    Ok(value)
}

/// Searches always answer with a searchset Bundle carrying `total`
fn search_result(body: Option<JsonValue>) -> Result<JsonValue, BridgeError> {
    let bundle = match body {
        None => Bundle::searchset(0, Vec::new()),
        Some(JsonValue::Array(resources)) => {
            let total = u32::try_from(resources.len()).unwrap_or(u32::MAX);
            let entries = resources
                .into_iter()
                .map(|r| BundleEntry::new(None, r))
                .collect();
            Bundle::searchset(total, entries)
        }
        Some(body) => match Bundle::from_value(body.clone()) {
            Some(bundle) => bundle.with_total(),
            None => {
                tracing::warn!("Search response is not a Bundle, passing it through");
                return Ok(body);
            }
        },
    };

    to_json(&bundle)
}

/// Servers may answer a create with only a `Location` header; report the
/// submitted resource with the id (and version) the server assigned.
fn created_from_location(
    resource_type: &str,
    resource: &Map<String, JsonValue>,
    location: Option<&str>,
) -> JsonValue {
    let mut created = resource.clone();
    if let Some((id, version)) = location.and_then(|l| parse_location(l, resource_type)) {
        created.insert("id".to_string(), JsonValue::String(id.to_string()));
        if let Some(version) = version {
            let meta = created
                .entry("meta")
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if let Some(meta) = meta.as_object_mut() {
                meta.insert(
                    "versionId".to_string(),
                    JsonValue::String(version.to_string()),
                );
            }
        }
    }
    JsonValue::Object(created)
}

/// Extract `(id, version)` from `.../{type}/{id}[/_history/{version}]`
fn parse_location<'a>(location: &'a str, resource_type: &str) -> Option<(&'a str, Option<&'a str>)> {
    let path = location.split(['?', '#']).next()?;
    let mut segments = path.split('/').skip_while(|s| *s != resource_type).skip(1);

    let id = segments.next().filter(|s| !s.is_empty())?;
    let version = match segments.next() {
        Some("_history") => segments.next(),
        _ => None,
    };
    Some((id, version))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue, BridgeError> {
    serde_json::to_value(value)
        .map_err(|e| BridgeError::Internal(format!("Failed to encode result: {}", e)))
}
