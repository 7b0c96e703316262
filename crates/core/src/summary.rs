//! Plain-text rendering of tool results for the `mcp` output format
//!
//! LLM callers read these summaries directly, so they favour short labelled
//! lines over raw JSON.

use serde_json::{Value as JsonValue, json};

use crate::bundle::Bundle;
use crate::capability::CapabilityStatement;
use crate::tool::ToolCall;

/// Maximum number of ids listed for non-Patient search results
const MAX_LISTED_IDS: usize = 10;

/// Wrap text as an MCP tool result
pub fn text_content(text: String) -> JsonValue {
    json!({ "content": [{ "type": "text", "text": text }] })
}

/// Render a normalized FHIR result for `call`
pub fn render(call: &ToolCall, result: &JsonValue) -> String {
    match call {
        ToolCall::GetCapabilities { resource_type } => {
            capabilities(resource_type.as_deref(), result)
        }
        ToolCall::Search { resource_type, .. } => search(resource_type, result),
        ToolCall::Read { resource_type, .. } => {
            if resource_type == "Patient" {
                format!("PATIENT FOUND:\n\n{}", patient_lines(result, ""))
            } else {
                format!(
                    "{} FOUND:\n\n{}",
                    resource_type.to_uppercase(),
                    resource_lines(result)
                )
            }
        }
        ToolCall::Create { resource_type, .. } => format!(
            "{} CREATED:\n\n{}",
            resource_type.to_uppercase(),
            resource_lines(result)
        ),
        ToolCall::Update { resource_type, .. } => format!(
            "{} UPDATED:\n\n{}",
            resource_type.to_uppercase(),
            resource_lines(result)
        ),
        ToolCall::Delete { resource_type, id } => format!("Deleted {}/{}", resource_type, id),
    }
}

fn capabilities(resource_type: Option<&str>, result: &JsonValue) -> String {
    let Some(statement) = CapabilityStatement::from_value(result.clone()) else {
        return "FHIR server returned no capability statement.".to_string();
    };

    let software = statement
        .extra
        .get("software")
        .and_then(|s| s.get("name"))
        .and_then(JsonValue::as_str)
        .unwrap_or("FHIR Server");
    let version = statement.fhir_version.as_deref().unwrap_or("unknown");

    let mut text = format!("FHIR SERVER CAPABILITIES:\n\nSoftware: {software}\nFHIR Version: {version}");
    match resource_type {
        Some(rt) if statement.supports(rt) => {
            text.push_str(&format!(
                "\n{rt} interactions: {}",
                statement.interactions(rt).join(", ")
            ));
        }
        Some(rt) => text.push_str(&format!("\n{rt} is not supported by this server")),
        None => {
            let count: usize = statement.rest.iter().map(|r| r.resource.len()).sum();
            text.push_str(&format!("\nResource types: {count}"));
        }
    }
    text
}

fn search(resource_type: &str, result: &JsonValue) -> String {
    let Some(bundle) = Bundle::from_value(result.clone()) else {
        return format!("No {resource_type} resources found matching the search criteria.");
    };
    let resources: Vec<&JsonValue> = bundle.resources().collect();
    if resources.is_empty() {
        return format!("No {resource_type} resources found matching the search criteria.");
    }

    let total = bundle.total.map(|t| t as usize).unwrap_or(resources.len());
    if resource_type == "Patient" {
        let blocks: Vec<String> = resources
            .iter()
            .enumerate()
            .map(|(i, p)| format!("Patient {}:\n{}", i + 1, patient_lines(p, "  ")))
            .collect();
        return format!(
            "PATIENTS FOUND: {total} patient(s)\n\n{}",
            blocks.join("\n\n")
        );
    }

    let ids: Vec<&str> = resources
        .iter()
        .take(MAX_LISTED_IDS)
        .map(|r| str_field(r, "id").unwrap_or("unknown"))
        .collect();
    let more = if resources.len() > MAX_LISTED_IDS { ", ..." } else { "" };
    format!(
        "{} SEARCH RESULTS: Found {total} resource(s)\n\nResource IDs: {}{more}",
        resource_type.to_uppercase(),
        ids.join(", ")
    )
}

fn resource_lines(resource: &JsonValue) -> String {
    format!(
        "Resource ID: {}\nResource Type: {}",
        str_field(resource, "id").unwrap_or("unknown"),
        str_field(resource, "resourceType").unwrap_or("unknown")
    )
}

fn patient_lines(patient: &JsonValue, indent: &str) -> String {
    let name = display_name(patient);
    let address = first_address(patient);
    let phone = patient
        .get("telecom")
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
        .find(|t| str_field(t, "system") == Some("phone"))
        .and_then(|t| str_field(t, "value"));

    let lines = [
        format!("ID: {}", str_field(patient, "id").unwrap_or("unknown")),
        format!("Name: {}", if name.is_empty() { "Unknown" } else { name.as_str() }),
        format!("Gender: {}", str_field(patient, "gender").unwrap_or("Unknown")),
        format!(
            "Birth Date: {}",
            str_field(patient, "birthDate").unwrap_or("Unknown")
        ),
        format!("Phone: {}", phone.unwrap_or("Not provided")),
        format!(
            "Address: {}",
            if address.is_empty() {
                "Not provided"
            } else {
                address.as_str()
            }
        ),
    ];

    lines
        .iter()
        .map(|l| format!("{indent}{l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// All `given` names followed by `family`, across every HumanName
fn display_name(patient: &JsonValue) -> String {
    let mut parts = Vec::new();
    for name in patient
        .get("name")
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
    {
        parts.extend(strings(name.get("given")));
        if let Some(family) = str_field(name, "family") {
            parts.push(family);
        }
    }
    parts.join(" ")
}

fn first_address(patient: &JsonValue) -> String {
    let Some(addr) = patient
        .get("address")
        .and_then(JsonValue::as_array)
        .and_then(|a| a.first())
    else {
        return String::new();
    };

    let mut parts = strings(addr.get("line"));
    for key in ["city", "state", "postalCode"] {
        if let Some(v) = str_field(addr, key) {
            parts.push(v);
        }
    }
    parts.join(", ")
}

fn strings(value: Option<&JsonValue>) -> Vec<&str> {
    value
        .and_then(JsonValue::as_array)
        .map(|a| a.iter().filter_map(JsonValue::as_str).collect())
        .unwrap_or_default()
}

fn str_field<'a>(value: &'a JsonValue, key: &str) -> Option<&'a str> {
    value.get(key).and_then(JsonValue::as_str)
}
