//! Upstream FHIR REST request model

use std::fmt;

use serde_json::{Map, Value as JsonValue};

use crate::error::ToolError;
use crate::tool::ToolCall;

/// HTTP verb of a FHIR interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FhirMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl FhirMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            FhirMethod::Get => "GET",
            FhirMethod::Post => "POST",
            FhirMethod::Put => "PUT",
            FhirMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for FhirMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One FHIR REST call, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct FhirRequest {
    pub method: FhirMethod,
    /// Path starting with `/`, e.g. `/Patient/597173`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl FhirRequest {
    fn new(method: FhirMethod, path: String) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    /// Map a validated tool call onto its FHIR interaction
    pub fn from_call(call: &ToolCall) -> Result<Self, ToolError> {
        let request = match call {
            ToolCall::GetCapabilities { .. } => Self::new(FhirMethod::Get, "/metadata".to_string()),
            ToolCall::Search {
                resource_type,
                params,
            } => Self {
                query: search_query(params)?,
                ..Self::new(FhirMethod::Get, format!("/{}", resource_type))
            },
            ToolCall::Read { resource_type, id } => {
                Self::new(FhirMethod::Get, format!("/{}/{}", resource_type, id))
            }
            ToolCall::Create {
                resource_type,
                resource,
            } => Self {
                body: Some(JsonValue::Object(resource.clone())),
                ..Self::new(FhirMethod::Post, format!("/{}", resource_type))
            },
            ToolCall::Update {
                resource_type,
                id,
                resource,
            } => Self {
                body: Some(JsonValue::Object(resource.clone())),
                ..Self::new(FhirMethod::Put, format!("/{}/{}", resource_type, id))
            },
            ToolCall::Delete { resource_type, id } => {
                Self::new(FhirMethod::Delete, format!("/{}/{}", resource_type, id))
            }
        };

        Ok(request)
    }
}

/// Flatten `searchParam` into query pairs.
///
/// Arrays repeat the key (FHIR AND semantics), `null` drops the parameter,
/// nested objects have no query-string form and are rejected.
fn search_query(params: &Map<String, JsonValue>) -> Result<Vec<(String, String)>, ToolError> {
    let mut query = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            JsonValue::Array(items) => {
                for item in items {
                    query.push((key.clone(), scalar(item)?));
                }
            }
            JsonValue::Null => {}
            other => query.push((key.clone(), scalar(other)?)),
        }
    }
    Ok(query)
}

fn scalar(value: &JsonValue) -> Result<String, ToolError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        _ => Err(ToolError::InvalidArgument {
            name: "searchParam",
            expected: "string, number or boolean values",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_for(name: &str, args: JsonValue) -> FhirRequest {
        let inv = ToolCall::parse(name, &args).unwrap();
        FhirRequest::from_call(&inv.call).unwrap()
    }

    #[test]
    fn verbs_and_paths() {
        let cases = [
            ("get_capabilities", json!({}), FhirMethod::Get, "/metadata"),
            (
                "get_capabilities",
                json!({"type": "Patient"}),
                FhirMethod::Get,
                "/metadata",
            ),
            (
                "search",
                json!({"type": "Observation", "searchParam": {}}),
                FhirMethod::Get,
                "/Observation",
            ),
            (
                "read",
                json!({"type": "Patient", "id": "597173"}),
                FhirMethod::Get,
                "/Patient/597173",
            ),
            (
                "create",
                json!({"type": "Patient", "resource": {}}),
                FhirMethod::Post,
                "/Patient",
            ),
            (
                "update",
                json!({"type": "Patient", "id": "7", "resource": {}}),
                FhirMethod::Put,
                "/Patient/7",
            ),
            (
                "delete",
                json!({"type": "Patient", "id": "7"}),
                FhirMethod::Delete,
                "/Patient/7",
            ),
        ];

        for (tool, args, method, path) in cases {
            let req = request_for(tool, args);
            assert_eq!(req.method, method, "{tool}");
            assert_eq!(req.path, path, "{tool}");
        }
    }

    #[test]
    fn only_writes_carry_a_body() {
        let req = request_for("read", json!({"type": "Patient", "id": "1"}));
        assert!(req.body.is_none());

        let req = request_for(
            "create",
            json!({"type": "Patient", "resource": {"gender": "male"}}),
        );
        assert_eq!(
            req.body,
            Some(json!({"resourceType": "Patient", "gender": "male"}))
        );
    }

    #[test]
    fn search_params_flatten() {
        let req = request_for(
            "search",
            json!({
                "type": "Patient",
                "searchParam": {
                    "family": "Doe",
                    "_count": 10,
                    "active": true,
                    "birthdate": ["ge1990-01-01", "lt2000-01-01"],
                    "gender": null
                }
            }),
        );

        let mut query = req.query.clone();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("_count".to_string(), "10".to_string()),
                ("active".to_string(), "true".to_string()),
                ("birthdate".to_string(), "ge1990-01-01".to_string()),
                ("birthdate".to_string(), "lt2000-01-01".to_string()),
                ("family".to_string(), "Doe".to_string()),
            ]
        );
    }

    #[test]
    fn nested_search_values_are_rejected() {
        let inv = ToolCall::parse(
            "search",
            &json!({"type": "Patient", "searchParam": {"name": {"family": "Doe"}}}),
        )
        .unwrap();

        let err = FhirRequest::from_call(&inv.call).unwrap_err();
        assert_eq!(err.field(), Some("searchParam"));
    }
}
