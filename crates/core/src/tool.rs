//! Tool catalog and argument validation
//!
//! Every MCP tool the bridge exposes is a variant of [`Tool`]. Each variant
//! declares its argument schema ([`ArgSpec`]); [`ToolCall::parse`] checks a
//! raw `arguments` object against that schema and produces a typed call, so
//! nothing downstream ever has to probe loose JSON.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value as JsonValue, json};

use crate::error::ToolError;

/// JSON type an argument must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Object,
}

impl ArgKind {
    fn json_type(self) -> &'static str {
        match self {
            ArgKind::String => "string",
            ArgKind::Object => "object",
        }
    }

    fn expected(self) -> &'static str {
        match self {
            ArgKind::String => "a string",
            ArgKind::Object => "an object",
        }
    }

    fn matches(self, value: &JsonValue) -> bool {
        match self {
            ArgKind::String => value.is_string(),
            ArgKind::Object => value.is_object(),
        }
    }
}

/// One entry of a tool's argument schema
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub description: &'static str,
}

const fn required(name: &'static str, kind: ArgKind, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind,
        required: true,
        description,
    }
}

const fn optional(name: &'static str, kind: ArgKind, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind,
        required: false,
        description,
    }
}

const TYPE_ARG: ArgSpec = required(
    "type",
    ArgKind::String,
    "FHIR resource type (e.g., 'Patient', 'Observation')",
);
const ID_ARG: ArgSpec = required("id", ArgKind::String, "Resource ID");
const RESOURCE_ARG: ArgSpec = required("resource", ArgKind::Object, "FHIR resource body");
const FORMAT_ARG: ArgSpec = optional(
    "format",
    ArgKind::String,
    "Result format: 'fhir' for raw FHIR JSON (default) or 'mcp' for text content",
);

/// The fixed tool catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    GetCapabilities,
    Search,
    Read,
    Create,
    Update,
    Delete,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::GetCapabilities,
        Tool::Search,
        Tool::Read,
        Tool::Create,
        Tool::Update,
        Tool::Delete,
    ];

    /// Wire name used in `tools/call`
    pub fn name(self) -> &'static str {
        match self {
            Tool::GetCapabilities => "get_capabilities",
            Tool::Search => "search",
            Tool::Read => "read",
            Tool::Create => "create",
            Tool::Update => "update",
            Tool::Delete => "delete",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::GetCapabilities => "Get FHIR server capabilities, optionally for one resource type",
            Tool::Search => "Search FHIR resources",
            Tool::Read => "Read a specific FHIR resource by ID",
            Tool::Create => "Create a new FHIR resource",
            Tool::Update => "Replace an existing FHIR resource by ID",
            Tool::Delete => "Delete a FHIR resource by ID",
        }
    }

    /// Argument schema, required arguments first
    pub fn arguments(self) -> &'static [ArgSpec] {
        const CAPABILITIES: [ArgSpec; 2] = [
            optional(
                "type",
                ArgKind::String,
                "Restrict the capability statement to this resource type",
            ),
            FORMAT_ARG,
        ];
        const SEARCH: [ArgSpec; 3] = [
            TYPE_ARG,
            required("searchParam", ArgKind::Object, "Search parameters"),
            FORMAT_ARG,
        ];
        const BY_ID: [ArgSpec; 3] = [TYPE_ARG, ID_ARG, FORMAT_ARG];
        const CREATE: [ArgSpec; 3] = [TYPE_ARG, RESOURCE_ARG, FORMAT_ARG];
        const UPDATE: [ArgSpec; 4] = [TYPE_ARG, ID_ARG, RESOURCE_ARG, FORMAT_ARG];

        match self {
            Tool::GetCapabilities => &CAPABILITIES,
            Tool::Search => &SEARCH,
            Tool::Read | Tool::Delete => &BY_ID,
            Tool::Create => &CREATE,
            Tool::Update => &UPDATE,
        }
    }

    /// JSON Schema advertised through `tools/list`
    pub fn input_schema(self) -> JsonValue {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in self.arguments() {
            properties.insert(
                arg.name.to_string(),
                json!({ "type": arg.kind.json_type(), "description": arg.description }),
            );
            if arg.required {
                required.push(arg.name);
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Whether the tool changes upstream state
    pub fn is_mutation(self) -> bool {
        matches!(self, Tool::Create | Tool::Update | Tool::Delete)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::from_name(s).ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// Shape of a successful result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Raw FHIR JSON
    #[default]
    Fhir,
    /// MCP `content` blocks with a text summary
    Mcp,
}

/// A validated tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GetCapabilities {
        resource_type: Option<String>,
    },
    Search {
        resource_type: String,
        params: Map<String, JsonValue>,
    },
    Read {
        resource_type: String,
        id: String,
    },
    Create {
        resource_type: String,
        resource: Map<String, JsonValue>,
    },
    Update {
        resource_type: String,
        id: String,
        resource: Map<String, JsonValue>,
    },
    Delete {
        resource_type: String,
        id: String,
    },
}

/// A validated call plus the requested output format
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub call: ToolCall,
    pub format: OutputFormat,
}

impl ToolCall {
    /// Validate `arguments` for the tool called `name`.
    ///
    /// Unknown names fail with [`ToolError::UnknownTool`]; a missing or
    /// mistyped argument fails with an error naming that argument.
    pub fn parse(name: &str, arguments: &JsonValue) -> Result<ToolInvocation, ToolError> {
        let tool: Tool = name.parse()?;

        let empty = Map::new();
        let args = match arguments {
            JsonValue::Object(map) => map,
            JsonValue::Null => &empty,
            _ => return Err(ToolError::ArgumentsNotObject),
        };

        for spec in tool.arguments() {
            match args.get(spec.name) {
                None | Some(JsonValue::Null) if spec.required => {
                    return Err(ToolError::MissingArgument(spec.name));
                }
                None | Some(JsonValue::Null) => {}
                Some(value) if !spec.kind.matches(value) => {
                    return Err(ToolError::InvalidArgument {
                        name: spec.name,
                        expected: spec.kind.expected(),
                    });
                }
                Some(_) => {}
            }
        }

        let format = match args.get("format").and_then(JsonValue::as_str) {
            None | Some("fhir") => OutputFormat::Fhir,
            Some("mcp") => OutputFormat::Mcp,
            Some(_) => {
                return Err(ToolError::InvalidArgument {
                    name: "format",
                    expected: "'fhir' or 'mcp'",
                });
            }
        };

        let call = match tool {
            Tool::GetCapabilities => ToolCall::GetCapabilities {
                resource_type: args
                    .get("type")
                    .and_then(JsonValue::as_str)
                    .map(resource_type)
                    .transpose()?,
            },
            Tool::Search => ToolCall::Search {
                resource_type: resource_type(str_arg(args, "type"))?,
                params: object_arg(args, "searchParam"),
            },
            Tool::Read => ToolCall::Read {
                resource_type: resource_type(str_arg(args, "type"))?,
                id: resource_id(str_arg(args, "id"))?,
            },
            Tool::Create => {
                let resource_type = resource_type(str_arg(args, "type"))?;
                let resource = body_for(&resource_type, None, object_arg(args, "resource"))?;
                ToolCall::Create {
                    resource_type,
                    resource,
                }
            }
            Tool::Update => {
                let resource_type = resource_type(str_arg(args, "type"))?;
                let id = resource_id(str_arg(args, "id"))?;
                let resource = body_for(&resource_type, Some(&id), object_arg(args, "resource"))?;
                ToolCall::Update {
                    resource_type,
                    id,
                    resource,
                }
            }
            Tool::Delete => ToolCall::Delete {
                resource_type: resource_type(str_arg(args, "type"))?,
                id: resource_id(str_arg(args, "id"))?,
            },
        };

        Ok(ToolInvocation { call, format })
    }

    pub fn tool(&self) -> Tool {
        match self {
            ToolCall::GetCapabilities { .. } => Tool::GetCapabilities,
            ToolCall::Search { .. } => Tool::Search,
            ToolCall::Read { .. } => Tool::Read,
            ToolCall::Create { .. } => Tool::Create,
            ToolCall::Update { .. } => Tool::Update,
            ToolCall::Delete { .. } => Tool::Delete,
        }
    }

    pub fn resource_type(&self) -> Option<&str> {
        match self {
            ToolCall::GetCapabilities { resource_type } => resource_type.as_deref(),
            ToolCall::Search { resource_type, .. }
            | ToolCall::Read { resource_type, .. }
            | ToolCall::Create { resource_type, .. }
            | ToolCall::Update { resource_type, .. }
            | ToolCall::Delete { resource_type, .. } => Some(resource_type),
        }
    }
}

// Only called after the schema pass, so the key is known to hold a string.
fn str_arg<'a>(args: &'a Map<String, JsonValue>, name: &str) -> &'a str {
    args.get(name).and_then(JsonValue::as_str).unwrap_or_default()
}

fn object_arg(args: &Map<String, JsonValue>, name: &str) -> Map<String, JsonValue> {
    args.get(name)
        .and_then(JsonValue::as_object)
        .cloned()
        .unwrap_or_default()
}

/// FHIR resource type names are ASCII letters with a leading capital
fn resource_type(value: &str) -> Result<String, ToolError> {
    let valid = value.len() <= 64
        && value.starts_with(|c: char| c.is_ascii_uppercase())
        && value.chars().all(|c| c.is_ascii_alphabetic());

    if valid {
        Ok(value.to_string())
    } else {
        Err(ToolError::InvalidArgument {
            name: "type",
            expected: "a FHIR resource type name",
        })
    }
}

/// FHIR ids: 1-64 characters from `[A-Za-z0-9-.]`
fn resource_id(value: &str) -> Result<String, ToolError> {
    let valid = (1..=64).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');

    if valid {
        Ok(value.to_string())
    } else {
        Err(ToolError::InvalidArgument {
            name: "id",
            expected: "a FHIR id ([A-Za-z0-9-.], at most 64 characters)",
        })
    }
}

/// Check a resource body against the addressed type/id, filling them in when absent
fn body_for(
    resource_type: &str,
    id: Option<&str>,
    mut resource: Map<String, JsonValue>,
) -> Result<Map<String, JsonValue>, ToolError> {
    match resource.get("resourceType") {
        None => {
            resource.insert(
                "resourceType".to_string(),
                JsonValue::String(resource_type.to_string()),
            );
        }
        Some(JsonValue::String(rt)) if rt == resource_type => {}
        Some(_) => {
            return Err(ToolError::InvalidArgument {
                name: "resource",
                expected: "a resourceType matching 'type'",
            });
        }
    }

    if let Some(id) = id {
        match resource.get("id") {
            None => {
                resource.insert("id".to_string(), JsonValue::String(id.to_string()));
            }
            Some(JsonValue::String(existing)) if existing == id => {}
            Some(_) => {
                return Err(ToolError::InvalidArgument {
                    name: "resource",
                    expected: "an id matching 'id'",
                });
            }
        }
    }

    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str, args: JsonValue) -> Result<ToolInvocation, ToolError> {
        ToolCall::parse(name, &args)
    }

    #[test]
    fn every_tool_round_trips_its_name() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("get_patient_comprehensive_data"), None);
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = parse("drop_tables", json!({})).unwrap_err();
        assert_eq!(err, ToolError::UnknownTool("drop_tables".to_string()));
    }

    #[test]
    fn read_requires_type_and_id() {
        assert_eq!(
            parse("read", json!({"id": "1"})).unwrap_err(),
            ToolError::MissingArgument("type")
        );
        assert_eq!(
            parse("read", json!({"type": "Patient"})).unwrap_err(),
            ToolError::MissingArgument("id")
        );
        assert_eq!(
            parse("read", json!({"type": "Patient", "id": null})).unwrap_err(),
            ToolError::MissingArgument("id")
        );
    }

    #[test]
    fn wrong_json_types_name_the_field() {
        let err = parse("read", json!({"type": "Patient", "id": 597173})).unwrap_err();
        assert_eq!(err.field(), Some("id"));

        let err = parse("search", json!({"type": "Patient", "searchParam": "name=Doe"})).unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArgument {
                name: "searchParam",
                expected: "an object"
            }
        );
    }

    #[test]
    fn path_injection_is_rejected() {
        let err = parse("read", json!({"type": "Patient", "id": "1/_history"})).unwrap_err();
        assert_eq!(err.field(), Some("id"));

        let err = parse("read", json!({"type": "../metadata", "id": "1"})).unwrap_err();
        assert_eq!(err.field(), Some("type"));
    }

    #[test]
    fn read_produces_typed_call() {
        let inv = parse("read", json!({"type": "Patient", "id": "597173"})).unwrap();
        assert_eq!(
            inv.call,
            ToolCall::Read {
                resource_type: "Patient".to_string(),
                id: "597173".to_string()
            }
        );
        assert_eq!(inv.format, OutputFormat::Fhir);
    }

    #[test]
    fn format_argument() {
        let inv = parse("read", json!({"type": "Patient", "id": "1", "format": "mcp"})).unwrap();
        assert_eq!(inv.format, OutputFormat::Mcp);

        let err = parse("read", json!({"type": "Patient", "id": "1", "format": "xml"})).unwrap_err();
        assert_eq!(err.field(), Some("format"));
    }

    #[test]
    fn capabilities_takes_no_required_arguments() {
        let inv = parse("get_capabilities", JsonValue::Null).unwrap();
        assert_eq!(inv.call, ToolCall::GetCapabilities { resource_type: None });

        let inv = parse("get_capabilities", json!({"type": "Observation"})).unwrap();
        assert_eq!(inv.call.resource_type(), Some("Observation"));
    }

    #[test]
    fn create_fills_missing_resource_type() {
        let inv = parse(
            "create",
            json!({"type": "Patient", "resource": {"gender": "female"}}),
        )
        .unwrap();
        let ToolCall::Create { resource, .. } = inv.call else {
            panic!("expected create");
        };
        assert_eq!(resource["resourceType"], "Patient");
        assert_eq!(resource["gender"], "female");
    }

    #[test]
    fn create_rejects_mismatched_resource_type() {
        let err = parse(
            "create",
            json!({"type": "Patient", "resource": {"resourceType": "Observation"}}),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("resource"));
    }

    #[test]
    fn update_checks_body_id() {
        let inv = parse(
            "update",
            json!({"type": "Patient", "id": "42", "resource": {"resourceType": "Patient"}}),
        )
        .unwrap();
        let ToolCall::Update { resource, .. } = inv.call else {
            panic!("expected update");
        };
        assert_eq!(resource["id"], "42");

        let err = parse(
            "update",
            json!({"type": "Patient", "id": "42", "resource": {"id": "43"}}),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("resource"));
    }

    #[test]
    fn arguments_must_be_an_object() {
        assert_eq!(
            parse("read", json!(["Patient", "1"])).unwrap_err(),
            ToolError::ArgumentsNotObject
        );
    }

    #[test]
    fn schema_lists_required_fields() {
        let schema = Tool::Update.input_schema();
        assert_eq!(schema["required"], json!(["type", "id", "resource"]));
        assert_eq!(schema["properties"]["resource"]["type"], "object");
        assert_eq!(schema["properties"]["format"]["type"], "string");
    }
}
