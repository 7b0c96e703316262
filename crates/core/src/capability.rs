use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// FHIR CapabilityStatement resource (simplified)
///
/// Only the parts the bridge reads are typed; everything else rides along
/// in `extra` so the statement can be returned to the caller intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,
    #[serde(default)]
    pub rest: Vec<CapabilityRest>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// REST capability declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRest {
    pub mode: String,
    #[serde(default)]
    pub resource: Vec<CapabilityResource>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Resource-level capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interaction: Vec<CapabilityInteraction>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Supported interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityInteraction {
    pub code: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl CapabilityStatement {
    /// Parse an upstream `/metadata` body
    pub fn from_value(value: JsonValue) -> Option<Self> {
        let statement: CapabilityStatement = serde_json::from_value(value).ok()?;
        (statement.resource_type == "CapabilityStatement").then_some(statement)
    }

    /// Keep only the capability entries for `resource_type`
    pub fn narrowed_to(mut self, resource_type: &str) -> Self {
        for rest in &mut self.rest {
            rest.resource.retain(|r| r.resource_type == resource_type);
        }
        self
    }

    /// Whether any REST block declares `resource_type`
    pub fn supports(&self, resource_type: &str) -> bool {
        self.rest
            .iter()
            .flat_map(|r| &r.resource)
            .any(|r| r.resource_type == resource_type)
    }

    /// Interaction codes declared for `resource_type`, in declaration order
    pub fn interactions(&self, resource_type: &str) -> Vec<&str> {
        self.rest
            .iter()
            .flat_map(|r| &r.resource)
            .filter(|r| r.resource_type == resource_type)
            .flat_map(|r| r.interaction.iter().map(|i| i.code.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statement() -> CapabilityStatement {
        CapabilityStatement::from_value(json!({
            "resourceType": "CapabilityStatement",
            "status": "active",
            "fhirVersion": "4.0.1",
            "software": {"name": "HAPI FHIR Server"},
            "rest": [{
                "mode": "server",
                "resource": [
                    {"type": "Patient", "interaction": [{"code": "read"}, {"code": "search-type"}]},
                    {"type": "Observation", "interaction": [{"code": "read"}]}
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn narrowing_drops_other_types() {
        let narrowed = statement().narrowed_to("Patient");
        assert!(narrowed.supports("Patient"));
        assert!(!narrowed.supports("Observation"));
        assert_eq!(narrowed.interactions("Patient"), vec!["read", "search-type"]);

        let value = serde_json::to_value(&narrowed).unwrap();
        assert_eq!(value["software"]["name"], "HAPI FHIR Server");
        assert_eq!(value["rest"][0]["resource"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn narrowing_keeps_interaction_details() {
        let statement = CapabilityStatement::from_value(json!({
            "resourceType": "CapabilityStatement",
            "rest": [{
                "mode": "server",
                "resource": [
                    {"type": "Patient", "interaction": [
                        {"code": "read", "documentation": "Reads are audited", "extension": [{"url": "http://example.org/x", "valueBoolean": true}]}
                    ]},
                    {"type": "Observation", "interaction": [{"code": "read"}]}
                ]
            }]
        }))
        .unwrap();

        let value = serde_json::to_value(statement.narrowed_to("Patient")).unwrap();
        let interaction = &value["rest"][0]["resource"][0]["interaction"][0];
        assert_eq!(interaction["code"], "read");
        assert_eq!(interaction["documentation"], "Reads are audited");
        assert_eq!(interaction["extension"][0]["valueBoolean"], true);
    }

    #[test]
    fn rejects_other_resources() {
        assert!(CapabilityStatement::from_value(json!({"resourceType": "Bundle"})).is_none());
    }
}
