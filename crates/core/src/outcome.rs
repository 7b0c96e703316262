use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Severity of the issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl IssueSeverity {
    pub fn is_failure(&self) -> bool {
        matches!(self, IssueSeverity::Fatal | IssueSeverity::Error)
    }
}

/// A single issue within an OperationOutcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    /// Issue type code; kept as text since servers may send codes outside R4
    #[serde(default)]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl OperationOutcomeIssue {
    /// `diagnostics`, falling back to `details.text`
    fn text(&self) -> Option<&str> {
        self.diagnostics.as_deref().or_else(|| {
            self.details
                .as_ref()
                .and_then(|d| d.get("text"))
                .and_then(JsonValue::as_str)
        })
    }
}

/// FHIR OperationOutcome resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

impl OperationOutcome {
    /// Informational outcome for an operation that succeeded without a body
    pub fn success(message: &str) -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            issue: vec![OperationOutcomeIssue {
                severity: IssueSeverity::Information,
                code: "informational".to_string(),
                diagnostics: Some(message.to_string()),
                details: None,
            }],
        }
    }

    /// Human-readable text of an upstream error body, if it is an
    /// OperationOutcome. Fatal and error issues are preferred over warnings.
    pub fn diagnostics_of(body: &JsonValue) -> Option<String> {
        let outcome: OperationOutcome = serde_json::from_value(body.clone()).ok()?;
        if outcome.resource_type != "OperationOutcome" {
            return None;
        }

        let (severe, other): (Vec<_>, Vec<_>) = outcome
            .issue
            .iter()
            .partition(|issue| issue.severity.is_failure());
        severe
            .into_iter()
            .chain(other)
            .find_map(OperationOutcomeIssue::text)
            .map(str::to_string)
    }
}
