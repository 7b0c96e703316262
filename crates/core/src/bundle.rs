use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// FHIR Bundle types
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    #[default]
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
}

/// FHIR Bundle resource (simplified for search responses).
///
/// Fields the bridge does not inspect are kept in `extra` so an upstream
/// bundle passes through without losing `id`, `meta` or `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type", default)]
    pub bundle_type: BundleType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<BundleLink>,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Bundle {
    /// Create a searchset bundle
    pub fn searchset(total: u32, entry: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            bundle_type: BundleType::Searchset,
            total: Some(total),
            link: Vec::new(),
            entry,
            extra: Map::new(),
        }
    }

    /// Parse an upstream body, accepting only `resourceType: "Bundle"`
    pub fn from_value(value: JsonValue) -> Option<Self> {
        let bundle: Bundle = serde_json::from_value(value).ok()?;
        (bundle.resource_type == "Bundle").then_some(bundle)
    }

    /// Fill `total` from the entry count when the server omitted it
    pub fn with_total(mut self) -> Self {
        if self.total.is_none() {
            self.total = Some(u32::try_from(self.entry.len()).unwrap_or(u32::MAX));
        }
        self
    }

    /// Resources carried by the entries, skipping entries without one
    pub fn resources(&self) -> impl Iterator<Item = &JsonValue> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }
}

/// Bundle link for pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Entry in a bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl BundleEntry {
    pub fn new(full_url: Option<String>, resource: JsonValue) -> Self {
        Self {
            full_url,
            resource: Some(resource),
            extra: Map::new(),
        }
    }
}
