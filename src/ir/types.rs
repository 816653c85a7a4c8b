//! IR data model. Field names follow the persisted JSON layout (camelCase).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The only schema version this crate produces or accepts
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Unknown,
}

/// Which parser produced a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSource {
    #[serde(rename = "astro")]
    Component,
    #[serde(rename = "markdown")]
    Markdown,
    #[serde(rename = "yaml")]
    Dataset,
}

/// Parser that produced a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "astro")]
    Component,
    #[serde(rename = "markdown")]
    Markdown,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Component => "astro",
            SourceType::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    /// Literal default. `Some(Value::Null)` is an explicit `null` default.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FieldSource>,
}

// A key that is present always yields Some, so an explicit null survives a round trip.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Field {
    pub fn new(key: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Field {
            key: key.into(),
            field_type,
            required,
            default: None,
            raw_type: None,
            source: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_raw_type(mut self, raw_type: impl Into<String>) -> Self {
        self.raw_type = Some(raw_type.into());
        self
    }

    pub fn with_source(mut self, source: FieldSource) -> Self {
        self.source = Some(source);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel {
    pub id: String,
    pub route: String,
    pub file: String,
    /// Best-effort paths of components referenced directly in the markup.
    /// These are naming-convention guesses and may not exist.
    pub components: Vec<String>,
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentModel {
    pub id: String,
    pub file: String,
    pub exported_props: Vec<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetModel {
    pub id: String,
    pub file: String,
    pub format: DatasetFormat,
    pub data: Value,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub root: String,
    pub name: String,
}

/// Full IR snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub schema_version: u32,
    /// Milliseconds since the Unix epoch
    pub generated_at: i64,
    pub project: Project,
    pub pages: Vec<PageModel>,
    /// Keyed by project-relative path, in traversal order
    pub components_index: IndexMap<String, ComponentModel>,
    pub datasets: Vec<DatasetModel>,
}

/// Relative path to content fingerprint for every tracked file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: u32,
    pub generated_at: i64,
    pub project: Project,
    pub files: IndexMap<String, String>,
}

/// A flattened, human-readable scan or validation defect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanError {
    pub message: String,
}

impl ScanError {
    pub fn new(message: impl Into<String>) -> Self {
        ScanError {
            message: message.into(),
        }
    }
}

/// Layout of errors.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub errors: Vec<ScanError>,
}
