//! Markdown documents: YAML frontmatter decoded into fields, body kept as text.

use super::dataset::{decode_yaml, is_timestamp};
use super::frontmatter::split_frontmatter;
use crate::ir::{Field, FieldSource, FieldType};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownDocument {
    /// Decoded frontmatter, empty when the block is absent or not a mapping
    pub frontmatter: Map<String, Value>,
    /// One optional field per top-level frontmatter key
    pub fields: Vec<Field>,
    pub body: String,
}

/// Parse a markdown document.
///
/// Fails only when the frontmatter block is present but is not valid YAML.
pub fn parse_markdown(text: &str) -> Result<MarkdownDocument, serde_yaml::Error> {
    let split = split_frontmatter(text);

    let frontmatter = match split.frontmatter {
        Some(raw) => match decode_yaml(raw)? {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        None => Map::new(),
    };

    // An empty key cannot name a field
    let fields = frontmatter
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| {
            Field::new(key.as_str(), field_type_of(value), false)
                .with_source(FieldSource::Markdown)
        })
        .collect();

    Ok(MarkdownDocument {
        frontmatter,
        fields,
        body: split.body.to_string(),
    })
}

fn field_type_of(value: &Value) -> FieldType {
    match value {
        // Timestamps decode to dates, not text
        Value::String(s) if is_timestamp(s) => FieldType::Unknown,
        Value::String(_) => FieldType::String,
        Value::Number(_) => FieldType::Number,
        Value::Bool(_) => FieldType::Boolean,
        _ => FieldType::Unknown,
    }
}
