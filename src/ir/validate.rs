//! Structural validation of a Build document.
//!
//! Rules run against the untyped JSON form so a persisted or hand-edited
//! build.json can be checked with the same code the scanner uses. Every check
//! runs independently; one call reports every defect it can find.

use super::types::{Build, SourceType, SCHEMA_VERSION};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Validate a typed Build by way of its JSON form
pub fn validate_build(build: &Build) -> Vec<String> {
    match serde_json::to_value(build) {
        Ok(value) => validate(&value),
        Err(err) => vec![format!("Build could not be serialized: {}", err)],
    }
}

/// Validate a Build document, returning one message per defect
pub fn validate(build: &Value) -> Vec<String> {
    let Some(build) = build.as_object() else {
        return vec!["Build is not an object.".to_string()];
    };

    let mut errors = Vec::new();

    match build.get("schemaVersion") {
        Some(v) if v.as_u64() == Some(u64::from(SCHEMA_VERSION)) => {}
        Some(v) => errors.push(format!("Unsupported schemaVersion: {}", v)),
        None => errors.push("Unsupported schemaVersion: missing".to_string()),
    }

    let project = build.get("project");
    if !non_empty_str(project.and_then(|p| p.get("root"))) {
        errors.push("Missing project.root".to_string());
    }
    if !non_empty_str(project.and_then(|p| p.get("name"))) {
        errors.push("Missing project.name".to_string());
    }

    match build.get("pages").and_then(Value::as_array) {
        Some(pages) => {
            for page in pages {
                errors.extend(validate_page(page));
            }
        }
        None => errors.push("pages must be an array".to_string()),
    }

    match build.get("componentsIndex").and_then(Value::as_object) {
        Some(index) => {
            for (key, component) in index {
                errors.extend(validate_component(key, component));
            }
        }
        None => errors.push("componentsIndex must be an object".to_string()),
    }

    match build.get("datasets").and_then(Value::as_array) {
        Some(datasets) => {
            for dataset in datasets {
                errors.extend(validate_dataset(dataset));
            }
        }
        None => errors.push("datasets must be an array".to_string()),
    }

    errors
}

fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Display label for an entity's id, `?` when it has none
fn label(entity: Option<&Map<String, Value>>) -> String {
    entity
        .and_then(|e| e.get("id"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("?")
        .to_string()
}

fn validate_page(page: &Value) -> Vec<String> {
    let mut e = Vec::new();
    let obj = page.as_object();
    let id = label(obj);
    let get = |k: &str| obj.and_then(|o| o.get(k));

    if obj.is_none() {
        e.push("Page is not an object".to_string());
        return e;
    }
    if !non_empty_str(get("id")) {
        e.push("Page missing id".to_string());
    }
    if !non_empty_str(get("file")) {
        e.push(format!("Page({}) missing file", id));
    }
    if !non_empty_str(get("route")) {
        e.push(format!("Page({}) missing route", id));
    }

    if let Some(source_type) = get("sourceType").filter(|v| !v.is_null()) {
        let known = [SourceType::Component.as_str(), SourceType::Markdown.as_str()];
        if !source_type.as_str().is_some_and(|s| known.contains(&s)) {
            e.push(format!("Page({}) invalid sourceType: {}", id, source_type));
        }
    }

    match get("fields").and_then(Value::as_array) {
        Some(fields) => e.extend(validate_fields(&format!("Page({})", id), fields)),
        None => e.push(format!("Page({}) fields must be an array", id)),
    }
    e
}

fn validate_component(key: &str, component: &Value) -> Vec<String> {
    let mut e = Vec::new();
    let Some(obj) = component.as_object() else {
        e.push(format!("Component({}) is not an object", key));
        return e;
    };

    if obj.get("file").and_then(Value::as_str) != Some(key) {
        e.push(format!("Component({}) file does not match its index key", key));
    }
    match obj.get("exportedProps").and_then(Value::as_array) {
        Some(fields) => e.extend(validate_fields(&format!("Component({})", key), fields)),
        None => e.push(format!("Component({}) exportedProps must be an array", key)),
    }
    e
}

fn validate_fields(owner: &str, fields: &[Value]) -> Vec<String> {
    let mut e = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        let f = field.as_object();
        let get = |k: &str| f.and_then(|o| o.get(k));
        let key = get("key").and_then(Value::as_str).filter(|s| !s.is_empty());
        let key_label = key.unwrap_or("?");

        match key {
            Some(key) => {
                if !seen.insert(key) {
                    e.push(format!("{} duplicate field key: {}", owner, key));
                }
            }
            None => e.push(format!("{} field missing key", owner)),
        }
        if !non_empty_str(get("type")) {
            e.push(format!("{} field({}) missing type", owner, key_label));
        }
        if !get("required").is_some_and(Value::is_boolean) {
            e.push(format!(
                "{} field({}) required must be boolean",
                owner, key_label
            ));
        }
    }
    e
}

fn validate_dataset(dataset: &Value) -> Vec<String> {
    let mut e = Vec::new();
    let Some(obj) = dataset.as_object() else {
        e.push("Dataset is not an object".to_string());
        return e;
    };
    let id = label(Some(obj));

    if !non_empty_str(obj.get("id")) {
        e.push("Dataset missing id".to_string());
    }
    if !non_empty_str(obj.get("file")) {
        e.push(format!("Dataset({}) missing file", id));
    }
    // `null` is valid data (an empty document); only absence is a defect
    if !obj.contains_key("data") {
        e.push(format!("Dataset({}) missing data", id));
    }
    match obj.get("format") {
        Some(Value::String(f)) if f == "yaml" => {}
        Some(other) => e.push(format!("Dataset({}) unsupported format: {}", id, other)),
        None => e.push(format!("Dataset({}) unsupported format: missing", id)),
    }
    if !non_empty_str(obj.get("hash")) {
        e.push(format!("Dataset({}) missing hash", id));
    }
    e
}
