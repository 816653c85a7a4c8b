//! Shallow extraction of props and child components from a component source file.
//!
//! This is pattern matching, not a grammar. It recognizes two prop declaration
//! forms in the frontmatter script:
//!
//! ```text
//! interface Props { title: string; count?: number }
//! const { title = "Hello", published = false } = Astro.props;
//! ```
//!
//! and capitalized opening tags (`<Hero />`) in the markup after it. Anything it
//! does not recognize is skipped; parsing never fails.

use super::frontmatter::split_frontmatter;
use crate::ir::{Field, FieldSource, FieldType};
use crate::patterns::classifier;
use indexmap::IndexSet;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

static PROPS_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\b(?:interface\s+Props\s*|type\s+Props\s*=\s*)\{(.*?)\}").unwrap()
});
static PROP_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:readonly\s+)?([A-Za-z_$][\w$]*)\s*(\?)?\s*:\s*(.+?)\s*[;,]?\s*$").unwrap()
});
static DESTRUCTURE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bconst\s*\{").unwrap());
static PROPS_SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let source = regex::escape(&classifier().props_source);
    Regex::new(&format!(r"^\s*=\s*{}\b", source)).unwrap()
});
static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([A-Za-z_$][\w$]*)\s*(?:=\s*(.+))?$").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([A-Z][A-Za-z0-9_]*)").unwrap());

/// What a component source file declares and uses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentSource {
    pub exported_props: Vec<Field>,
    /// Capitalized tag names in first-seen order, without repeats
    pub used_components: Vec<String>,
}

pub fn parse_component(text: &str) -> ComponentSource {
    let split = split_frontmatter(text);
    let script = split.frontmatter.unwrap_or("");

    // Interface form first so it wins on duplicate keys
    let mut seen = HashSet::new();
    let exported_props = extract_props_interface(script)
        .into_iter()
        .chain(extract_props_destructuring(script))
        .filter(|field| !field.key.is_empty() && seen.insert(field.key.clone()))
        .collect();

    ComponentSource {
        exported_props,
        used_components: extract_used_components(split.body),
    }
}

fn extract_props_interface(script: &str) -> Vec<Field> {
    let Some(caps) = PROPS_BLOCK_RE.captures(script) else {
        return Vec::new();
    };

    caps[1]
        .lines()
        .map(str::trim)
        .filter(|l| !l.starts_with("//") && !l.starts_with("/*") && !l.starts_with('*'))
        // Several members may share one line
        .flat_map(|line| line.split(';'))
        .map(str::trim)
        .filter(|member| !member.is_empty())
        .filter_map(|line| {
            let m = PROP_LINE_RE.captures(line)?;
            let raw_type = m[3].trim();
            Some(
                Field::new(&m[1], map_ts_type(raw_type), m.get(2).is_none())
                    .with_raw_type(raw_type)
                    .with_source(FieldSource::Component),
            )
        })
        .collect()
}

fn extract_props_destructuring(script: &str) -> Vec<Field> {
    let Some(inside) = find_props_destructuring(script) else {
        return Vec::new();
    };

    split_top_level(inside)
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let m = ENTRY_RE.captures(part)?;
            let field = match m.get(2) {
                None => Field::new(&m[1], FieldType::Unknown, false),
                Some(raw) => {
                    let (field_type, default) = parse_literal(raw.as_str());
                    Field::new(&m[1], field_type, false).with_default(default)
                }
            };
            Some(field.with_source(FieldSource::Component))
        })
        .collect()
}

/// Locate the body of `const { ... } = <props source>`, matching braces so
/// defaults like `{}` or `{ a: 1 }` stay inside the block
fn find_props_destructuring(script: &str) -> Option<&str> {
    DESTRUCTURE_START_RE.find_iter(script).find_map(|m| {
        let open = m.end();
        let close = open + matching_brace(&script[open..])?;
        PROPS_SOURCE_RE
            .is_match(&script[close + 1..])
            .then(|| &script[open..close])
    })
}

/// Byte offset of the `}` closing an already-opened brace, honoring quotes
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' | '[' | '(' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested in brackets or quotes
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn extract_used_components(markup: &str) -> Vec<String> {
    let names: IndexSet<&str> = TAG_RE
        .captures_iter(markup)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    names.into_iter().map(String::from).collect()
}

fn map_ts_type(raw: &str) -> FieldType {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.as_str() {
        "string" => FieldType::String,
        "number" => FieldType::Number,
        "boolean" => FieldType::Boolean,
        _ => FieldType::Unknown,
    }
}

/// Infer a default's type and value from its source text
fn parse_literal(raw: &str) -> (FieldType, Value) {
    let v = raw.trim().trim_end_matches(',').trim();

    if let Some(inner) = unquote(v) {
        return (FieldType::String, Value::String(inner.to_string()));
    }
    match v {
        "true" => return (FieldType::Boolean, Value::Bool(true)),
        "false" => return (FieldType::Boolean, Value::Bool(false)),
        "null" => return (FieldType::Unknown, Value::Null),
        _ => {}
    }
    if NUMBER_RE.is_match(v) {
        if let Some(n) = parse_number(v) {
            return (FieldType::Number, n);
        }
    }

    // Unrecognized expression: keep its text
    (FieldType::Unknown, Value::String(v.to_string()))
}

fn unquote(v: &str) -> Option<&str> {
    let first = v.chars().next()?;
    if !matches!(first, '"' | '\'' | '`') || v.len() < 2 || !v.ends_with(first) {
        return None;
    }
    Some(&v[1..v.len() - 1])
}

/// Integral values are emitted as integers, so `1.0` becomes `1`
fn parse_number(v: &str) -> Option<Value> {
    if let Ok(i) = v.parse::<i64>() {
        return Some(Value::from(i));
    }
    let f = v.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Some(Value::from(f as i64));
    }
    serde_json::Number::from_f64(f).map(Value::Number)
}
