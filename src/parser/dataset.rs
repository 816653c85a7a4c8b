//! YAML decoding shared by the dataset and markdown parsers.

use chrono::{Duration, NaiveDate};
use regex::{Captures, Regex};
use serde_json::Value;
use serde_yaml::Value as YamlValue;
use std::sync::LazyLock;

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9][0-9]?)-([0-9][0-9]?)(?:(?:[Tt]|[ \t]+)([0-9][0-9]?):([0-9][0-9]):([0-9][0-9])(?:\.([0-9]*))?(?:[ \t]*(Z|([-+])([0-9][0-9]?)(?::([0-9][0-9]))?))?)?$",
    )
    .unwrap()
});

/// Decode one YAML document into a JSON-compatible tree.
///
/// Tags are dropped in favor of the tagged value, merge keys are applied,
/// non-string keys are rendered to text and non-finite floats become `null`.
/// YAML 1.1 timestamps (`2024-01-01`, `2024-01-01 10:00:00 +02:00`) become
/// UTC ISO-8601 strings with millisecond precision. An empty document decodes
/// to `null`.
pub fn decode_yaml(text: &str) -> Result<Value, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    let mut doc: YamlValue = serde_yaml::from_str(text)?;
    doc.apply_merge()?;
    Ok(to_json(doc))
}

/// Decode a whole dataset file. The result is returned as-is; datasets carry
/// no field inference.
pub fn parse_dataset(text: &str) -> Result<Value, serde_yaml::Error> {
    decode_yaml(text)
}

fn to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => number_to_json(&n),
        YamlValue::String(s) => Value::String(timestamp_to_iso(&s).unwrap_or(s)),
        YamlValue::Sequence(seq) => Value::Array(seq.into_iter().map(to_json).collect()),
        YamlValue::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (key_text(k), to_json(v)))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => {
            let inner = *tagged;
            to_json(inner.value)
        }
    }
}

/// Date-only values need two-digit month and day; date-times accept one
fn timestamp_captures(text: &str) -> Option<Captures<'_>> {
    let caps = TIMESTAMP_RE.captures(text)?;
    let date_only = caps.get(4).is_none();
    if date_only && (caps[2].len() != 2 || caps[3].len() != 2) {
        return None;
    }
    Some(caps)
}

/// True when `text` has the shape of a YAML 1.1 timestamp
pub fn is_timestamp(text: &str) -> bool {
    timestamp_captures(text).is_some()
}

/// Normalize a YAML 1.1 timestamp to `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Date-only values are midnight UTC; a missing zone on a date-time is UTC.
/// Returns `None` for text that is not a timestamp or names an impossible date.
fn timestamp_to_iso(text: &str) -> Option<String> {
    let caps = timestamp_captures(text)?;
    let num = |i: usize| -> Option<u32> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let date = NaiveDate::from_ymd_opt(caps[1].parse().ok()?, num(2)?, num(3)?)?;
    let millis = caps
        .get(7)
        .map(|m| format!("{:0<3}", &m.as_str()[..m.as_str().len().min(3)]))
        .map_or(Some(0), |ms| ms.parse::<u32>().ok())?;
    let mut utc = date.and_hms_milli_opt(num(4)?, num(5)?, num(6)?, millis)?;

    if let Some(sign) = caps.get(9) {
        let offset = Duration::minutes(i64::from(num(10)? * 60 + num(11)?));
        utc = if sign.as_str() == "-" {
            utc.checked_add_signed(offset)?
        } else {
            utc.checked_sub_signed(offset)?
        };
    }

    Some(utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

fn number_to_json(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Render a mapping key as object-key text
fn key_text(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Tagged(tagged) => {
            let inner = *tagged;
            key_text(inner.value)
        }
        complex => serde_yaml::to_string(&complex)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
