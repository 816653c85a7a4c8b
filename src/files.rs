//! Filesystem helpers: reads, JSON artifacts, and content fingerprints.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Lowercase hex SHA-256 of `bytes`
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn read_json(path: &Path) -> Result<Value> {
    let raw = read_bytes(path)?;
    serde_json::from_slice(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Write `value` as 2-space indented JSON with a trailing newline, creating
/// parent directories as needed
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
