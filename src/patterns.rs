//! File kind classification loaded from the embedded kinds.toml.
//!
//! Every predicate here is pure: it looks at path text only and never touches
//! the filesystem. Paths may be absolute or project-relative; both `/` and `\`
//! separators are accepted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::LazyLock;

/// Kinds of source files the scanner tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Component, // Component source: frontmatter script followed by markup
    Markdown,  // Document with an optional YAML frontmatter block
    Dataset,   // Standalone YAML document
}

/// Structure to deserialize the classification table from TOML
#[derive(Debug, Deserialize)]
struct KindsConfig {
    component: ComponentConfig,
    markdown: ExtensionConfig,
    dataset: ExtensionConfig,
    layout: Layout,
    traversal: TraversalConfig,
}

#[derive(Debug, Deserialize)]
struct ComponentConfig {
    extensions: Vec<String>,
    props_source: String,
}

#[derive(Debug, Deserialize)]
struct ExtensionConfig {
    extensions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TraversalConfig {
    exclude: Vec<String>,
}

/// Directory names that give a tracked file its role
#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    pub source: String,
    pub pages: String,
    pub data: String,
    pub components: String,
}

/// Decoded classification table
#[derive(Debug, Clone)]
pub struct Classifier {
    component_exts: Vec<String>,
    markdown_exts: Vec<String>,
    dataset_exts: Vec<String>,
    /// Expression the destructuring form reads props from (e.g. `Astro.props`)
    pub props_source: String,
    pub layout: Layout,
    /// Directory names never descended into during traversal
    pub traversal_excludes: Vec<String>,
}

// Embed the TOML file directly in the binary at compile time
const KINDS_TOML: &str = include_str!("kinds.toml");

static CLASSIFIER: LazyLock<Classifier> =
    LazyLock::new(|| Classifier::load().expect("embedded kinds.toml must decode"));

/// The classifier built from the embedded table
pub fn classifier() -> &'static Classifier {
    &CLASSIFIER
}

fn lowercase_all(exts: Vec<String>) -> Vec<String> {
    exts.into_iter().map(|e| e.to_ascii_lowercase()).collect()
}

impl Classifier {
    /// Decode the embedded kinds.toml
    pub fn load() -> Result<Self> {
        Self::from_toml(KINDS_TOML)
    }

    fn from_toml(raw: &str) -> Result<Self> {
        let config: KindsConfig =
            toml::from_str(raw).context("Failed to parse kinds TOML file")?;

        Ok(Classifier {
            component_exts: lowercase_all(config.component.extensions),
            markdown_exts: lowercase_all(config.markdown.extensions),
            dataset_exts: lowercase_all(config.dataset.extensions),
            props_source: config.component.props_source,
            layout: config.layout,
            traversal_excludes: config.traversal.exclude,
        })
    }

    /// Map a path to its file kind, if it is one the scanner tracks
    pub fn classify(&self, path: &str) -> Option<FileKind> {
        if self.is_component_source(path) {
            Some(FileKind::Component)
        } else if self.is_markdown(path) {
            Some(FileKind::Markdown)
        } else if self.is_dataset(path) {
            Some(FileKind::Dataset)
        } else {
            None
        }
    }

    pub fn is_component_source(&self, path: &str) -> bool {
        matching_extension(path, &self.component_exts).is_some()
    }

    pub fn is_markdown(&self, path: &str) -> bool {
        matching_extension(path, &self.markdown_exts).is_some()
    }

    pub fn is_dataset(&self, path: &str) -> bool {
        matching_extension(path, &self.dataset_exts).is_some()
    }

    /// True when a `src` segment appears anywhere in the path's directories
    pub fn is_under_source(&self, path: &str) -> bool {
        anchored(path).contains(&format!("/{}/", self.layout.source))
    }

    pub fn is_under_pages(&self, path: &str) -> bool {
        anchored(path).contains(&self.pages_marker())
    }

    pub fn is_under_data(&self, path: &str) -> bool {
        anchored(path).contains(&format!("/{}/{}/", self.layout.source, self.layout.data))
    }

    /// Marker locating the page tree inside a path, e.g. `/src/pages/`
    pub fn pages_marker(&self) -> String {
        format!("/{}/{}/", self.layout.source, self.layout.pages)
    }

    pub fn is_excluded_dir_name(&self, name: &str) -> bool {
        self.traversal_excludes.iter().any(|e| e == name)
    }

    /// Strip a recognized page-file suffix (component or markdown)
    pub fn strip_page_suffix<'a>(&self, path: &'a str) -> &'a str {
        matching_extension(path, &self.component_exts)
            .or_else(|| matching_extension(path, &self.markdown_exts))
            .map(|ext| &path[..path.len() - ext.len()])
            .unwrap_or(path)
    }

    /// Dataset id: file basename without its dataset extension
    pub fn dataset_id(&self, path: &str) -> String {
        let normalized = normalize(path);
        let file = normalized.rsplit('/').next().unwrap_or(&normalized);
        match matching_extension(file, &self.dataset_exts) {
            Some(ext) => file[..file.len() - ext.len()].to_string(),
            None => file.to_string(),
        }
    }

    /// Conventional location of a component referenced by tag name
    pub fn component_path_guess(&self, tag: &str) -> String {
        let name = tag.split('.').next().unwrap_or(tag);
        let ext = self
            .component_exts
            .first()
            .map(String::as_str)
            .unwrap_or(".astro");
        format!(
            "{}/{}/{}{}",
            self.layout.source, self.layout.components, name, ext
        )
    }
}

/// Return the configured extension the path ends with (case-insensitive)
fn matching_extension<'e>(path: &str, exts: &'e [String]) -> Option<&'e str> {
    let lower = path.to_ascii_lowercase();
    exts.iter()
        .find(|ext| lower.ends_with(ext.as_str()))
        .map(String::as_str)
}

/// Convert backslash separators to forward slashes
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalized path with a guaranteed leading `/` so segment markers match at the start
fn anchored(path: &str) -> String {
    let normalized = normalize(path);
    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{}", normalized)
    }
}

/// True if any path segment starts with `_` or `.` (drafts, private, hidden)
pub fn should_ignore(path: &str) -> bool {
    normalize(path)
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .any(|seg| seg.starts_with('_') || seg.starts_with('.'))
}

pub fn is_component_source(path: &str) -> bool {
    classifier().is_component_source(path)
}

pub fn is_markdown(path: &str) -> bool {
    classifier().is_markdown(path)
}

pub fn is_dataset(path: &str) -> bool {
    classifier().is_dataset(path)
}

pub fn is_under_source(path: &str) -> bool {
    classifier().is_under_source(path)
}

pub fn is_under_pages(path: &str) -> bool {
    classifier().is_under_pages(path)
}

pub fn is_under_data(path: &str) -> bool {
    classifier().is_under_data(path)
}
