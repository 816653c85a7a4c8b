//! Frontmatter - content model extraction for static-site projects
//!
//! Frontmatter walks a project's `src/` tree and extracts a versioned
//! intermediate representation (IR) of its content model: pages with their
//! routes and declared fields, components with their props, and YAML datasets.
//! The IR is written as `build.json` beside a `manifest.json` of content
//! fingerprints, so downstream tooling can consume the model without
//! understanding the source formats.
//!
//! ## Layout
//!
//! - `patterns` classifies paths (kind, page/data/source areas, ignore rule)
//!   using the embedded `kinds.toml`
//! - `parser` holds the per-kind parsers (component props, markdown
//!   frontmatter, YAML datasets)
//! - `route` maps page files to URL routes
//! - `scanner` drives traversal and assembles the IR
//! - `ir` defines the IR types, the structural validator, and reference checks

pub mod files;
pub mod ir;
pub mod parser;
pub mod patterns;
pub mod route;
pub mod scanner;
pub mod time;

// Re-export commonly used items
pub use ir::{
    dangling_component_refs, validate, validate_build, Build, ComponentModel, DatasetModel,
    ErrorReport, Field, FieldSource, FieldType, Manifest, PageModel, Project, ScanError,
    SourceType, SCHEMA_VERSION,
};
pub use patterns::{
    classifier, is_component_source, is_dataset, is_markdown, is_under_data, is_under_pages,
    is_under_source, should_ignore, FileKind,
};
pub use route::infer_route;
pub use scanner::{scan, scan_with_clock, ScanOptions, ScanResult, DEFAULT_OUT_DIR};
pub use time::{Clock, FixedClock, SystemClock};
