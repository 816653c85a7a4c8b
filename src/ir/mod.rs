//! Versioned intermediate representation and its validator.

pub mod refs;
pub mod types;
pub mod validate;

pub use refs::dangling_component_refs;
pub use types::{
    Build, ComponentModel, DatasetFormat, DatasetModel, ErrorReport, Field, FieldSource,
    FieldType, Manifest, PageModel, Project, ScanError, SourceType, SCHEMA_VERSION,
};
pub use validate::{validate, validate_build};
