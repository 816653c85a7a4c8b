//! Per-kind source parsers.
//!
//! Each parser takes file text and returns a self-contained result; none of
//! them touch the filesystem.

pub mod component;
pub mod dataset;
pub mod frontmatter;
pub mod markdown;

pub use component::{parse_component, ComponentSource};
pub use dataset::{decode_yaml, parse_dataset};
pub use frontmatter::{split_frontmatter, Split};
pub use markdown::{parse_markdown, MarkdownDocument};
