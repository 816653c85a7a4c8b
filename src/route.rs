//! Route inference for page files.

use crate::patterns::{classifier, normalize};

/// Infer the URL route of a page from its path.
///
/// `src/pages/index.astro` maps to `/`, `src/pages/about.md` to `/about`, and
/// `src/pages/blog/index.md` to `/blog`. A path with no `src/pages/` segment
/// falls back to `/`.
pub fn infer_route(page_path: &str) -> String {
    let classifier = classifier();
    let normalized = normalize(page_path);
    let anchored = if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{}", normalized)
    };

    let marker = classifier.pages_marker();
    let Some(idx) = anchored.find(&marker) else {
        return "/".to_string();
    };

    let rest = &anchored[idx + marker.len()..];
    let rest = classifier.strip_page_suffix(rest);

    if rest == "index" {
        return "/".to_string();
    }
    let rest = rest.strip_suffix("/index").unwrap_or(rest);

    format!("/{}", rest)
}
