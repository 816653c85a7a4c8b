//! Optional existence check for page component references.
//!
//! Page components are resolved by naming convention only, so a renamed or
//! moved component leaves a dangling path behind. This pass is kept apart from
//! `validate` and only runs when asked for.

use super::types::Build;

/// Report every page component path that has no entry in `componentsIndex`
pub fn dangling_component_refs(build: &Build) -> Vec<String> {
    build
        .pages
        .iter()
        .flat_map(|page| {
            page.components
                .iter()
                .filter(|path| !build.components_index.contains_key(path.as_str()))
                .map(move |path| {
                    format!("Page({}) references missing component: {}", page.id, path)
                })
        })
        .collect()
}
