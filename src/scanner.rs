//! Project traversal and IR assembly.
//!
//! A scan walks the project once, fingerprints every tracked file, parses each
//! file with the parser for its kind, and assembles a [`Build`] and
//! [`Manifest`]. Nothing is written to disk here; persisting the result is the
//! caller's job.
//!
//! Processing is sequential and follows traversal order, which is sorted by
//! file name at every directory level, so repeated scans of the same tree
//! produce the same ordering.

use crate::files::{fingerprint, read_bytes};
use crate::ir::{
    dangling_component_refs, validate_build, Build, ComponentModel, DatasetFormat, DatasetModel,
    Manifest, PageModel, Project, ScanError, SourceType, SCHEMA_VERSION,
};
use crate::parser::{parse_component, parse_dataset, parse_markdown, ComponentSource};
use crate::patterns::{classifier, normalize, should_ignore, FileKind};
use crate::route::infer_route;
use crate::time::{Clock, SystemClock};

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the output directory created under the project root by default
pub const DEFAULT_OUT_DIR: &str = ".frontmatter";

/// Options controlling scan behavior
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Absolute project root
    pub root: PathBuf,
    /// Output directory; excluded from traversal when it sits inside the root
    pub out_dir: PathBuf,
    pub verbose: bool,
    /// Report undecodable markdown/dataset files as scan errors instead of aborting
    pub lenient: bool,
    /// Report page component references missing from the components index
    pub verify_components: bool,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let out_dir = root.join(DEFAULT_OUT_DIR);
        ScanOptions {
            root,
            out_dir,
            verbose: false,
            lenient: false,
            verify_components: false,
        }
    }
}

/// Everything one scan produces
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub manifest: Manifest,
    pub build: Build,
    pub errors: Vec<ScanError>,
}

/// A file under the source tree, read once and fingerprinted
struct TrackedFile {
    rel: String,
    kind: FileKind,
    contents: Vec<u8>,
    hash: String,
}

impl TrackedFile {
    fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .with_context(|| format!("{} is not valid UTF-8", self.rel))
    }
}

/// Project-relative path with forward slashes
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// Basename of the root directory, `project` when it has none
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "project".to_string())
}

/// Walk `root` and return every file of a tracked kind, in traversal order.
///
/// Ignored segments, excluded directory names, and `out_dir` are pruned
/// before descent, so nothing below them is listed or read.
pub fn list_source_files(root: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Project root is not a directory: {}", root.display());
    }
    let classifier = classifier();
    let walk_root = root.to_path_buf();
    let out_dir = out_dir.to_path_buf();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        // Our own ignore rule replaces .gitignore and friends
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let path = entry.path();

            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                let excluded_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| classifier.is_excluded_dir_name(name));
                if excluded_name || path == out_dir.as_path() {
                    return false;
                }
            }

            !should_ignore(&relative_path(&walk_root, path))
        })
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = result.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if classifier.classify(&relative_path(root, entry.path())).is_some() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Scan a project using the wall clock
pub fn scan(options: &ScanOptions) -> Result<ScanResult> {
    scan_with_clock(options, &SystemClock)
}

/// Scan a project, stamping the result with `clock`.
///
/// Malformed content structure is reported through `ScanResult::errors`.
/// I/O failures, and decode failures unless `lenient` is set, abort the scan.
pub fn scan_with_clock(options: &ScanOptions, clock: &dyn Clock) -> Result<ScanResult> {
    let root = options.root.as_path();
    let classifier = classifier();
    let mut errors = Vec::new();

    if options.verbose {
        info!(root = %root.display(), "scanning project");
    }

    let mut tracked = Vec::new();
    for path in list_source_files(root, &options.out_dir)? {
        let rel = relative_path(root, &path);
        if !classifier.is_under_source(&rel) {
            debug!(file = %rel, "outside source tree, not tracked");
            continue;
        }
        let Some(kind) = classifier.classify(&rel) else {
            continue;
        };
        let contents = read_bytes(&path)?;
        let hash = fingerprint(&contents);
        tracked.push(TrackedFile {
            rel,
            kind,
            contents,
            hash,
        });
    }

    let files: IndexMap<String, String> = tracked
        .iter()
        .map(|f| (f.rel.clone(), f.hash.clone()))
        .collect();

    // Every component source file is indexed, page or not
    let mut components_index = IndexMap::new();
    let mut parsed_components: IndexMap<&str, ComponentSource> = IndexMap::new();
    for file in tracked.iter().filter(|f| f.kind == FileKind::Component) {
        let Some(text) = recover(file.text(), options.lenient, &mut errors)? else {
            continue;
        };
        let parsed = parse_component(text);
        if options.verbose {
            info!(
                file = %file.rel,
                props = parsed.exported_props.len(),
                "parsed component"
            );
        }
        components_index.insert(
            file.rel.clone(),
            ComponentModel {
                id: file.rel.clone(),
                file: file.rel.clone(),
                exported_props: parsed.exported_props.clone(),
            },
        );
        parsed_components.insert(file.rel.as_str(), parsed);
    }

    let mut pages = Vec::new();
    for file in tracked.iter().filter(|f| classifier.is_under_pages(&f.rel)) {
        let route = infer_route(&format!("/{}", file.rel));

        let page = match file.kind {
            FileKind::Component => {
                // Absent only when a lenient scan already reported the file
                let Some(parsed) = parsed_components.get(file.rel.as_str()) else {
                    continue;
                };
                PageModel {
                    id: file.rel.clone(),
                    route,
                    file: file.rel.clone(),
                    components: parsed
                        .used_components
                        .iter()
                        .map(|name| classifier.component_path_guess(name))
                        .collect(),
                    fields: parsed.exported_props.clone(),
                    source_type: Some(SourceType::Component),
                }
            }
            FileKind::Markdown => {
                let parsed = file.text().and_then(|text| {
                    parse_markdown(text)
                        .with_context(|| format!("Invalid frontmatter in {}", file.rel))
                });
                let Some(doc) = recover(parsed, options.lenient, &mut errors)? else {
                    continue;
                };
                PageModel {
                    id: file.rel.clone(),
                    route,
                    file: file.rel.clone(),
                    components: Vec::new(),
                    fields: doc.fields,
                    source_type: Some(SourceType::Markdown),
                }
            }
            FileKind::Dataset => continue,
        };

        if options.verbose {
            info!(file = %page.file, route = %page.route, "page");
        }
        pages.push(page);
    }

    let mut datasets = Vec::new();
    for file in tracked
        .iter()
        .filter(|f| f.kind == FileKind::Dataset && classifier.is_under_data(&f.rel))
    {
        let parsed = file.text().and_then(|text| {
            parse_dataset(text).with_context(|| format!("Invalid YAML in {}", file.rel))
        });
        let Some(data) = recover(parsed, options.lenient, &mut errors)? else {
            continue;
        };
        let id = classifier.dataset_id(&file.rel);
        if options.verbose {
            info!(file = %file.rel, id = %id, "dataset");
        }
        datasets.push(DatasetModel {
            id,
            file: file.rel.clone(),
            format: DatasetFormat::Yaml,
            data,
            hash: file.hash.clone(),
        });
    }

    let project = Project {
        root: normalize(&root.to_string_lossy()),
        name: project_name(root),
    };
    let build = Build {
        schema_version: SCHEMA_VERSION,
        generated_at: clock.now_millis(),
        project: project.clone(),
        pages,
        components_index,
        datasets,
    };

    errors.extend(validate_build(&build).into_iter().map(ScanError::new));
    if options.verify_components {
        errors.extend(dangling_component_refs(&build).into_iter().map(ScanError::new));
    }

    let manifest = Manifest {
        schema_version: SCHEMA_VERSION,
        generated_at: build.generated_at,
        project,
        files,
    };

    info!(
        files = manifest.files.len(),
        pages = build.pages.len(),
        components = build.components_index.len(),
        datasets = build.datasets.len(),
        errors = errors.len(),
        "scan complete"
    );

    Ok(ScanResult {
        manifest,
        build,
        errors,
    })
}

/// Downgrade a per-file failure to a scan error in lenient mode, propagate it otherwise
fn recover<T>(result: Result<T>, lenient: bool, errors: &mut Vec<ScanError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if lenient => {
            let message = format!("{:#}", err);
            warn!("{}", message);
            errors.push(ScanError::new(message));
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
