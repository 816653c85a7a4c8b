use frontmatter::{
    scan_with_clock, validate, validate_build, FieldSource, FieldType, FixedClock, ScanError,
    ScanOptions, SourceType, SCHEMA_VERSION,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const NOW: i64 = 1_700_000_000_000;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

// A small site: two astro pages, one markdown page, two components, one dataset
fn create_site() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "src/pages/index.astro",
        "---\nimport Hero from '../components/Hero.astro';\ninterface Props {\n  title: string;\n  count?: number;\n}\n---\n<Hero title=\"Home\" />\n<Footer />\n<Hero />\n",
    );
    write(
        root,
        "src/pages/blog/first-post.md",
        "---\ntitle: First\ndraft: false\ntags: [a, b]\n---\n# First post\n",
    );
    write(
        root,
        "src/pages/docs/index.astro",
        "---\nconst { heading = \"Docs\", depth = 2 } = Astro.props;\n---\n<main>{heading}</main>\n",
    );
    write(
        root,
        "src/components/Hero.astro",
        "---\ninterface Props {\n  title: string;\n  subtitle?: string;\n}\n---\n<Button />\n<h1>{Astro.props.title}</h1>\n",
    );
    write(root, "src/components/Button.astro", "<button><slot /></button>\n");
    write(
        root,
        "src/data/authors.yml",
        "- name: Ada\n  role: editor\n- name: Lin\n  role: writer\n",
    );

    dir
}

fn options(root: &Path) -> ScanOptions {
    ScanOptions::new(root)
}

#[test]
fn test_empty_project_is_valid() {
    let dir = tempdir().unwrap();
    let result = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();

    assert!(result.errors.is_empty());
    assert!(result.build.pages.is_empty());
    assert!(result.build.components_index.is_empty());
    assert!(result.build.datasets.is_empty());
    assert!(result.manifest.files.is_empty());
    assert_eq!(result.build.schema_version, SCHEMA_VERSION);
    assert_eq!(result.build.generated_at, NOW);
    assert_eq!(result.manifest.generated_at, NOW);
}

#[test]
fn test_full_site_scan() {
    let dir = create_site();
    let result = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let build = &result.build;
    let routes: Vec<(&str, &str)> = build
        .pages
        .iter()
        .map(|p| (p.file.as_str(), p.route.as_str()))
        .collect();
    assert_eq!(
        routes,
        [
            ("src/pages/blog/first-post.md", "/blog/first-post"),
            ("src/pages/docs/index.astro", "/docs"),
            ("src/pages/index.astro", "/"),
        ]
    );

    let home = build.pages.iter().find(|p| p.route == "/").unwrap();
    assert_eq!(home.id, "src/pages/index.astro");
    assert_eq!(home.source_type, Some(SourceType::Component));
    assert_eq!(
        home.components,
        ["src/components/Hero.astro", "src/components/Footer.astro"]
    );
    let keys: Vec<(&str, bool)> = home
        .fields
        .iter()
        .map(|f| (f.key.as_str(), f.required))
        .collect();
    assert_eq!(keys, [("title", true), ("count", false)]);

    let post = &build.pages[0];
    assert_eq!(post.source_type, Some(SourceType::Markdown));
    assert!(post.components.is_empty());
    assert!(post
        .fields
        .iter()
        .all(|f| !f.required && f.source == Some(FieldSource::Markdown)));
    let types: Vec<(&str, FieldType)> = post
        .fields
        .iter()
        .map(|f| (f.key.as_str(), f.field_type))
        .collect();
    assert_eq!(
        types,
        [
            ("title", FieldType::String),
            ("draft", FieldType::Boolean),
            ("tags", FieldType::Unknown),
        ]
    );

    let docs = &build.pages[1];
    assert_eq!(docs.fields[0].default, Some(json!("Docs")));
    assert_eq!(docs.fields[1].default, Some(json!(2)));

    assert_eq!(
        build.components_index.keys().collect::<Vec<_>>(),
        [
            "src/components/Button.astro",
            "src/components/Hero.astro",
            "src/pages/docs/index.astro",
            "src/pages/index.astro",
        ]
    );
    let hero = &build.components_index["src/components/Hero.astro"];
    assert_eq!(hero.id, hero.file);
    assert_eq!(hero.exported_props.len(), 2);

    assert_eq!(build.datasets.len(), 1);
    let authors = &build.datasets[0];
    assert_eq!(authors.id, "authors");
    assert_eq!(authors.data[1]["name"], json!("Lin"));
    assert_eq!(
        Some(&authors.hash),
        result.manifest.files.get("src/data/authors.yml")
    );

    assert_eq!(result.manifest.files.len(), 6);
    assert_eq!(result.build.project, result.manifest.project);
    assert_eq!(
        result.build.project.name,
        dir.path().file_name().unwrap().to_string_lossy()
    );
}

#[test]
fn test_page_components_are_not_transitive() {
    let dir = create_site();
    let result = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();

    let home = result.build.pages.iter().find(|p| p.route == "/").unwrap();
    // Hero renders Button, but the page only lists what it uses directly
    assert!(!home
        .components
        .contains(&"src/components/Button.astro".to_string()));
}

#[test]
fn test_scanned_build_validates_after_serialization() {
    let dir = create_site();
    let result = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();

    assert!(validate_build(&result.build).is_empty());
    let text = serde_json::to_string_pretty(&result.build).unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(validate(&reparsed).is_empty());
    assert_eq!(
        reparsed["componentsIndex"]["src/components/Hero.astro"]["exportedProps"][0]["source"],
        "astro"
    );
}

#[test]
fn test_rescan_is_stable() {
    let dir = create_site();
    let first = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();
    let second = scan_with_clock(&options(dir.path()), &FixedClock(NOW + 5)).unwrap();

    assert_eq!(first.manifest.files, second.manifest.files);
    assert_eq!(first.build.pages, second.build.pages);
    assert_eq!(first.build.components_index, second.build.components_index);
    assert_eq!(second.build.generated_at, NOW + 5);
}

#[test]
fn test_fingerprint_tracks_content() {
    let dir = create_site();
    let before = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();

    write(dir.path(), "src/data/authors.yml", "- name: Ada\n");
    let after = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();

    assert_ne!(
        before.manifest.files["src/data/authors.yml"],
        after.manifest.files["src/data/authors.yml"]
    );
    assert_eq!(
        before.manifest.files["src/pages/index.astro"],
        after.manifest.files["src/pages/index.astro"]
    );
}

#[test]
fn test_ignored_and_excluded_paths_are_invisible() {
    let dir = create_site();
    let root = dir.path();
    write(root, "src/pages/_drafts/wip.md", "---\ntitle: WIP\n---\n");
    write(root, "src/pages/_hidden.astro", "<Secret />\n");
    write(root, "src/.cache/pages/x.md", "---\na: 1\n---\n");
    write(root, "node_modules/theme/src/pages/index.astro", "<Theme />\n");
    write(root, ".frontmatter/src/pages/stale.md", "---\na: 1\n---\n");

    let result = scan_with_clock(&options(root), &FixedClock(NOW)).unwrap();
    for rel in result.manifest.files.keys() {
        assert!(
            !rel.contains("_drafts")
                && !rel.contains("_hidden")
                && !rel.contains(".cache")
                && !rel.contains("node_modules")
                && !rel.contains(".frontmatter"),
            "unexpected tracked file {}",
            rel
        );
    }
    assert_eq!(result.build.pages.len(), 3);
}

#[test]
fn test_files_outside_src_are_not_tracked() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "pages/index.astro", "<Hero />\n");
    write(root, "data/site.yml", "title: x\n");
    write(root, "README.md", "# readme\n");

    let result = scan_with_clock(&options(root), &FixedClock(NOW)).unwrap();
    assert!(result.manifest.files.is_empty());
    assert!(result.build.pages.is_empty());
    assert!(result.build.datasets.is_empty());
}

#[test]
fn test_nested_dataset_ids_use_basename() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/data/team/members.yaml", "lead: Ada\n");
    write(root, "src/data/empty.yml", "");

    let result = scan_with_clock(&options(root), &FixedClock(NOW)).unwrap();
    let ids: Vec<&str> = result.build.datasets.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["empty", "members"]);
    assert!(result.build.datasets[0].data.is_null());
    assert!(result.errors.is_empty());
}

#[test]
fn test_empty_markdown_key_yields_valid_build() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/pages/odd.md", "---\n\"\": x\n---\n");

    let result = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(validate_build(&result.build).is_empty());
    assert_eq!(result.build.pages.len(), 1);
    assert!(result.build.pages[0].fields.is_empty());
}

#[test]
fn test_markdown_dates_are_unknown_fields() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "src/pages/post.md",
        "---\ntitle: Launch\npubDate: 2024-01-01\n---\n",
    );
    write(dir.path(), "src/data/events.yml", "- date: 2024-06-30\n");

    let result = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();
    let fields: Vec<(&str, FieldType)> = result.build.pages[0]
        .fields
        .iter()
        .map(|f| (f.key.as_str(), f.field_type))
        .collect();
    assert_eq!(
        fields,
        [("title", FieldType::String), ("pubDate", FieldType::Unknown)]
    );
    assert_eq!(
        result.build.datasets[0].data,
        json!([{"date": "2024-06-30T00:00:00.000Z"}])
    );
}


#[test]
fn test_malformed_yaml_is_fatal_by_default() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/data/broken.yml", "a: 'unterminated\n");

    let err = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap_err();
    assert!(format!("{:#}", err).contains("src/data/broken.yml"));
}

#[test]
fn test_malformed_frontmatter_is_fatal_by_default() {
    let dir = tempdir().unwrap();
    write(dir.path(), "src/pages/bad.md", "---\na: [1, 2\n---\n");

    let err = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap_err();
    assert!(format!("{:#}", err).contains("src/pages/bad.md"));
}

#[test]
fn test_lenient_scan_reports_and_skips_undecodable_files() {
    let dir = create_site();
    let root = dir.path();
    write(root, "src/data/broken.yml", "a: 'unterminated\n");
    write(root, "src/pages/bad.md", "---\na: [1, 2\n---\n");

    let mut opts = options(root);
    opts.lenient = true;
    let result = scan_with_clock(&opts, &FixedClock(NOW)).unwrap();

    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].message.contains("src/pages/bad.md"));
    assert!(result.errors[1].message.contains("src/data/broken.yml"));

    assert!(result.build.pages.iter().all(|p| p.file != "src/pages/bad.md"));
    assert!(result.build.datasets.iter().all(|d| d.id != "broken"));
    // Still fingerprinted
    assert!(result.manifest.files.contains_key("src/data/broken.yml"));
    assert!(result.manifest.files.contains_key("src/pages/bad.md"));
}

#[test]
fn test_invalid_utf8_component() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/components")).unwrap();
    fs::write(root.join("src/components/Bin.astro"), [0xff, 0xfe, 0x00]).unwrap();

    assert!(scan_with_clock(&options(root), &FixedClock(NOW)).is_err());

    let mut opts = options(root);
    opts.lenient = true;
    let result = scan_with_clock(&opts, &FixedClock(NOW)).unwrap();
    assert_eq!(result.errors.len(), 1);
    assert!(result.build.components_index.is_empty());
}

#[test]
fn test_verify_components_reports_dangling_refs() {
    let dir = create_site();

    let result = scan_with_clock(&options(dir.path()), &FixedClock(NOW)).unwrap();
    assert!(result.errors.is_empty());

    let mut opts = options(dir.path());
    opts.verify_components = true;
    let result = scan_with_clock(&opts, &FixedClock(NOW)).unwrap();
    assert_eq!(
        result.errors,
        vec![ScanError::new(
            "Page(src/pages/index.astro) references missing component: src/components/Footer.astro"
        )]
    );
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(scan_with_clock(&options(&missing), &FixedClock(NOW)).is_err());
}
