use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use michishirube::content::{COMPILED_FILE, discover};
use michishirube::{
    Catalog, Compiler, Config, IssueKind, ManifestBuilder, build, read_manifest, validate_tree,
};
use serde_json::{Value, json};

fn write(dir: &Utf8Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn meta() -> Value {
    json!({
        "id": "fe",
        "slug": "frontend-developer",
        "title": "Frontend Developer",
        "type": "role",
        "summary": "Everything that runs in the browser",
        "tags": ["web"],
        "x-reviewed": true
    })
}

fn nodes() -> Value {
    json!([
        { "id": "html", "title": "HTML", "level": "B", "status": "core", "tags": ["markup"], "resources": ["mdn-html"] },
        { "id": "css", "title": "CSS", "level": "B", "status": "core", "tags": [], "resources": ["mdn-css"], "prerequisites": ["html"] },
        { "id": "js", "title": "JavaScript", "level": "B", "status": "core", "tags": [], "resources": [], "icon": "js" }
    ])
}

fn edges() -> Value {
    json!([
        { "id": "html-css", "from": "html", "to": "css", "type": "requires" },
        { "id": "css-js", "from": "css", "to": "js", "type": "requires", "label": "then" }
    ])
}

fn resources() -> Value {
    json!([
        { "id": "mdn-html", "title": "MDN HTML", "type": "documentation", "url": "https://developer.mozilla.org/docs/Web/HTML", "cost": "free" },
        { "id": "mdn-css", "title": "MDN CSS", "type": "documentation", "url": "https://developer.mozilla.org/docs/Web/CSS", "rating": 4.5 }
    ])
}

struct Content {
    _tmp: tempfile::TempDir,
    base: Utf8PathBuf,
}

impl Content {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let content = Self { _tmp: tmp, base };

        let dir = content.roadmap();
        fs::create_dir_all(&dir).unwrap();
        write(&dir, "meta.json", &meta());
        write(&dir, "nodes.json", &nodes());
        write(&dir, "edges.json", &edges());
        write(&dir, "resources.json", &resources());

        content
    }

    fn root(&self) -> Utf8PathBuf {
        self.base.join("roadmaps")
    }

    fn roadmap(&self) -> Utf8PathBuf {
        self.root().join("roles/frontend")
    }

    fn config(&self) -> Config {
        Config::new()
            .content_root(self.root())
            .manifest_path(self.base.join("manifest.json"))
    }
}

#[test]
fn compiles_frontend_roadmap() {
    let content = Content::new();
    let dirs = discover(&content.root()).unwrap();
    assert_eq!(dirs.len(), 1);

    let mut manifest = ManifestBuilder::new();
    let compiled = Compiler::new(&content.config())
        .compile(&dirs[0], &mut manifest)
        .unwrap();

    assert_eq!(compiled.nodes.len(), 3);
    assert_eq!(compiled.edges.len(), 2);
    assert_eq!(compiled.resources.len(), 2);

    let placed = &compiled.layout.desktop().unwrap().nodes;
    assert_eq!(placed.len(), 3);
    for id in ["html", "css", "js"] {
        assert!(placed.contains_key(id));
    }

    assert!(content.roadmap().join("layout.json").exists());
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.entries()[0].slug, "frontend-developer");

    let written: Value = serde_json::from_str(
        &fs::read_to_string(content.roadmap().join(COMPILED_FILE)).unwrap(),
    )
    .unwrap();

    assert_eq!(written["meta"], meta());
    assert_eq!(written["nodes"], nodes());
    assert_eq!(written["edges"], edges());
    assert_eq!(written["resources"], resources());

    let compiled_at = written["compiledAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(compiled_at).is_ok());
}

#[test]
fn second_build_reuses_layout() {
    let content = Content::new();
    let config = content.config();

    build(&config).unwrap();
    let first = fs::read_to_string(content.roadmap().join("layout.json")).unwrap();

    let summary = build(&config).unwrap();
    let second = fs::read_to_string(content.roadmap().join("layout.json")).unwrap();

    assert_eq!(summary.built, 1);
    assert!(summary.failures.is_empty());
    assert_eq!(first, second);
}

#[test]
fn broken_roadmap_does_not_stop_the_build() {
    let content = Content::new();
    let broken = content.root().join("skills/broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("meta.json"), "{ not json").unwrap();

    let config = content.config();
    let summary = build(&config).unwrap();

    assert_eq!(summary.built, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].0, "skills/broken");

    let manifest = read_manifest(&config.manifest_path).unwrap();
    assert_eq!(manifest.roadmaps.len(), 1);
    assert_eq!(manifest.roadmaps[0].path, "roles/frontend");

    let catalog = Catalog::open(&config.manifest_path, &config.content_root).unwrap();
    let loaded = catalog.load("frontend-developer").unwrap().unwrap();
    assert_eq!(loaded.nodes.len(), 3);
    assert!(loaded.integrity_errors().is_empty());
}

#[test]
fn unreadable_root_fails_the_build() {
    let content = Content::new();
    let config = content.config().content_root(content.base.join("missing"));
    assert!(build(&config).is_err());
}

#[test]
fn missing_resource_is_one_reference_error() {
    let content = Content::new();
    let mut nodes = nodes();
    nodes[2]["resources"] = json!(["r404"]);
    write(&content.roadmap(), "nodes.json", &nodes);

    // an unrelated problem further along is still found
    let mut edges = edges();
    edges[1]["to"] = json!("ts");
    write(&content.roadmap(), "edges.json", &edges);

    let report = validate_tree(&content.config());
    let references: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::Reference)
        .map(|issue| issue.message.as_str())
        .collect();

    assert_eq!(
        references,
        vec![
            "Edge css-js references non-existent target node: ts",
            "Node js references non-existent resource: r404",
        ]
    );
}

#[test]
fn clean_tree_validates() {
    let content = Content::new();
    let report = validate_tree(&content.config());
    assert!(report.is_ok(), "{:?}", report.issues);
    assert_eq!(report.roadmaps, 1);
}

#[test]
fn integer_numbers_survive_compilation() {
    let content = Content::new();
    let dir = content.roadmap();

    let mut edges = edges();
    edges[0]["weight"] = json!(1);
    edges[1]["weight"] = json!(0.5);
    write(&dir, "edges.json", &edges);

    let mut resources = resources();
    resources[0]["rating"] = json!(4);
    resources[0]["votes"] = json!(120);
    write(&dir, "resources.json", &resources);

    let layout = json!({
        "algorithm": "manual",
        "direction": "TB",
        "breakpoints": { "desktop": {
            "nodes": {
                "html": { "x": 0, "y": 0, "width": 160, "height": 80 },
                "css": { "x": 0, "y": 160, "width": 160, "height": 80 },
                "js": { "x": 0, "y": 320.5, "width": 160, "height": 80 }
            },
            "width": 160,
            "height": 400.5
        } }
    });
    write(&dir, "layout.json", &layout);

    let dirs = discover(&content.root()).unwrap();
    let mut manifest = ManifestBuilder::new();
    Compiler::new(&content.config())
        .compile(&dirs[0], &mut manifest)
        .unwrap();

    let written: Value =
        serde_json::from_str(&fs::read_to_string(dir.join(COMPILED_FILE)).unwrap()).unwrap();

    assert_eq!(written["edges"], edges);
    assert_eq!(written["resources"], resources);
    assert_eq!(written["layout"], layout);
}
