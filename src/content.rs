//! Discovery and loading of roadmap directories.
//!
//! Content lives two levels deep under the content root, one directory per
//! roadmap grouped by category:
//!
//! ```text
//! content/roadmaps/
//!   roles/
//!     frontend/
//!       meta.json  nodes.json  edges.json  resources.json  [layout.json]
//! ```

use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use serde::de::DeserializeOwned;

use crate::error::{DocumentError, WalkError};
use crate::model::{LayoutData, RoadmapEdge, RoadmapMeta, RoadmapNode, RoadmapResource};
use crate::schema::{SchemaKind, validate_str};

/// File name of the compiled artifact written into each roadmap directory.
pub const COMPILED_FILE: &str = "roadmap.compiled.json";

/// A single roadmap directory found under the content root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoadmapDir {
    /// Full path of the directory.
    pub path: Utf8PathBuf,
    /// Path relative to the content root, `category/roadmap`.
    pub name: String,
}

impl RoadmapDir {
    pub fn new(root: &Utf8Path, path: Utf8PathBuf) -> Self {
        let name = path
            .strip_prefix(root)
            .map(|rel| rel.components().map(|c| c.as_str()).collect::<Vec<_>>().join("/"))
            .unwrap_or_else(|_| path.to_string());

        Self { path, name }
    }

    pub fn document(&self, kind: SchemaKind) -> Utf8PathBuf {
        self.path.join(kind.file_name())
    }

    pub fn compiled(&self) -> Utf8PathBuf {
        self.path.join(COMPILED_FILE)
    }
}

/// Lists every `category/roadmap` directory under `root`, sorted by path.
/// Hidden directories are skipped.
///
/// Failing to read the root itself is the one error a whole run can't
/// recover from.
pub fn discover(root: &Utf8Path) -> Result<Vec<RoadmapDir>, WalkError> {
    let metadata = fs::metadata(root).map_err(|e| WalkError::Root(root.to_owned(), e))?;
    if !metadata.is_dir() {
        return Err(WalkError::NotDirectory(root.to_owned()));
    }

    // make sure the root is actually listable, glob swallows this
    fs::read_dir(root).map_err(|e| WalkError::Root(root.to_owned(), e))?;

    let pattern = format!("{}/*/*", Pattern::escape(root.as_str()));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut dirs = Vec::new();
    for path in glob::glob_with(&pattern, options)? {
        let path = Utf8PathBuf::try_from(path?)?;
        if path.is_dir() {
            dirs.push(RoadmapDir::new(root, path));
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Reads a document, or `None` when the file doesn't exist.
fn read(path: &Utf8Path) -> Result<Option<String>, DocumentError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DocumentError::Io(path.to_owned(), e)),
    }
}

fn decode<T: DeserializeOwned>(path: &Utf8Path, text: &str, kind: SchemaKind) -> Result<T, DocumentError> {
    let value = validate_str(path, text, kind)?;
    serde_json::from_value(value).map_err(|e| DocumentError::Decode(path.to_owned(), e))
}

/// Loads, validates and decodes one required document.
pub fn load_document<T: DeserializeOwned>(dir: &RoadmapDir, kind: SchemaKind) -> Result<T, DocumentError> {
    let path = dir.document(kind);
    match read(&path)? {
        Some(text) => decode(&path, &text, kind),
        None => Err(DocumentError::Missing(path)),
    }
}

/// Loads `layout.json` if the directory has one.
pub fn load_layout(dir: &RoadmapDir) -> Result<Option<LayoutData>, DocumentError> {
    let path = dir.document(SchemaKind::Layout);
    match read(&path)? {
        Some(text) => decode(&path, &text, SchemaKind::Layout).map(Some),
        None => Ok(None),
    }
}

/// The four documents every roadmap directory must provide.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapDocuments {
    pub meta: RoadmapMeta,
    pub nodes: Vec<RoadmapNode>,
    pub edges: Vec<RoadmapEdge>,
    pub resources: Vec<RoadmapResource>,
}

impl RoadmapDocuments {
    /// Loads all four documents, stopping at the first one that fails.
    pub fn load(dir: &RoadmapDir) -> Result<Self, DocumentError> {
        Ok(Self {
            meta: load_document(dir, SchemaKind::Meta)?,
            nodes: load_document(dir, SchemaKind::Nodes)?,
            edges: load_document(dir, SchemaKind::Edges)?,
            resources: load_document(dir, SchemaKind::Resources)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn discovers_sorted_roadmaps() {
        let tmp = tempfile::tempdir().unwrap();
        let root = utf8(&tmp);

        for dir in ["skills/react", "roles/frontend", "roles/backend", ".git/objects"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        fs::write(root.join("roles/README.md"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let names: Vec<_> = discover(&root)
            .unwrap()
            .into_iter()
            .map(|dir| dir.name)
            .collect();

        assert_eq!(names, vec!["roles/backend", "roles/frontend", "skills/react"]);
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let root = utf8(&tmp).join("nope");
        assert!(matches!(discover(&root), Err(WalkError::Root(..))));
    }

    #[test]
    fn missing_document() {
        let tmp = tempfile::tempdir().unwrap();
        let root = utf8(&tmp);
        fs::create_dir_all(root.join("roles/empty")).unwrap();

        let dir = RoadmapDir::new(&root, root.join("roles/empty"));
        let err = load_document::<RoadmapMeta>(&dir, SchemaKind::Meta).unwrap_err();
        assert!(matches!(err, DocumentError::Missing(ref path) if path.ends_with("meta.json")));
        assert!(load_layout(&dir).unwrap().is_none());
    }
}
