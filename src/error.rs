use std::fmt::{Display, Formatter};

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::schema::SchemaKind;

/// Classification of a reported problem, as printed by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueKind {
    Schema,
    Reference,
    Duplicate,
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Schema => f.write_str("schema"),
            IssueKind::Reference => f.write_str("reference"),
            IssueKind::Duplicate => f.write_str("duplicate"),
        }
    }
}

/// A single schema rule broken by a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value, empty for the document root.
    pub path: String,
    pub reason: String,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.path.as_str() {
            "" => write!(f, "(root): {}", self.reason),
            path => write!(f, "{}: {}", path, self.reason),
        }
    }
}

/// Every violation found in one document.
#[derive(Debug, Clone, Error)]
#[error("Invalid {kind} schema ({} violation(s))", violations.len())]
pub struct SchemaError {
    pub kind: SchemaKind,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Missing required file: {0}")]
    Missing(Utf8PathBuf),

    #[error("Couldn't read {0}.\n{1}")]
    Io(Utf8PathBuf, std::io::Error),

    #[error("Failed to parse JSON in {0}: {1}")]
    Parse(Utf8PathBuf, serde_json::Error),

    #[error("{0}: {1}")]
    Schema(Utf8PathBuf, SchemaError),

    /// The document passed its schema but still doesn't fit the record type.
    #[error("Malformed document {0}: {1}")]
    Decode(Utf8PathBuf, serde_json::Error),
}

impl DocumentError {
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            DocumentError::Missing(path)
            | DocumentError::Io(path, _)
            | DocumentError::Parse(path, _)
            | DocumentError::Schema(path, _)
            | DocumentError::Decode(path, _) => path,
        }
    }
}

/// A broken reference or repeated identifier inside one roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("Duplicate {collection} ID: {id}")]
    DuplicateId { collection: &'static str, id: String },

    #[error("Edge {edge} references non-existent source node: {node}")]
    DanglingEdgeSource { edge: String, node: String },

    #[error("Edge {edge} references non-existent target node: {node}")]
    DanglingEdgeTarget { edge: String, node: String },

    #[error("Node {node} references non-existent resource: {resource}")]
    MissingResource { node: String, resource: String },

    #[error("Node {node} references non-existent prerequisite: {prerequisite}")]
    MissingPrerequisite { node: String, prerequisite: String },

    #[error("Prerequisite cycle between nodes: {}", nodes.join(", "))]
    PrerequisiteCycle { nodes: Vec<String> },

    #[error("Cycle of 'requires' edges between nodes: {}", nodes.join(", "))]
    RequiresCycle { nodes: Vec<String> },
}

impl IntegrityError {
    pub fn kind(&self) -> IssueKind {
        match self {
            IntegrityError::DuplicateId { .. } => IssueKind::Duplicate,
            _ => IssueKind::Reference,
        }
    }
}

/// A constraint broken across roadmaps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlobalError {
    #[error("Duplicate roadmap ID: {id}")]
    DuplicateRoadmapId { id: String, location: Utf8PathBuf },

    #[error("Duplicate roadmap slug: {slug}")]
    DuplicateSlug { slug: String, location: Utf8PathBuf },
}

impl GlobalError {
    /// Directory of the roadmap that repeated an earlier id or slug.
    pub fn location(&self) -> &Utf8PathBuf {
        match self {
            GlobalError::DuplicateRoadmapId { location, .. }
            | GlobalError::DuplicateSlug { location, .. } => location,
        }
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Node '{0}' appears more than once")]
    DuplicateNode(String),

    #[error("Edge '{edge}' points at unknown node '{node}'")]
    DanglingEdge { edge: String, node: String },

    #[error("Layout backend failed: {0}")]
    Backend(anyhow::Error),
}

/// Failure to compile one roadmap. Never fatal for a whole build.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Couldn't serialize {0}.\n{1}")]
    Serialize(Utf8PathBuf, serde_json::Error),

    #[error("Couldn't write {0}.\n{1}")]
    Write(Utf8PathBuf, std::io::Error),
}

/// Failure to walk the content tree; the only fatal error of a run.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Failed to read content directory {0}.\n{1}")]
    Root(Utf8PathBuf, std::io::Error),

    #[error("Content root {0} is not a directory")]
    NotDirectory(Utf8PathBuf),

    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),

    #[error("Couldn't list roadmap directories.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Malformed manifest.\n{0}")]
    Json(#[from] serde_json::Error),

    #[error("Couldn't write manifest {0}.\n{1}")]
    Write(Utf8PathBuf, std::io::Error),

    #[error("Couldn't read manifest {0}.\n{1}")]
    Read(Utf8PathBuf, std::io::Error),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to parse {0}: {1}")]
    Parse(Utf8PathBuf, serde_json::Error),

    #[error("Couldn't read {0}.\n{1}")]
    Read(Utf8PathBuf, std::io::Error),
}
