//! Schema validation for raw roadmap documents.
//!
//! The schemas ship inside the binary (see `schemas/`) and are compiled once,
//! on first use. Validation never stops at the first problem: an author gets
//! every violation in a document in one pass.

use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use camino::Utf8Path;
use jsonschema::Validator;
use serde_json::Value;

use crate::error::{DocumentError, SchemaError, Violation};

/// Shape a document is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaKind {
    Meta,
    Nodes,
    Edges,
    Resources,
    Layout,
}

impl SchemaKind {
    /// Name of the file holding this document inside a roadmap directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SchemaKind::Meta => "meta.json",
            SchemaKind::Nodes => "nodes.json",
            SchemaKind::Edges => "edges.json",
            SchemaKind::Resources => "resources.json",
            SchemaKind::Layout => "layout.json",
        }
    }

    fn source(self) -> &'static str {
        match self {
            SchemaKind::Meta => include_str!("../schemas/roadmap.meta.schema.json"),
            SchemaKind::Nodes => include_str!("../schemas/roadmap.nodes.schema.json"),
            SchemaKind::Edges => include_str!("../schemas/roadmap.edges.schema.json"),
            SchemaKind::Resources => include_str!("../schemas/roadmap.resources.schema.json"),
            SchemaKind::Layout => include_str!("../schemas/roadmap.layout.schema.json"),
        }
    }

    fn validator(self) -> &'static Validator {
        static META: LazyLock<Validator> = LazyLock::new(|| compile(SchemaKind::Meta));
        static NODES: LazyLock<Validator> = LazyLock::new(|| compile(SchemaKind::Nodes));
        static EDGES: LazyLock<Validator> = LazyLock::new(|| compile(SchemaKind::Edges));
        static RESOURCES: LazyLock<Validator> = LazyLock::new(|| compile(SchemaKind::Resources));
        static LAYOUT: LazyLock<Validator> = LazyLock::new(|| compile(SchemaKind::Layout));

        match self {
            SchemaKind::Meta => &META,
            SchemaKind::Nodes => &NODES,
            SchemaKind::Edges => &EDGES,
            SchemaKind::Resources => &RESOURCES,
            SchemaKind::Layout => &LAYOUT,
        }
    }
}

impl Display for SchemaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SchemaKind::Meta => "meta",
            SchemaKind::Nodes => "nodes",
            SchemaKind::Edges => "edges",
            SchemaKind::Resources => "resources",
            SchemaKind::Layout => "layout",
        };
        f.write_str(name)
    }
}

fn compile(kind: SchemaKind) -> Validator {
    let schema: Value =
        serde_json::from_str(kind.source()).expect("Error parsing embedded schema");
    jsonschema::validator_for(&schema).expect("Error compiling embedded schema")
}

/// Checks a parsed document against the schema for `kind`.
///
/// The document is returned untouched when it conforms; otherwise every
/// violation is reported, in the order the schema visits them.
pub fn validate(document: &Value, kind: SchemaKind) -> Result<&Value, SchemaError> {
    let violations: Vec<_> = kind
        .validator()
        .iter_errors(document)
        .map(|error| Violation {
            path: error.instance_path.to_string(),
            reason: error.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(document)
    } else {
        Err(SchemaError { kind, violations })
    }
}

/// Parses raw text and validates the result. Text that isn't JSON at all is a
/// [`DocumentError::Parse`], distinct from a schema failure.
pub fn validate_str(path: &Utf8Path, text: &str, kind: SchemaKind) -> Result<Value, DocumentError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| DocumentError::Parse(path.to_owned(), e))?;

    if let Err(e) = validate(&document, kind) {
        return Err(DocumentError::Schema(path.to_owned(), e));
    }

    Ok(document)
}
