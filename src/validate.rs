//! Checking a whole content tree without writing anything.
//!
//! Validation never stops at the first problem. Every file of every roadmap
//! is looked at, and everything wrong with it ends up in the [`Report`].

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::content::{RoadmapDir, discover, load_document, load_layout};
use crate::error::{DocumentError, IssueKind, Violation};
use crate::global::{Registry, validate_global_constraints};
use crate::integrity::{check_cycles, check_integrity};
use crate::model::{RoadmapEdge, RoadmapMeta, RoadmapNode, RoadmapResource};
use crate::schema::SchemaKind;

/// One problem found in the content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// File or directory the problem belongs to.
    pub file: String,
    pub kind: IssueKind,
    pub message: String,
    /// Individual schema violations, empty for other kinds.
    pub details: Vec<Violation>,
}

impl Issue {
    pub fn new(file: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
            details: Vec::new(),
        }
    }

    fn from_document(location: &RoadmapDir, error: DocumentError) -> Self {
        match error {
            // a missing file is pinned on the directory that lacks it
            DocumentError::Missing(_) => {
                Issue::new(location.path.as_str(), IssueKind::Schema, error.to_string())
            }
            DocumentError::Schema(path, schema) => Issue {
                file: path.to_string(),
                kind: IssueKind::Schema,
                message: schema.to_string(),
                details: schema.violations,
            },
            other => Issue::new(other.path().as_str(), IssueKind::Schema, other.to_string()),
        }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file, self.message)?;
        for violation in &self.details {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

/// Everything a validation run found.
#[derive(Debug, Default)]
pub struct Report {
    pub issues: Vec<Issue>,
    /// Number of roadmap directories looked at.
    pub roadmaps: usize,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of issues of each kind, every kind listed.
    pub fn counts(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts: BTreeMap<IssueKind, usize> =
            [IssueKind::Schema, IssueKind::Reference, IssueKind::Duplicate]
                .into_iter()
                .map(|kind| (kind, 0))
                .collect();

        for issue in &self.issues {
            *counts.entry(issue.kind).or_default() += 1;
        }

        counts
    }
}

/// Walks roadmaps one at a time, keeping what the cross-roadmap checks need.
pub struct ContentValidator {
    strict: bool,
    registry: Registry,
    report: Report,
}

impl ContentValidator {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            registry: Registry::new(),
            report: Report::default(),
        }
    }

    fn issue(&mut self, issue: Issue) {
        debug!("{} issue in {}", issue.kind, issue.file);
        self.report.issues.push(issue);
    }

    fn load<T: DeserializeOwned>(&mut self, dir: &RoadmapDir, kind: SchemaKind) -> Option<T> {
        match load_document(dir, kind) {
            Ok(document) => Some(document),
            Err(e) => {
                self.issue(Issue::from_document(dir, e));
                None
            }
        }
    }

    /// Checks every document of one roadmap, then its references once all
    /// four required documents are usable.
    pub fn validate_roadmap(&mut self, dir: &RoadmapDir) {
        self.report.roadmaps += 1;

        let meta: Option<RoadmapMeta> = self.load(dir, SchemaKind::Meta);
        let nodes: Option<Vec<RoadmapNode>> = self.load(dir, SchemaKind::Nodes);
        let edges: Option<Vec<RoadmapEdge>> = self.load(dir, SchemaKind::Edges);
        let resources: Option<Vec<RoadmapResource>> = self.load(dir, SchemaKind::Resources);

        if let Err(e) = load_layout(dir) {
            self.issue(Issue::from_document(dir, e));
        }

        if let Some(meta) = &meta {
            self.registry.insert(dir.path.clone(), meta.clone());
        }

        let (Some(meta), Some(nodes), Some(edges), Some(resources)) =
            (meta, nodes, edges, resources)
        else {
            return;
        };

        let mut errors = check_integrity(&meta, &nodes, &edges, &resources);
        if self.strict {
            errors.extend(check_cycles(&nodes, &edges));
        }

        let file = dir.path.as_str();
        for error in errors {
            self.issue(Issue::new(file, error.kind(), error.to_string()));
        }
    }

    /// Runs the cross-roadmap checks and hands back the report.
    pub fn finish(mut self) -> Report {
        for error in validate_global_constraints(&self.registry) {
            let file = error.location().to_string();
            self.issue(Issue::new(file, IssueKind::Duplicate, error.to_string()));
        }
        self.report
    }
}

/// Validates every roadmap under the configured content root.
pub fn validate_tree(config: &Config) -> Report {
    let mut validator = ContentValidator::new(config.strict);

    match discover(&config.content_root) {
        Ok(dirs) => {
            for dir in &dirs {
                validator.validate_roadmap(dir);
            }
        }
        Err(e) => validator.issue(Issue::new("global", IssueKind::Schema, e.to_string())),
    }

    validator.finish()
}
