//! Document types for roadmap content.
//!
//! Every document is a closed record: the fields a roadmap author may write
//! are listed explicitly, and anything else lands in an `extra` bag. The bag
//! keeps compiled output verbatim while leaving the schema in charge of what
//! is actually allowed.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Fields not covered by the record type, preserved as written.
pub type Extra = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapKind {
    Role,
    Skill,
}

impl Display for RoadmapKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadmapKind::Role => f.write_str("role"),
            RoadmapKind::Skill => f.write_str("skill"),
        }
    }
}

/// Author credited in a roadmap's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Contents of `meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapMeta {
    /// Globally unique identifier.
    pub id: String,
    /// Globally unique, URL-safe name.
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RoadmapKind,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<Author>>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Difficulty of a single topic, written as `B`, `I` or `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "B")]
    Beginner,
    #[serde(rename = "I")]
    Intermediate,
    #[serde(rename = "A")]
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    Core,
    Optional,
    GoodToKnow,
    Avoid,
}

/// A single topic within a roadmap, one entry of `nodes.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapNode {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub level: Level,
    pub status: NodeStatus,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    /// Resource ids, in display order.
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    /// Node ids that should be learned first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RoadmapNode {
    pub fn prerequisites(&self) -> &[String] {
        self.prerequisites.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Requires,
    Optional,
    Related,
}

/// A directed relationship between two nodes, one entry of `edges.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidirectional: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Article,
    Video,
    Documentation,
    Book,
    Course,
    Project,
    Tool,
    Practice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    Free,
    Paid,
    Freemium,
}

/// Learning material, one entry of `resources.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapResource {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Cost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Flow of a layout as recorded in `layout.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionCode {
    /// Top to bottom.
    TB,
    /// Bottom to top.
    BT,
    /// Left to right.
    LR,
    /// Right to left.
    RL,
}

/// Pixel box of a single node.
///
/// Numbers keep the form they were written in, so an authored `160` stays
/// `160` after a compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBox {
    pub x: Number,
    pub y: Number,
    pub width: Number,
    pub height: Number,
}

/// Node positions for one screen size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub nodes: BTreeMap<String, NodeBox>,
    /// Bounding box width, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Number>,
    /// Bounding box height, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Number>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablet: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<Placement>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Visual grouping of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutGroup {
    pub id: String,
    pub title: String,
    pub nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Contents of `layout.json`, either written by hand or computed.
///
/// All fields are optional, an empty layout is a valid layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<DirectionCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Breakpoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<LayoutGroup>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl LayoutData {
    pub fn desktop(&self) -> Option<&Placement> {
        self.breakpoints.as_ref()?.desktop.as_ref()
    }
}

/// The fully merged per-roadmap artifact, `roadmap.compiled.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledRoadmap {
    pub meta: RoadmapMeta,
    pub nodes: Vec<RoadmapNode>,
    pub edges: Vec<RoadmapEdge>,
    pub resources: Vec<RoadmapResource>,
    pub layout: LayoutData,
    pub compiled_at: DateTime<Utc>,
}

/// Summary of one compiled roadmap as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RoadmapKind,
    pub summary: String,
    pub tags: Vec<String>,
    pub level: String,
    /// Location of the roadmap relative to the content root, `category/name`.
    pub path: String,
}

impl ManifestEntry {
    pub fn from_meta(meta: &RoadmapMeta, path: impl Into<String>) -> Self {
        Self {
            id: meta.id.clone(),
            slug: meta.slug.clone(),
            title: meta.title.clone(),
            kind: meta.kind,
            summary: meta.summary.clone(),
            tags: meta.tags.clone().unwrap_or_default(),
            level: meta.level.clone().unwrap_or_else(|| "mixed".into()),
            path: path.into(),
        }
    }
}

/// Index of every compiled roadmap, `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub roadmaps: Vec<ManifestEntry>,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_keeps_unknown_fields() {
        let raw = json!({
            "id": "html",
            "title": "HTML",
            "level": "B",
            "status": "good-to-know",
            "tags": ["web"],
            "resources": [],
            "x-owner": "docs-team"
        });

        let node: RoadmapNode = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(node.level, Level::Beginner);
        assert_eq!(node.status, NodeStatus::GoodToKnow);
        assert_eq!(node.extra.get("x-owner"), Some(&json!("docs-team")));
        assert_eq!(serde_json::to_value(&node).unwrap(), raw);
    }

    #[test]
    fn manifest_entry_defaults() {
        let meta: RoadmapMeta = serde_json::from_value(json!({
            "id": "fe",
            "slug": "frontend-developer",
            "title": "Frontend Developer",
            "type": "role",
            "summary": "Browsers and beyond"
        }))
        .unwrap();

        let entry = ManifestEntry::from_meta(&meta, "roles/frontend");
        assert!(entry.tags.is_empty());
        assert_eq!(entry.level, "mixed");
        assert_eq!(entry.kind, RoadmapKind::Role);
        assert_eq!(entry.path, "roles/frontend");
    }

    #[test]
    fn numbers_keep_their_form() {
        let edge = json!({ "id": "e1", "from": "a", "to": "b", "type": "requires", "weight": 1 });
        let resource = json!({
            "id": "r1", "title": "Book", "type": "book", "url": "https://example.com",
            "rating": 4, "votes": 12
        });
        let layout = json!({
            "breakpoints": { "desktop": {
                "nodes": { "a": { "x": 0, "y": 12.5, "width": 160, "height": 80 } },
                "width": 184
            } }
        });

        let decoded: RoadmapEdge = serde_json::from_value(edge.clone()).unwrap();
        assert_eq!(serde_json::to_value(&decoded).unwrap(), edge);

        let decoded: RoadmapResource = serde_json::from_value(resource.clone()).unwrap();
        assert_eq!(serde_json::to_value(&decoded).unwrap(), resource);

        let decoded: LayoutData = serde_json::from_value(layout.clone()).unwrap();
        assert_eq!(serde_json::to_value(&decoded).unwrap(), layout);
    }

    #[test]
    fn empty_layout_is_empty_object() {
        let layout = LayoutData::default();
        assert_eq!(serde_json::to_value(&layout).unwrap(), json!({}));
    }
}
