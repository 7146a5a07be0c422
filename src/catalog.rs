//! Read-only access to build output.
//!
//! The catalog reads `manifest.json` to list and search roadmaps, and loads
//! a single `roadmap.compiled.json` on demand. It never writes anything.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};

use crate::content::COMPILED_FILE;
use crate::error::{CatalogError, IntegrityError};
use crate::integrity::check_edges;
use crate::manifest::read_manifest;
use crate::model::{
    CompiledRoadmap, Manifest, ManifestEntry, RoadmapEdge, RoadmapKind, RoadmapNode,
    RoadmapResource,
};

pub struct Catalog {
    manifest: Manifest,
    content_root: Utf8PathBuf,
}

impl Catalog {
    /// Opens the manifest at `manifest`. Entry paths are resolved against
    /// `content_root`.
    pub fn open(manifest: &Utf8Path, content_root: &Utf8Path) -> Result<Self, CatalogError> {
        Ok(Self::from_manifest(read_manifest(manifest)?, content_root))
    }

    pub fn from_manifest(manifest: Manifest, content_root: &Utf8Path) -> Self {
        Self {
            manifest,
            content_root: content_root.to_owned(),
        }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.manifest.roadmaps
    }

    pub fn roadmaps_by_type(&self, kind: RoadmapKind) -> impl Iterator<Item = &ManifestEntry> {
        self.entries().iter().filter(move |entry| entry.kind == kind)
    }

    /// Case-insensitive match on title, summary or any tag.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a ManifestEntry> + use<'a> {
        let query = query.to_lowercase();

        self.entries().iter().filter(move |entry| {
            entry.title.to_lowercase().contains(&query)
                || entry.summary.to_lowercase().contains(&query)
                || entry.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
        })
    }

    pub fn find(&self, slug: &str) -> Option<&ManifestEntry> {
        self.entries().iter().find(|entry| entry.slug == slug)
    }

    /// Loads the compiled roadmap behind `slug`. Unknown slugs and roadmaps
    /// listed in the manifest but missing on disk both give `None`.
    pub fn load(&self, slug: &str) -> Result<Option<CompiledRoadmap>, CatalogError> {
        let Some(entry) = self.find(slug) else {
            return Ok(None);
        };

        let path = self.content_root.join(&entry.path).join(COMPILED_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CatalogError::Read(path, e)),
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CatalogError::Parse(path, e))
    }
}

/// Edges touching one node.
#[derive(Debug, Default)]
pub struct NodeEdges<'a> {
    pub incoming: Vec<&'a RoadmapEdge>,
    pub outgoing: Vec<&'a RoadmapEdge>,
}

impl CompiledRoadmap {
    pub fn node(&self, id: &str) -> Option<&RoadmapNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn resource(&self, id: &str) -> Option<&RoadmapResource> {
        self.resources.iter().find(|resource| resource.id == id)
    }

    pub fn node_edges(&self, id: &str) -> NodeEdges<'_> {
        let mut edges = NodeEdges::default();
        for edge in &self.edges {
            if edge.to == id {
                edges.incoming.push(edge);
            }
            if edge.from == id {
                edges.outgoing.push(edge);
            }
        }
        edges
    }

    /// Nodes listed as prerequisites of `id` that exist in this roadmap.
    pub fn prerequisites(&self, id: &str) -> Vec<&RoadmapNode> {
        self.node(id)
            .map(|node| {
                node.prerequisites()
                    .iter()
                    .filter_map(|prerequisite| self.node(prerequisite))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes that list `id` as a prerequisite.
    pub fn dependents(&self, id: &str) -> Vec<&RoadmapNode> {
        self.nodes
            .iter()
            .filter(|node| node.prerequisites().iter().any(|p| p == id))
            .collect()
    }

    /// Re-checks edge endpoints and resource references of a compiled
    /// artifact.
    pub fn integrity_errors(&self) -> Vec<IntegrityError> {
        let node_ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let resource_ids: HashSet<&str> = self.resources.iter().map(|r| r.id.as_str()).collect();

        let mut errors = check_edges(&node_ids, &self.edges);
        for node in &self.nodes {
            for resource in &node.resources {
                if !resource_ids.contains(resource.as_str()) {
                    errors.push(IntegrityError::MissingResource {
                        node: node.id.clone(),
                        resource: resource.clone(),
                    });
                }
            }
        }
        errors
    }
}
