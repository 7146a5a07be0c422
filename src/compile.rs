//! Turning one roadmap directory into `roadmap.compiled.json`.

use std::collections::BTreeSet;
use std::fs;

use camino::Utf8Path;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::content::{RoadmapDir, RoadmapDocuments, load_layout};
use crate::error::CompileError;
use crate::layout::{Direction, LayoutBackend, Layered, compute_layout};
use crate::manifest::ManifestBuilder;
use crate::model::{CompiledRoadmap, LayoutData, ManifestEntry, RoadmapEdge, RoadmapNode};
use crate::schema::SchemaKind;

pub struct Compiler {
    backend: Box<dyn LayoutBackend>,
    direction: Direction,
}

impl Compiler {
    pub fn new(config: &Config) -> Self {
        Self {
            backend: Box::new(Layered::new(config.layout)),
            direction: config.direction,
        }
    }

    /// Uses a different layout algorithm for roadmaps without a layout.
    pub fn with_backend(backend: Box<dyn LayoutBackend>, direction: Direction) -> Self {
        Self { backend, direction }
    }

    /// Compiles a single roadmap and records it in `manifest`.
    ///
    /// Missing or broken documents abort this roadmap only, the caller is
    /// expected to log the error and move on. Layout problems never abort,
    /// the roadmap is compiled with an empty layout instead.
    pub fn compile(
        &self,
        dir: &RoadmapDir,
        manifest: &mut ManifestBuilder,
    ) -> Result<CompiledRoadmap, CompileError> {
        let RoadmapDocuments {
            meta,
            nodes,
            edges,
            resources,
        } = RoadmapDocuments::load(dir)?;

        let layout = match load_layout(dir) {
            Ok(Some(layout)) => {
                report_stale(&dir.name, &layout, &nodes);
                layout
            }
            Ok(None) => self.fresh_layout(dir, &nodes, &edges)?,
            Err(e) => {
                warn!("{e}");
                warn!("{}: compiling without a layout", dir.name);
                LayoutData::default()
            }
        };

        let compiled = CompiledRoadmap {
            meta,
            nodes,
            edges,
            resources,
            layout,
            compiled_at: Utc::now(),
        };

        write_json(&dir.compiled(), &compiled)?;
        manifest.push(ManifestEntry::from_meta(&compiled.meta, dir.name.as_str()));

        Ok(compiled)
    }

    /// Computes a layout and saves it next to the content so later builds
    /// reuse it.
    fn fresh_layout(
        &self,
        dir: &RoadmapDir,
        nodes: &[RoadmapNode],
        edges: &[RoadmapEdge],
    ) -> Result<LayoutData, CompileError> {
        let layout = match compute_layout(self.backend.as_ref(), nodes, edges, self.direction) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("{}: layout failed, compiling without one. {e}", dir.name);
                return Ok(LayoutData::default());
            }
        };

        write_json(&dir.document(SchemaKind::Layout), &layout)?;
        info!(
            "{}: computed {} layout for {} nodes",
            dir.name,
            self.backend.algorithm(),
            nodes.len()
        );

        Ok(layout)
    }
}

fn write_json(path: &Utf8Path, value: &impl Serialize) -> Result<(), CompileError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CompileError::Serialize(path.to_owned(), e))?;
    fs::write(path, json).map_err(|e| CompileError::Write(path.to_owned(), e))
}

/// Layouts on disk are trusted, but drift from the node set is worth a note.
fn report_stale(name: &str, layout: &LayoutData, nodes: &[RoadmapNode]) {
    let Some(breakpoints) = &layout.breakpoints else {
        return;
    };

    let current: BTreeSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let placed: BTreeSet<&str> = [&breakpoints.mobile, &breakpoints.tablet, &breakpoints.desktop]
        .into_iter()
        .flatten()
        .flat_map(|placement| placement.nodes.keys().map(String::as_str))
        .collect();

    let removed: Vec<_> = placed.difference(&current).collect();
    let unplaced: Vec<_> = current.difference(&placed).collect();

    if !removed.is_empty() || !unplaced.is_empty() {
        debug!(
            "{name}: layout is stale, placed but gone: {removed:?}, present but unplaced: {unplaced:?}"
        );
    }
}
