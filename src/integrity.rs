//! Referential integrity of a single roadmap.
//!
//! Runs on documents that already passed their schemas. Nothing here stops
//! early: every broken reference is collected so a single run shows the whole
//! picture.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::IntegrityError;
use crate::model::{EdgeKind, RoadmapEdge, RoadmapMeta, RoadmapNode, RoadmapResource};

/// Reports every repeated id in `ids`. The first occurrence is the original,
/// each later one is a separate violation.
pub fn check_duplicate_ids<'a>(
    collection: &'static str,
    ids: impl IntoIterator<Item = &'a str>,
) -> Vec<IntegrityError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for id in ids {
        if !seen.insert(id) {
            errors.push(IntegrityError::DuplicateId {
                collection,
                id: id.to_string(),
            });
        }
    }

    errors
}

/// Checks uniqueness within each collection and every cross-collection
/// reference, in that order.
pub fn check_integrity(
    meta: &RoadmapMeta,
    nodes: &[RoadmapNode],
    edges: &[RoadmapEdge],
    resources: &[RoadmapResource],
) -> Vec<IntegrityError> {
    let _span = tracing::debug_span!("integrity", roadmap = %meta.id).entered();

    let mut errors = Vec::new();

    errors.extend(check_duplicate_ids("nodes", nodes.iter().map(|n| n.id.as_str())));
    errors.extend(check_duplicate_ids("edges", edges.iter().map(|e| e.id.as_str())));
    errors.extend(check_duplicate_ids(
        "resources",
        resources.iter().map(|r| r.id.as_str()),
    ));

    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    errors.extend(check_edges(&node_ids, edges));

    let resource_ids: HashSet<&str> = resources.iter().map(|r| r.id.as_str()).collect();
    for node in nodes {
        for resource in &node.resources {
            if !resource_ids.contains(resource.as_str()) {
                errors.push(IntegrityError::MissingResource {
                    node: node.id.clone(),
                    resource: resource.clone(),
                });
            }
        }
    }

    for node in nodes {
        for prerequisite in node.prerequisites() {
            if !node_ids.contains(prerequisite.as_str()) {
                errors.push(IntegrityError::MissingPrerequisite {
                    node: node.id.clone(),
                    prerequisite: prerequisite.clone(),
                });
            }
        }
    }

    tracing::debug!(errors = errors.len(), "integrity checked");
    errors
}

/// One error per dangling endpoint.
pub(crate) fn check_edges(node_ids: &HashSet<&str>, edges: &[RoadmapEdge]) -> Vec<IntegrityError> {
    let mut errors = Vec::new();

    for edge in edges {
        if !node_ids.contains(edge.from.as_str()) {
            errors.push(IntegrityError::DanglingEdgeSource {
                edge: edge.id.clone(),
                node: edge.from.clone(),
            });
        }
        if !node_ids.contains(edge.to.as_str()) {
            errors.push(IntegrityError::DanglingEdgeTarget {
                edge: edge.id.clone(),
                node: edge.to.clone(),
            });
        }
    }

    errors
}

/// Stricter rule, off by default: prerequisite chains and `requires` edges
/// must not loop. Each cycle is reported once, as the set of nodes on it.
pub fn check_cycles(nodes: &[RoadmapNode], edges: &[RoadmapEdge]) -> Vec<IntegrityError> {
    let prerequisites = nodes.iter().flat_map(|node| {
        node.prerequisites()
            .iter()
            .map(move |prerequisite| (prerequisite.as_str(), node.id.as_str()))
    });

    let requires = edges
        .iter()
        .filter(|edge| edge.kind == EdgeKind::Requires)
        .map(|edge| (edge.from.as_str(), edge.to.as_str()));

    let mut errors = Vec::new();

    for cycle in find_cycles(nodes, prerequisites) {
        errors.push(IntegrityError::PrerequisiteCycle { nodes: cycle });
    }
    for cycle in find_cycles(nodes, requires) {
        errors.push(IntegrityError::RequiresCycle { nodes: cycle });
    }

    errors
}

fn find_cycles<'a>(
    nodes: &'a [RoadmapNode],
    arcs: impl Iterator<Item = (&'a str, &'a str)>,
) -> Vec<Vec<String>> {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for node in nodes {
        index
            .entry(node.id.as_str())
            .or_insert_with(|| graph.add_node(node.id.as_str()));
    }

    // dangling ids are reported elsewhere
    for (from, to) in arcs {
        if let (Some(&a), Some(&b)) = (index.get(from), index.get(to)) {
            graph.update_edge(a, b, ());
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .map(|component| {
            component
                .into_iter()
                .map(|i| graph[i].to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
        .collect();

    cycles.sort();
    cycles
}
