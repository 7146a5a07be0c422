//! Constraints that span every roadmap in the content tree.

use std::collections::HashSet;

use camino::Utf8PathBuf;

use crate::error::GlobalError;
use crate::model::RoadmapMeta;

/// One roadmap seen during a walk, kept for the checks run at the end.
#[derive(Debug, Clone)]
pub struct RoadmapRecord {
    /// Directory the roadmap was loaded from.
    pub location: Utf8PathBuf,
    pub meta: RoadmapMeta,
}

/// Roadmaps accumulated over a walk, in the order they were visited.
///
/// Records are kept as a list rather than keyed by id; keying by id would
/// fold two roadmaps sharing an id into one before the check could see them.
#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<RoadmapRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<Utf8PathBuf>, meta: RoadmapMeta) {
        self.records.push(RoadmapRecord {
            location: location.into(),
            meta,
        });
    }

    pub fn records(&self) -> &[RoadmapRecord] {
        &self.records
    }
}

/// No two roadmaps may share an id, and no two may share a slug.
pub fn validate_global_constraints(registry: &Registry) -> Vec<GlobalError> {
    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();
    let mut errors = Vec::new();

    for RoadmapRecord { location, meta } in registry.records() {
        if !ids.insert(meta.id.as_str()) {
            errors.push(GlobalError::DuplicateRoadmapId {
                id: meta.id.clone(),
                location: location.clone(),
            });
        }
        if !slugs.insert(meta.slug.as_str()) {
            errors.push(GlobalError::DuplicateSlug {
                slug: meta.slug.clone(),
                location: location.clone(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(id: &str, slug: &str) -> RoadmapMeta {
        serde_json::from_value(json!({
            "id": id,
            "slug": slug,
            "title": id,
            "type": "skill",
            "summary": ""
        }))
        .unwrap()
    }

    #[test]
    fn distinct_roadmaps_pass() {
        let mut registry = Registry::new();
        registry.insert("skills/react", meta("react", "react"));
        registry.insert("skills/vue", meta("vue", "vue"));

        assert!(validate_global_constraints(&registry).is_empty());
    }

    #[test]
    fn shared_slug_is_reported_once() {
        let mut registry = Registry::new();
        registry.insert("roles/fe", meta("fe", "frontend-developer"));
        registry.insert("roles/frontend", meta("frontend", "frontend-developer"));

        assert_eq!(
            validate_global_constraints(&registry),
            vec![GlobalError::DuplicateSlug {
                slug: "frontend-developer".into(),
                location: "roles/frontend".into(),
            }]
        );
    }

    #[test]
    fn shared_id_is_reported() {
        let mut registry = Registry::new();
        registry.insert("roles/a", meta("fe", "a"));
        registry.insert("roles/b", meta("fe", "b"));
        registry.insert("roles/c", meta("fe", "c"));

        assert_eq!(
            validate_global_constraints(&registry),
            vec![
                GlobalError::DuplicateRoadmapId {
                    id: "fe".into(),
                    location: "roles/b".into(),
                },
                GlobalError::DuplicateRoadmapId {
                    id: "fe".into(),
                    location: "roles/c".into(),
                },
            ]
        );
    }
}
