//! The top-level index of compiled roadmaps.

use std::fs;

use camino::Utf8Path;
use chrono::Utc;

use crate::error::ManifestError;
use crate::model::{Manifest, ManifestEntry};

/// Format version stamped into every manifest.
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Collects entries while roadmaps compile. Owned by whoever drives the
/// build, and written out once at the end.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    entries: Vec<ManifestEntry>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> Vec<ManifestEntry> {
        self.entries
    }
}

/// Overwrites the manifest at `path` with `entries`.
pub fn write_manifest(
    path: &Utf8Path,
    entries: Vec<ManifestEntry>,
) -> Result<Manifest, ManifestError> {
    let manifest = Manifest {
        roadmaps: entries,
        generated_at: Utc::now(),
        version: MANIFEST_VERSION.to_string(),
    };

    let json = serde_json::to_string_pretty(&manifest)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ManifestError::Write(path.to_owned(), e))?;
    }
    fs::write(path, json).map_err(|e| ManifestError::Write(path.to_owned(), e))?;

    Ok(manifest)
}

pub fn read_manifest(path: &Utf8Path) -> Result<Manifest, ManifestError> {
    let text = fs::read_to_string(path).map_err(|e| ManifestError::Read(path.to_owned(), e))?;
    Ok(serde_json::from_str(&text)?)
}
