#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod build;
pub mod catalog;
mod compile;
mod config;
pub mod content;
mod error;
pub mod global;
pub mod integrity;
pub mod layout;
pub mod manifest;
pub mod model;
pub mod schema;
mod utils;
pub mod validate;

pub use crate::build::{BuildSummary, build};
pub use crate::catalog::{Catalog, NodeEdges};
pub use crate::compile::Compiler;
pub use crate::config::Config;
pub use crate::error::*;
pub use crate::layout::{Direction, LayoutBackend, LayoutOptions, Layered, compute_layout};
pub use crate::manifest::{ManifestBuilder, read_manifest, write_manifest};
pub use crate::model::{CompiledRoadmap, LayoutData, Manifest, ManifestEntry, RoadmapMeta};
pub use crate::utils::as_overhead;
pub use crate::validate::{ContentValidator, Issue, Report, validate_tree};
