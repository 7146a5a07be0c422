use std::time::Instant;

use camino::Utf8PathBuf;
use tracing::{Level, error, info};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::compile::Compiler;
use crate::config::Config;
use crate::content::discover;
use crate::error::{BuildError, CompileError};
use crate::manifest::{ManifestBuilder, write_manifest};
use crate::utils::{PROGRESS_STYLE, as_overhead};

/// Outcome of a build run.
#[derive(Debug)]
pub struct BuildSummary {
    /// Roadmaps compiled and listed in the manifest.
    pub built: usize,
    /// Roadmaps skipped, by `category/roadmap` name.
    pub failures: Vec<(String, CompileError)>,
    pub manifest: Utf8PathBuf,
}

/// Compiles every roadmap under the content root and writes the manifest.
///
/// Roadmaps are processed one at a time in sorted order. A roadmap that fails
/// to compile is logged and skipped. Only an unreadable content root or an
/// unwritable manifest fail the whole run.
pub fn build(config: &Config) -> Result<BuildSummary, BuildError> {
    let s = Instant::now();
    let dirs = discover(&config.content_root)?;

    let span = tracing::span!(Level::INFO, "build");
    span.pb_set_length(dirs.len() as u64);
    span.pb_set_style(&PROGRESS_STYLE);
    span.pb_set_message("Compiling roadmaps...");
    let _enter = span.enter();

    let compiler = Compiler::new(config);
    let mut manifest = ManifestBuilder::new();
    let mut failures = Vec::new();

    for dir in dirs {
        let start = Instant::now();

        match compiler.compile(&dir, &mut manifest) {
            Ok(compiled) => info!(
                "Built {} ({} nodes) {}",
                dir.name,
                compiled.nodes.len(),
                as_overhead(start)
            ),
            Err(e) => {
                error!("Failed to build {}: {e}", dir.name);
                failures.push((dir.name, e));
            }
        }

        span.pb_inc(1);
    }

    let built = manifest.len();
    write_manifest(&config.manifest_path, manifest.finish())?;

    info!(
        "Manifest written to {} with {built} roadmap(s) {}",
        config.manifest_path,
        as_overhead(s)
    );

    Ok(BuildSummary {
        built,
        failures,
        manifest: config.manifest_path.clone(),
    })
}
