use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use michishirube::model::RoadmapKind;
use michishirube::{Catalog, Config, Direction, as_overhead, build, validate_tree};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding `category/roadmap` directories.
    #[arg(long, global = true, default_value = "content/roadmaps")]
    root: Utf8PathBuf,

    /// Path of the manifest.
    #[arg(long, global = true, default_value = "content/manifest.json")]
    manifest: Utf8PathBuf,

    /// Flow of computed layouts: down, up, right or left.
    #[arg(long, global = true, default_value = "down")]
    direction: Direction,

    /// Also reject cycles among prerequisites and `requires` edges.
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every roadmap without writing anything.
    Validate,
    /// Compile every roadmap and write the manifest.
    Build,
    /// Search built roadmaps by title, summary or tag.
    Search {
        query: String,
        #[arg(long = "type", value_enum)]
        kind: Option<Kind>,
    },
    /// Print a summary of one built roadmap.
    Show { slug: String },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Kind {
    Role,
    Skill,
}

impl From<Kind> for RoadmapKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Role => RoadmapKind::Role,
            Kind::Skill => RoadmapKind::Skill,
        }
    }
}

fn init_logging() {
    let indicatif = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(indicatif.get_stderr_writer()))
        .with(indicatif)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging();

    let config = Config::new()
        .content_root(&args.root)
        .manifest_path(&args.manifest)
        .direction(args.direction)
        .strict(args.strict);

    match args.command {
        Command::Validate => Ok(validate(&config)),
        Command::Build => run_build(&config),
        Command::Search { query, kind } => search(&config, &query, kind.map(Into::into)),
        Command::Show { slug } => show(&config, &slug),
    }
}

fn validate(config: &Config) -> ExitCode {
    let s = Instant::now();
    let report = validate_tree(config);

    for issue in &report.issues {
        eprintln!("❌ [{}] {issue}", issue.kind);
    }

    let counts = report
        .counts()
        .into_iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");

    if report.is_ok() {
        eprintln!(
            "{} {} roadmap(s) validated {}",
            style("✔").green(),
            report.roadmaps,
            as_overhead(s)
        );
        ExitCode::SUCCESS
    } else {
        eprintln!(
            "{} {} error(s) in {} roadmap(s) ({counts}) {}",
            style("✘").red(),
            report.issues.len(),
            report.roadmaps,
            as_overhead(s)
        );
        ExitCode::FAILURE
    }
}

fn run_build(config: &Config) -> anyhow::Result<ExitCode> {
    let s = Instant::now();
    let summary = build(config).context("Build failed")?;

    eprintln!(
        "{} Built {} roadmap(s), skipped {}, manifest at {} {}",
        style("✔").green(),
        summary.built,
        summary.failures.len(),
        summary.manifest,
        as_overhead(s)
    );

    for (name, _) in &summary.failures {
        eprintln!("  {} {name}", style("skipped").yellow());
    }

    Ok(ExitCode::SUCCESS)
}

fn search(config: &Config, query: &str, kind: Option<RoadmapKind>) -> anyhow::Result<ExitCode> {
    let catalog = Catalog::open(&config.manifest_path, &config.content_root)
        .context("Couldn't open the manifest, run `build` first")?;

    let hits: Vec<_> = catalog
        .search(query)
        .filter(|entry| kind.is_none_or(|kind| entry.kind == kind))
        .collect();

    for entry in &hits {
        println!(
            "{} {} ({}) {}",
            style(&entry.slug).bold(),
            entry.title,
            entry.kind,
            style(&entry.summary).dim()
        );
    }
    eprintln!("{} match(es)", hits.len());

    Ok(ExitCode::SUCCESS)
}

fn show(config: &Config, slug: &str) -> anyhow::Result<ExitCode> {
    let catalog = Catalog::open(&config.manifest_path, &config.content_root)
        .context("Couldn't open the manifest, run `build` first")?;

    let Some(roadmap) = catalog.load(slug)? else {
        eprintln!("{} no roadmap with slug '{slug}'", style("✘").red());
        return Ok(ExitCode::FAILURE);
    };

    println!("{} ({})", style(&roadmap.meta.title).bold(), roadmap.meta.kind);
    println!("{}", roadmap.meta.summary);
    println!(
        "{} nodes, {} edges, {} resources, compiled {}",
        roadmap.nodes.len(),
        roadmap.edges.len(),
        roadmap.resources.len(),
        roadmap.compiled_at.to_rfc3339()
    );

    for node in &roadmap.nodes {
        let edges = roadmap.node_edges(&node.id);
        println!(
            "  {} {} [{} in, {} out]",
            style(&node.id).cyan(),
            node.title,
            edges.incoming.len(),
            edges.outgoing.len()
        );
    }

    for error in roadmap.integrity_errors() {
        eprintln!("❌ {error}");
    }

    Ok(ExitCode::SUCCESS)
}
