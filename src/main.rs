mod analyzers;
mod config;
mod error;
mod git;
mod pipeline;
mod reporters;
mod table;
mod types;
mod viz;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::io;
use std::time::{Duration, Instant};

use config::{HotspotConfig, DEFAULT_CONFIG_FILE};
use pipeline::trend::TrendRange;
use pipeline::{fmt_dur, PipelineOptions};

#[derive(Parser, Debug)]
#[command(
    name = "hotspot-map",
    about = "Mine git history and line counts into a zoomable code-hotspot map",
    version,
    long_about = "Runs git log, change-frequency analysis and cloc over a folder of a\n\
                  repository, merges the results into a nested hotspot tree\n\
                  (generated/hotspots.json) and renders it as a zoomable\n\
                  circle-packing map (hotspots.html, hotspots.svg).\n\n\
                  Settings are read from .hotspot-map.yml when present;\n\
                  command-line flags always win."
)]
struct Args {
    /// Folder to analyze, relative to the repository root.
    #[arg(long)]
    folder: Option<String>,

    /// Only include commits after this point, e.g. "3 months" or "2024-01-01".
    #[arg(long)]
    since: Option<String>,

    /// Repository to mine (defaults to the current directory).
    #[arg(long)]
    repo: Option<String>,

    /// Directory receiving every artifact.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// YAML config file. Defaults to .hotspot-map.yml if it exists.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print an annotated config template (or write it to PATH) and exit.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    generate_config: Option<String>,

    /// Skip the analysis and re-render the map from an existing hotspots.json.
    #[arg(long, conflicts_with = "no_render")]
    render_only: bool,

    /// Stop after writing hotspots.json.
    #[arg(long)]
    no_render: bool,

    /// Print the indentation-complexity trend of FILE over --start..--end
    /// as CSV (rev,n,total,mean,sd) and exit.
    #[arg(
        long,
        value_name = "FILE",
        requires_all = ["start", "end"],
        conflicts_with_all = ["render_only", "no_render"]
    )]
    complexity_trend: Option<String>,

    /// First revision of the trend range (exclusive, as in git's start..end).
    #[arg(long, value_name = "REV", requires = "complexity_trend")]
    start: Option<String>,

    /// Last revision of the trend range.
    #[arg(long, value_name = "REV", requires = "complexity_trend")]
    end: Option<String>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run_cli(args) {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run_cli(args: Args) -> Result<(), String> {
    if let Some(target) = &args.generate_config {
        let path = (!target.is_empty()).then(|| Path::new(target));
        config::print_template(path)?;
        if let Some(p) = path {
            eprintln!("✓ Config template written to {}", p.display());
        }
        return Ok(());
    }

    let cfg = load_config(args.config.as_deref())?;
    let opts = resolve_options(&args, &cfg);

    if args.render_only {
        let started = Instant::now();
        let tree = pipeline::render_only(&opts).map_err(|e| e.to_string())?;
        let paths = types::ArtifactPaths::new(&opts.output_dir);
        eprintln!(
            "✓ Rendered {} and {} ({} files) in {}",
            paths.hotspots_html.display(),
            paths.hotspots_svg.display(),
            opts.meta(&tree).file_count,
            fmt_dur(started.elapsed())
        );
        return Ok(());
    }

    if let Some(range) = trend_range(&args) {
        return run_trend(&opts, &range);
    }

    let pb = spinner();
    let started = Instant::now();
    let result = pipeline::run(&opts, &pb);
    pb.finish_and_clear();
    let outcome = result.map_err(|e| e.to_string())?;

    let meta = opts.meta(&outcome.tree);
    reporters::terminal::report_hotspots(&meta, &outcome.tree, 15);

    let history = outcome
        .summary
        .as_ref()
        .map(|s| format!(" from {} commits by {} authors", s.commits, s.authors))
        .unwrap_or_default();
    eprintln!(
        "✔ {} files{history} mapped into {} — ⏱ {}",
        meta.file_count,
        outcome.artifacts.dir.display().to_string().cyan(),
        fmt_dur(started.elapsed())
    );
    for artifact in outcome.artifacts.chain() {
        eprintln!("   · {}", artifact.display());
    }
    if opts.render {
        eprintln!("   → {}", outcome.artifacts.hotspots_html.display());
    }
    Ok(())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn trend_range(args: &Args) -> Option<TrendRange> {
    Some(TrendRange {
        file: args.complexity_trend.clone()?,
        start: args.start.clone().unwrap_or_default(),
        end: args.end.clone().unwrap_or_default(),
    })
}

/// CSV goes to stdout; progress and tool warnings to stderr.
fn run_trend(opts: &PipelineOptions, range: &TrendRange) -> Result<(), String> {
    let pb = spinner();
    let started = Instant::now();
    let result = pipeline::trend::complexity_trend(opts, range, &pb);
    pb.finish_and_clear();
    let trend = result.map_err(|e| e.to_string())?;

    analyzers::complexity::write_trend(&trend, io::stdout().lock())
        .map_err(|e| format!("Cannot write trend: {e}"))?;
    let deepest = trend.iter().map(|r| r.max).fold(0.0, f64::max);
    eprintln!(
        "✓ {} revisions of {} measured (deepest indent {deepest}) in {}",
        trend.len(),
        range.file,
        fmt_dur(started.elapsed())
    );
    Ok(())
}

/// Explicit `--config` must exist; the default file is optional.
fn load_config(explicit: Option<&Path>) -> Result<HotspotConfig, String> {
    match explicit {
        Some(path) => config::load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                config::load_config(default)
            } else {
                Ok(HotspotConfig::default())
            }
        }
    }
}

/// CLI flags over config values over built-in defaults.
fn resolve_options(args: &Args, cfg: &HotspotConfig) -> PipelineOptions {
    let defaults = PipelineOptions::default();
    PipelineOptions {
        repo: args
            .repo
            .as_deref()
            .or(cfg.repo.as_deref())
            .map(config::expand_home)
            .unwrap_or(defaults.repo),
        folder: args.folder.clone().or_else(|| cfg.folder.clone()).unwrap_or(defaults.folder),
        since: args.since.clone().or_else(|| cfg.since.clone()).unwrap_or(defaults.since),
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| cfg.output_dir.as_deref().map(config::expand_home))
            .unwrap_or(defaults.output_dir),
        analysis: cfg.analysis_mode(),
        transform: cfg.transform_mode(),
        normalize_renames: cfg.normalize_renames.unwrap_or(defaults.normalize_renames),
        scripts_dir: cfg.scripts_dir.as_deref().map(config::expand_home).unwrap_or(defaults.scripts_dir),
        tools: cfg.tools(),
        render: !args.no_render,
    }
}
