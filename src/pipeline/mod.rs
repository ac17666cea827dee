//! The hotspot pipeline: git history → change frequency → line counts →
//! merged effort table → enclosure tree → rendered map.
//!
//! Stages run strictly one after another. Each stage finishes writing its
//! artifact (flushed and closed) before the next one starts, and the first
//! failure stops the run.

pub mod process;
pub mod trend;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use colored::Colorize;
use indicatif::ProgressBar;

use crate::analyzers::{effort, enclosure, lines, revisions, summary};
use crate::config::{AnalysisMode, Tools, TransformMode};
use crate::error::{PipelineError, Result, Stage};
use crate::git::{log_parser, renames};
use crate::reporters;
use crate::types::{ArtifactPaths, Commit, HotspotTree, LogSummary, ReportMeta};
use crate::viz::pack::PackLayout;
use crate::viz::svg::SvgRenderer;
use crate::viz::view::ViewController;
use crate::viz::{FrameRenderer, LayoutEngine};
use process::{capture_to_file, run_inherit, Invocation};

/// Fully resolved run settings (CLI over config file over defaults).
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub repo: PathBuf,
    pub folder: String,
    pub since: String,
    pub output_dir: PathBuf,
    pub analysis: AnalysisMode,
    pub transform: TransformMode,
    pub normalize_renames: bool,
    pub scripts_dir: PathBuf,
    pub tools: Tools,
    pub render: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            repo: PathBuf::from("."),
            folder: ".".to_string(),
            since: "3 months".to_string(),
            output_dir: PathBuf::from("generated"),
            analysis: AnalysisMode::Builtin,
            transform: TransformMode::Builtin,
            normalize_renames: true,
            scripts_dir: PathBuf::from("scripts"),
            tools: Tools::default(),
            render: true,
        }
    }
}

impl PipelineOptions {
    fn validate(&self) -> Result<()> {
        if self.folder.trim().is_empty() {
            return Err(PipelineError::Config("folder must not be empty".to_string()));
        }
        if self.since.trim().is_empty() {
            return Err(PipelineError::Config("since must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn meta(&self, tree: &HotspotTree) -> ReportMeta {
        ReportMeta {
            repo: self.repo.display().to_string(),
            folder: self.folder.clone(),
            since: self.since.clone(),
            file_count: if tree.is_leaf() { 0 } else { tree.leaves().len() },
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub artifacts: ArtifactPaths,
    pub tree: HotspotTree,
    /// Set when the summary was computed in-process.
    pub summary: Option<LogSummary>,
}

// ── Progress ───────────────────────────────────────────────────────────────────

/// `[n/N]` step reporting on the spinner, one `✓` line per finished step.
struct Steps<'a> {
    pb: &'a ProgressBar,
    total: usize,
    index: usize,
    label: &'static str,
    started: Instant,
}

impl<'a> Steps<'a> {
    fn new(pb: &'a ProgressBar, total: usize) -> Self {
        Steps { pb, total, index: 0, label: "", started: Instant::now() }
    }

    fn begin(&mut self, label: &'static str) {
        self.index += 1;
        self.label = label;
        self.started = Instant::now();
        self.pb.set_message(format!("[{}/{}] {label}...", self.index, self.total));
    }

    fn done(&self) {
        let step = format!("[{}/{}] {}", self.index, self.total, self.label);
        self.pb.println(format!("  ✓ {step:<44} {}", fmt_dur(self.started.elapsed())));
    }
}

pub fn fmt_dur(d: Duration) -> String {
    let ms = d.as_millis();
    if ms >= 1000 { format!("{:.1}s", d.as_secs_f64()) } else { format!("{ms}ms") }
}

// ── Orchestration ──────────────────────────────────────────────────────────────

pub fn run(opts: &PipelineOptions, pb: &ProgressBar) -> Result<Outcome> {
    opts.validate()?;
    let paths = ensure_output_directory(&opts.output_dir)?;
    let total = 6 + usize::from(opts.normalize_renames) + usize::from(opts.render);
    let mut steps = Steps::new(pb, total);

    steps.begin("Collecting revision history");
    collect_revision_history(opts, &paths.revision_log, pb)?;
    steps.done();

    if opts.normalize_renames {
        steps.begin("Normalizing renames");
        normalize_renames(&paths.revision_log)?;
        steps.done();
    }

    steps.begin("Summarizing history");
    let log_summary = summarize(opts, &paths.revision_log, pb)?;
    steps.done();

    steps.begin("Computing change frequency");
    compute_change_frequency(opts, &paths.revision_log, &paths.frequencies, pb)?;
    steps.done();

    steps.begin("Counting lines of code");
    compute_line_metrics(opts, &paths.lines, pb)?;
    steps.done();

    steps.begin("Merging complexity and effort");
    merge_metrics(opts, &paths.frequencies, &paths.lines, &paths.complexity_effort, pb)?;
    steps.done();

    steps.begin("Building hotspot tree");
    let tree = build_hotspot_tree(opts, &paths.lines, &paths.complexity_effort, &paths.hotspots_json, pb)?;
    steps.done();

    if opts.render {
        steps.begin("Rendering hotspot map");
        render_visualization(&paths, &opts.meta(&tree))?;
        steps.done();
    }

    Ok(Outcome { artifacts: paths, tree, summary: log_summary })
}

/// Re-renders the map from an existing `hotspots.json`.
pub fn render_only(opts: &PipelineOptions) -> Result<HotspotTree> {
    let paths = ArtifactPaths::new(&opts.output_dir);
    let tree = read_tree(&paths.hotspots_json)?;
    render_visualization(&paths, &opts.meta(&tree))
}

// ── Stages ─────────────────────────────────────────────────────────────────────

/// Creates the output directory (and parents). An existing directory is fine.
pub fn ensure_output_directory(dir: &Path) -> Result<ArtifactPaths> {
    fs::create_dir_all(dir).map_err(|source| PipelineError::Setup { path: dir.to_path_buf(), source })?;
    Ok(ArtifactPaths::new(dir))
}

/// `git log` for the folder and time window, captured to `repo.log`.
pub fn collect_revision_history(opts: &PipelineOptions, dest: &Path, pb: &ProgressBar) -> Result<()> {
    let inv = Invocation {
        stage: Stage::History,
        tool: &opts.tools.git,
        args: log_parser::history_args(&opts.folder, &opts.since),
        cwd: Some(&opts.repo),
    };
    capture_relayed(&inv, dest, pb)
}

/// Rewrites rename notations in the log in place. Returns the number of
/// numstat rows whose path changed.
pub fn normalize_renames(log: &Path) -> Result<usize> {
    let tmp = log.with_extension("log.tmp");
    let reader = open(Stage::Renames, log)?;
    let file = File::create(&tmp).map_err(|e| PipelineError::io(Stage::Renames, &tmp, e))?;
    let mut writer = BufWriter::new(file);
    let rewritten = renames::rewrite_log(reader, &mut writer)
        .map_err(|e| PipelineError::io(Stage::Renames, log, e))?;
    finish_writer(Stage::Renames, &tmp, writer)?;
    fs::rename(&tmp, log).map_err(|e| PipelineError::io(Stage::Renames, log, e))?;
    Ok(rewritten)
}

/// Prints overall log statistics. Side effect only; the builtin variant
/// also hands the numbers back.
pub fn summarize(opts: &PipelineOptions, log: &Path, pb: &ProgressBar) -> Result<Option<LogSummary>> {
    match opts.analysis {
        AnalysisMode::Maat => {
            let inv = Invocation {
                stage: Stage::Summary,
                tool: &opts.tools.maat,
                args: maat_args(log, "summary"),
                cwd: None,
            };
            let stderr = pb.suspend(|| run_inherit(&inv))?;
            relay_stderr(pb, Stage::Summary, &stderr);
            Ok(None)
        }
        AnalysisMode::Builtin => {
            let commits = read_commits(Stage::Summary, log)?;
            let stats = summary::analyze_summary(&commits);
            pb.suspend(|| reporters::terminal::report_summary(&stats));
            Ok(Some(stats))
        }
    }
}

/// Revisions per entity, written to `maat_freqs.csv`.
pub fn compute_change_frequency(opts: &PipelineOptions, log: &Path, dest: &Path, pb: &ProgressBar) -> Result<()> {
    match opts.analysis {
        AnalysisMode::Maat => {
            let inv = Invocation {
                stage: Stage::Revisions,
                tool: &opts.tools.maat,
                args: maat_args(log, "revisions"),
                cwd: None,
            };
            capture_relayed(&inv, dest, pb)
        }
        AnalysisMode::Builtin => {
            let commits = read_commits(Stage::Revisions, log)?;
            let rows = revisions::analyze_revisions(&commits);
            write_artifact(Stage::Revisions, dest, |w| revisions::write_revisions(&rows, w))
        }
    }
}

/// cloc per-file line counts for the folder, written to `maat_lines.csv`.
pub fn compute_line_metrics(opts: &PipelineOptions, dest: &Path, pb: &ProgressBar) -> Result<()> {
    let inv = Invocation {
        stage: Stage::Lines,
        tool: &opts.tools.cloc,
        args: lines::cloc_args(&opts.folder),
        cwd: Some(&opts.repo),
    };
    capture_relayed(&inv, dest, pb)
}

/// Joins frequencies with line counts into `complexity_effort.csv`.
pub fn merge_metrics(
    opts: &PipelineOptions,
    freqs: &Path,
    line_table: &Path,
    dest: &Path,
    pb: &ProgressBar,
) -> Result<()> {
    match opts.transform {
        TransformMode::Scripts => {
            let script = opts.scripts_dir.join("merge").join("merge_comp_freqs.py");
            let inv = Invocation {
                stage: Stage::Merge,
                tool: &opts.tools.python,
                args: vec![path_arg(&script), path_arg(freqs), path_arg(line_table)],
                cwd: None,
            };
            capture_relayed(&inv, dest, pb)
        }
        TransformMode::Builtin => {
            let revs = parse_table(Stage::Merge, freqs, revisions::read_revisions)?;
            let counts = parse_table(Stage::Merge, line_table, lines::read_line_counts)?;
            let rows = effort::merge_effort(&revs, &counts);
            write_artifact(Stage::Merge, dest, |w| effort::write_effort(&rows, w))
        }
    }
}

/// Nests the line counts into the enclosure tree and writes `hotspots.json`.
pub fn build_hotspot_tree(
    opts: &PipelineOptions,
    line_table: &Path,
    merged: &Path,
    dest: &Path,
    pb: &ProgressBar,
) -> Result<HotspotTree> {
    match opts.transform {
        TransformMode::Scripts => {
            let script = opts.scripts_dir.join("transform").join("csv_as_enclosure_json.py");
            let inv = Invocation {
                stage: Stage::Hotspots,
                tool: &opts.tools.python,
                args: vec![
                    path_arg(&script),
                    "--structure".into(),
                    path_arg(line_table),
                    "--weights".into(),
                    path_arg(merged),
                ],
                cwd: None,
            };
            capture_relayed(&inv, dest, pb)?;
            read_tree(dest).map_err(|e| relabel(e, Stage::Hotspots))
        }
        TransformMode::Builtin => {
            let counts = parse_table(Stage::Hotspots, line_table, lines::read_line_counts)?;
            let weights = parse_table(Stage::Hotspots, merged, effort::read_effort)?;
            let tree = enclosure::build_tree(&counts, &weights);
            reporters::json::write_tree(&tree, dest).map_err(|e| PipelineError::io(Stage::Hotspots, dest, e))?;
            Ok(tree)
        }
    }
}

/// Lays out the tree stored in `hotspots.json` and writes `hotspots.html`
/// and `hotspots.svg` next to it.
pub fn render_visualization(paths: &ArtifactPaths, meta: &ReportMeta) -> Result<HotspotTree> {
    let tree = read_tree(&paths.hotspots_json)?;
    let layout = PackLayout::default().compute_layout(&tree);
    let view = ViewController::new(&layout);

    let svg = SvgRenderer::default().render_frame(&layout, &view);
    fs::write(&paths.hotspots_svg, svg).map_err(|e| PipelineError::io(Stage::Render, &paths.hotspots_svg, e))?;

    let meta = ReportMeta { file_count: layout.leaves().count(), ..meta.clone() };
    reporters::html::report_html(&layout, &view, &meta, &paths.hotspots_html)
        .map_err(|e| PipelineError::io(Stage::Render, &paths.hotspots_html, e))?;
    Ok(tree)
}

// ── Helpers ────────────────────────────────────────────────────────────────────

fn capture_relayed(inv: &Invocation<'_>, dest: &Path, pb: &ProgressBar) -> Result<()> {
    let stderr = capture_to_file(inv, dest)?;
    relay_stderr(pb, inv.stage, &stderr);
    Ok(())
}

/// Echoes what a successful tool wrote to stderr above the spinner.
pub(crate) fn relay_stderr(pb: &ProgressBar, stage: Stage, stderr: &str) {
    for line in stderr_notes(stage, stderr) {
        pb.println(line);
    }
}

fn stderr_notes(stage: Stage, stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(|l| format!("  {} [{stage}] {l}", "!".yellow()))
        .collect()
}

fn maat_args(log: &Path, analysis: &str) -> Vec<String> {
    vec!["-l".into(), path_arg(log), "-c".into(), "git".into(), "-a".into(), analysis.into()]
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn open(stage: Stage, path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| PipelineError::io(stage, path, e))
}

fn parse_table<T, F>(stage: Stage, path: &Path, parse: F) -> Result<T>
where
    F: FnOnce(BufReader<File>) -> std::result::Result<T, String>,
{
    parse(open(stage, path)?).map_err(|message| PipelineError::data(stage, path, message))
}

fn read_commits(stage: Stage, log: &Path) -> Result<Vec<Commit>> {
    parse_table(stage, log, log_parser::parse_log)
}

fn read_tree(path: &Path) -> Result<HotspotTree> {
    reporters::json::read_tree(path).map_err(|message| PipelineError::data(Stage::Render, path, message))
}

fn relabel(err: PipelineError, stage: Stage) -> PipelineError {
    match err {
        PipelineError::Data { path, message, .. } => PipelineError::Data { stage, path, message },
        other => other,
    }
}

fn write_artifact<F>(stage: Stage, dest: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(dest).map_err(|e| PipelineError::io(stage, dest, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(|e| PipelineError::io(stage, dest, e))?;
    finish_writer(stage, dest, writer)
}

fn finish_writer(stage: Stage, path: &Path, mut writer: BufWriter<File>) -> Result<()> {
    writer.flush().map_err(|e| PipelineError::io(stage, path, e))?;
    let file = writer.into_inner().map_err(|e| PipelineError::io(stage, path, e.into_error()))?;
    file.sync_all().map_err(|e| PipelineError::io(stage, path, e))
}
