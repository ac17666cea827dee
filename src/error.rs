use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline step, used to label diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    History,
    Renames,
    Summary,
    Revisions,
    Lines,
    Merge,
    Hotspots,
    Render,
    Trend,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::History   => "history",
            Stage::Renames   => "renames",
            Stage::Summary   => "summary",
            Stage::Revisions => "revisions",
            Stage::Lines     => "lines",
            Stage::Merge     => "merge",
            Stage::Hotspots  => "hotspots",
            Stage::Render    => "render",
            Stage::Trend     => "trend",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot create output directory '{}': {source}", .path.display())]
    Setup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("[{stage}] failed to run '{program}': {source}{}", install_hint(.source))]
    Spawn {
        stage: Stage,
        program: String,
        source: std::io::Error,
    },

    #[error("[{stage}] '{program}' exited with {status}{}", stderr_tail(.stderr))]
    ExitStatus {
        stage: Stage,
        program: String,
        status: String,
        stderr: String,
    },

    #[error("[{stage}] I/O error on '{}': {source}", .path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("[{stage}] malformed data in '{}': {message}", .path.display())]
    Data {
        stage: Stage,
        path: PathBuf,
        message: String,
    },

    #[error("{0}")]
    Config(String),
}

impl PipelineError {
    pub fn io(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io { stage, path: path.into(), source }
    }

    pub fn data(stage: Stage, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PipelineError::Data { stage, path: path.into(), message: message.into() }
    }

    #[cfg(test)]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Spawn { stage, .. }
            | PipelineError::ExitStatus { stage, .. }
            | PipelineError::Io { stage, .. }
            | PipelineError::Data { stage, .. } => Some(*stage),
            PipelineError::Setup { .. } | PipelineError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

fn install_hint(source: &std::io::Error) -> &'static str {
    if source.kind() == std::io::ErrorKind::NotFound {
        " (is it installed and on PATH?)"
    } else {
        ""
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let start = lines.len().saturating_sub(10);
    format!("\n{}", lines[start..].join("\n"))
}
