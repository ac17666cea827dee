//! Indentation-complexity trend of a single file across a revision range.
//!
//! Lists the commits in `start..end` that touched the file (following
//! renames), checks out each historic version with `git show` and measures
//! it. Rows come back oldest first.

use indicatif::ProgressBar;

use super::process::{capture_output, Invocation};
use super::{relay_stderr, PipelineOptions};
use crate::analyzers::complexity;
use crate::error::{PipelineError, Result, Stage};
use crate::git::follow;
use crate::types::RevisionComplexity;

#[derive(Debug, Clone)]
pub struct TrendRange {
    pub file: String,
    pub start: String,
    pub end: String,
}

impl TrendRange {
    fn validate(&self) -> Result<()> {
        for (flag, value) in [("--complexity-trend", &self.file), ("--start", &self.start), ("--end", &self.end)] {
            if value.trim().is_empty() {
                return Err(PipelineError::Config(format!("{flag} must not be empty")));
            }
        }
        Ok(())
    }
}

pub fn complexity_trend(
    opts: &PipelineOptions,
    range: &TrendRange,
    pb: &ProgressBar,
) -> Result<Vec<RevisionComplexity>> {
    range.validate()?;
    let git = move |args: Vec<String>| Invocation {
        stage: Stage::Trend,
        tool: &opts.tools.git,
        args,
        cwd: Some(&opts.repo),
    };

    pb.set_message(format!("Listing revisions of {}...", range.file));
    let listing = capture_output(&git(follow::follow_args(&range.file, &range.start, &range.end)))?;
    relay_stderr(pb, Stage::Trend, &listing.stderr);
    let revisions = follow::parse_follow_log(&listing.stdout, &range.file);

    let mut trend = Vec::with_capacity(revisions.len());
    for (i, r) in revisions.iter().enumerate() {
        pb.set_message(format!("[{}/{}] Measuring {} at {}...", i + 1, revisions.len(), r.path, r.rev));
        let shown = capture_output(&git(follow::show_args(&r.rev, &r.path)))?;
        relay_stderr(pb, Stage::Trend, &shown.stderr);
        let by_line = complexity::complexity_by_line(&shown.stdout);
        trend.push(complexity::revision_stats(&r.rev, &by_line));
    }
    Ok(trend)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::ToolCommand;
    use std::fs;

    const OLD: &str = "fn parse() {\n    read();\n}\n";
    const NEW: &str = "fn parse() {\n    if ready {\n\n        read();\n    }\n}\n";

    /// A fake git answering `log` from a canned listing and `show REV:PATH`
    /// from `<REV>.src`, recording every `show` argument.
    struct FakeGit {
        dir: tempfile::TempDir,
    }

    impl FakeGit {
        fn new(listing: &str, blobs: &[(&str, &str)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().display().to_string();
            fs::create_dir(dir.path().join("repo")).unwrap();
            fs::write(dir.path().join("listing.txt"), listing).unwrap();
            for (rev, source) in blobs {
                fs::write(dir.path().join(format!("{rev}.src")), source).unwrap();
            }
            let script = format!(
                "case \"$1\" in\n\
                 log) printf '%s\\n' \"$@\" > '{root}/log-args.txt'; cat '{root}/listing.txt' ;;\n\
                 show) echo \"$2\" >> '{root}/shows.txt'; rev=\"${{2%%:*}}\"\n\
                 [ -f \"{root}/$rev.src\" ] || {{ echo \"fatal: bad object $rev\" >&2; exit 128; }}\n\
                 cat \"{root}/$rev.src\" ;;\n\
                 esac\n"
            );
            fs::write(dir.path().join("git.sh"), script).unwrap();
            FakeGit { dir }
        }

        fn options(&self) -> PipelineOptions {
            let mut opts = PipelineOptions { repo: self.dir.path().join("repo"), ..PipelineOptions::default() };
            opts.tools.git = ToolCommand::Argv(vec!["sh".into(), self.dir.path().join("git.sh").display().to_string()]);
            opts
        }

        fn read(&self, name: &str) -> String {
            fs::read_to_string(self.dir.path().join(name)).unwrap_or_default()
        }
    }

    fn range(file: &str) -> TrendRange {
        TrendRange { file: file.into(), start: "v1.0".into(), end: "HEAD".into() }
    }

    #[test]
    fn test_trend_measures_each_revision_oldest_first() {
        let git = FakeGit::new("[b2c3d4e]\n\nsrc/parser.rs\n[a1b2c3d]\n\nsrc/parse.rs\n", &[("a1b2c3d", OLD), ("b2c3d4e", NEW)]);
        let trend = complexity_trend(&git.options(), &range("src/parser.rs"), &ProgressBar::hidden()).unwrap();

        let revs: Vec<&str> = trend.iter().map(|r| r.rev.as_str()).collect();
        assert_eq!(revs, vec!["a1b2c3d", "b2c3d4e"]);
        assert_eq!((trend[0].n, trend[0].total, trend[0].max), (3, 1.0, 1.0));
        assert_eq!((trend[1].n, trend[1].total, trend[1].max), (5, 4.0, 2.0));
        assert_eq!(git.read("shows.txt"), "a1b2c3d:src/parse.rs\nb2c3d4e:src/parser.rs\n");
    }

    #[test]
    fn test_git_log_follows_the_range() {
        let git = FakeGit::new("", &[]);
        complexity_trend(&git.options(), &range("src/my file.rs"), &ProgressBar::hidden()).unwrap();
        let args = git.read("log-args.txt");
        let args: Vec<&str> = args.lines().collect();
        assert!(args.contains(&"--follow") && args.contains(&"v1.0..HEAD"));
        assert_eq!(args.last(), Some(&"src/my file.rs"));
    }

    #[test]
    fn test_empty_range_yields_no_rows() {
        let git = FakeGit::new("", &[]);
        let trend = complexity_trend(&git.options(), &range("src/a.rs"), &ProgressBar::hidden()).unwrap();
        assert!(trend.is_empty());
        assert_eq!(git.read("shows.txt"), "");
    }

    #[test]
    fn test_unreadable_revision_stops_with_trend_error() {
        let git = FakeGit::new("[b2c3d4e]\n\nsrc/a.rs\n[a1b2c3d]\n\nsrc/a.rs\n", &[("a1b2c3d", OLD)]);
        let err = complexity_trend(&git.options(), &range("src/a.rs"), &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, PipelineError::ExitStatus { stage: Stage::Trend, .. }), "got {err:?}");
        assert!(err.to_string().contains("bad object b2c3d4e"));
    }

    #[test]
    fn test_blank_range_rejected_before_git_runs() {
        let git = FakeGit::new("", &[]);
        let blank = TrendRange { start: " ".into(), ..range("src/a.rs") };
        let err = complexity_trend(&git.options(), &blank, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, PipelineError::Config(ref m) if m.contains("--start")), "got {err:?}");
        assert_eq!(git.read("log-args.txt"), "");
    }
}
