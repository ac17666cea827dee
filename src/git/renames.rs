use crate::git::log_parser::split_numstat;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io::{BufRead, Write};

static BRACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*) => ([^{}]*)\}").expect("brace pattern is valid"));

/// Expands a git rename notation into `(old, new)` paths.
///
/// Handles the brace form (`src/{a => b}/f.rs`, either side may be empty)
/// and the bare form (`a.rs => b.rs`). Returns `None` for ordinary paths.
pub fn split_rename(raw: &str) -> Option<(String, String)> {
    let raw = raw.trim();
    if let Some(caps) = BRACE_RE.captures(raw) {
        let whole = caps.get(0)?;
        let (prefix, suffix) = (&raw[..whole.start()], &raw[whole.end()..]);
        let old = join_rename(prefix, &caps[1], suffix);
        let new = join_rename(prefix, &caps[2], suffix);
        return Some((old, new));
    }
    let (old, new) = raw.split_once(" => ")?;
    let (old, new) = (old.trim(), new.trim());
    if old.is_empty() || new.is_empty() {
        return None;
    }
    Some((old.to_string(), new.to_string()))
}

fn join_rename(prefix: &str, middle: &str, suffix: &str) -> String {
    let mut path = format!("{prefix}{middle}{suffix}");
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path.trim_start_matches('/').to_string()
}

/// Resolves every historic path to the newest name of the file.
///
/// The log is read newest-first, so a rename row tells us that `old` is
/// what `new` used to be called. Chains (`a → b`, later `b → c`) collapse
/// onto the final name.
#[derive(Debug, Default)]
pub struct RenameTracker {
    renames: HashMap<String, String>,
}

impl RenameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the newest name for a numstat path, recording renames.
    pub fn resolve(&mut self, raw: &str) -> String {
        match split_rename(raw) {
            Some((old, new)) => {
                let target = self.renames.remove(&new).unwrap_or(new);
                self.renames.insert(old, target.clone());
                target
            }
            None => {
                let path = raw.trim();
                self.renames.get(path).cloned().unwrap_or_else(|| path.to_string())
            }
        }
    }
}

/// Copies a revision log, rewriting the path column of numstat rows through
/// a [`RenameTracker`]. All other lines are copied untouched.
pub fn rewrite_log<R: BufRead, W: Write>(reader: R, mut writer: W) -> std::io::Result<usize> {
    let mut tracker = RenameTracker::new();
    let mut rewritten = 0usize;

    for line in reader.lines() {
        let line = line?;
        match split_numstat(&line) {
            Some((added, deleted, path)) => {
                let resolved = tracker.resolve(path);
                if resolved != path {
                    rewritten += 1;
                }
                writeln!(writer, "{added}\t{deleted}\t{resolved}")?;
            }
            None => writeln!(writer, "{line}")?,
        }
    }
    writer.flush()?;
    Ok(rewritten)
}
