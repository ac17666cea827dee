use crate::types::Commit;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;

/// `git log` arguments producing the revision log that code-maat's `git`
/// parser understands: `[hash] author date subject` headers plus numstat rows.
///
/// Every value is its own argv entry, so `folder` and `since` never pass
/// through a shell.
pub fn history_args(folder: &str, since: &str) -> Vec<String> {
    vec![
        "log".into(),
        "--follow".into(),
        "--pretty=format:[%h] %an %ad %s".into(),
        "--date=short".into(),
        "--numstat".into(),
        format!("--after={since}"),
        "--".into(),
        folder.into(),
    ]
}

/// Parses a revision log into commits. Files are normalized through
/// [`normalize_filename`] so brace renames resolve to their new path.
pub fn parse_log<R: BufRead>(reader: R) -> Result<Vec<Commit>, String> {
    let mut commits: Vec<Commit> = Vec::new();
    let mut current: Option<Commit> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("line {}: {e}", idx + 1))?;
        parse_line(&line, &mut commits, &mut current);
    }

    if let Some(c) = current.take() {
        commits.push(c);
    }
    Ok(commits)
}

fn parse_line(line: &str, commits: &mut Vec<Commit>, current: &mut Option<Commit>) {
    let trimmed = line.trim_end_matches(['\r', '\n']);

    if let Some(caps) = HEADER_RE.captures(trimmed) {
        if let Some(c) = current.take() {
            commits.push(c);
        }
        *current = Some(Commit {
            hash: caps[1].to_string(),
            author: caps[2].to_string(),
            date: caps[3].to_string(),
            subject: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
            files: Vec::new(),
        });
    } else if trimmed.trim().is_empty() {
        // blank lines between commits
    } else if let Some((_, _, raw_name)) = split_numstat(trimmed) {
        if let (Some(filename), Some(c)) = (normalize_filename(raw_name), current.as_mut()) {
            if !c.files.contains(&filename) {
                c.files.push(filename);
            }
        }
    }
}

/// Splits a `--numstat` row into (added, deleted, path). Binary files report
/// `-` for both counts.
pub fn split_numstat(line: &str) -> Option<(&str, &str, &str)> {
    let mut parts = line.splitn(3, '\t');
    let added = parts.next()?;
    let deleted = parts.next()?;
    let path = parts.next()?;
    let is_count = |s: &str| s == "-" || (!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));
    if is_count(added) && is_count(deleted) && !path.trim().is_empty() {
        Some((added, deleted, path))
    } else {
        None
    }
}

/// Normalizes git rename notations:
///   "src/{old => new}/file.js" → "src/new/file.js"
///   "src/{ => new}/file.js"    → "src/new/file.js"
///   "old-name => new-name"     → "new-name"
pub fn normalize_filename(raw: &str) -> Option<String> {
    crate::git::renames::split_rename(raw)
        .map(|(_, new)| new)
        .or_else(|| {
            let t = raw.trim();
            if t.is_empty() { None } else { Some(t.to_string()) }
        })
}

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([0-9a-fA-F]+)\] (.+?) (\d{4}-\d{2}-\d{2})(?: (.*))?$")
        .expect("header pattern is valid")
});
