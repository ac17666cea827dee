/// `git log` arguments listing the commits in `start..end` that touched
/// `file`, following renames. Each commit prints as `[hash]` followed by
/// the file's path at that commit.
pub fn follow_args(file: &str, start: &str, end: &str) -> Vec<String> {
    vec![
        "log".into(),
        "--follow".into(),
        "--format=[%h]".into(),
        "--name-only".into(),
        format!("{start}..{end}"),
        "--".into(),
        file.into(),
    ]
}

/// `git show` arguments printing `path` as it was at `rev`.
pub fn show_args(rev: &str, path: &str) -> Vec<String> {
    vec!["show".into(), format!("{rev}:{path}")]
}

/// One commit of a followed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRevision {
    pub rev: String,
    /// Path of the file at this revision.
    pub path: String,
}

/// Parses the output of [`follow_args`] into revisions, oldest first.
///
/// A commit listed without a path keeps `file`.
pub fn parse_follow_log(output: &str, file: &str) -> Vec<FileRevision> {
    let mut revs: Vec<FileRevision> = Vec::new();
    let mut named = false;

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            Some(hash) if !hash.is_empty() && !hash.contains(char::is_whitespace) => {
                revs.push(FileRevision { rev: hash.to_string(), path: file.to_string() });
                named = false;
            }
            _ => {
                if let Some(current) = revs.last_mut().filter(|_| !named) {
                    current.path = line.to_string();
                    named = true;
                }
            }
        }
    }

    revs.reverse();
    revs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_args_keep_file_after_separator() {
        let args = follow_args("src/my file.rs", "v1.0", "HEAD");
        assert_eq!(args[0], "log");
        assert!(args.contains(&"v1.0..HEAD".to_string()));
        assert_eq!(&args[args.len() - 2..], &["--", "src/my file.rs"]);
        assert_eq!(show_args("abc1234", "src/a.rs"), vec!["show", "abc1234:src/a.rs"]);
    }

    #[test]
    fn test_revisions_oldest_first_with_historic_paths() {
        let out = "[c3d4e5f]\n\nsrc/new.rs\n[b2c3d4e]\n\nsrc/new.rs\n[a1b2c3d]\n\nsrc/old.rs\n";
        let revs = parse_follow_log(out, "src/new.rs");
        let pairs: Vec<(&str, &str)> = revs.iter().map(|r| (r.rev.as_str(), r.path.as_str())).collect();
        assert_eq!(pairs, vec![("a1b2c3d", "src/old.rs"), ("b2c3d4e", "src/new.rs"), ("c3d4e5f", "src/new.rs")]);
    }

    #[test]
    fn test_missing_path_falls_back_to_file() {
        let revs = parse_follow_log("[a1b2c3d]\n[b2c3d4e]\nlib/x.rs\n", "x.rs");
        assert_eq!(revs[0], FileRevision { rev: "b2c3d4e".into(), path: "lib/x.rs".into() });
        assert_eq!(revs[1], FileRevision { rev: "a1b2c3d".into(), path: "x.rs".into() });
    }

    #[test]
    fn test_empty_range() {
        assert!(parse_follow_log("", "a.rs").is_empty());
    }
}
