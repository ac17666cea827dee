use crate::table::{join_record, parse_count, split_record};
use crate::types::{Commit, Revisions};
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Write};

pub const HEADER: &str = "entity,n-revs";

/// Counts the commits touching each file.
/// Sorted by revisions (descending), ties broken by entity name.
pub fn analyze_revisions(commits: &[Commit]) -> Vec<Revisions> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        // A file listed twice in one commit is still one revision
        let unique: HashSet<&str> = commit.files.iter().map(|f| f.as_str()).collect();
        for file in unique {
            *counts.entry(file).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<Revisions> = counts
        .into_iter()
        .map(|(entity, revisions)| Revisions { entity: entity.to_string(), revisions })
        .collect();
    rows.sort_by(|a, b| b.revisions.cmp(&a.revisions).then_with(|| a.entity.cmp(&b.entity)));
    rows
}

/// Writes the table in code-maat's `revisions` format.
pub fn write_revisions<W: Write>(rows: &[Revisions], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{HEADER}")?;
    for r in rows {
        let revisions = r.revisions.to_string();
        writeln!(writer, "{}", join_record(&[r.entity.as_str(), revisions.as_str()]))?;
    }
    writer.flush()
}

/// Reads an `entity,n-revs` table, whether written here or by code-maat.
pub fn read_revisions<R: BufRead>(reader: R) -> Result<Vec<Revisions>, String> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("line {}: {e}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line);
        if idx == 0 && fields.first().map(|f| f.trim()) == Some("entity") {
            continue;
        }
        if fields.len() < 2 {
            return Err(format!("line {}: expected 'entity,n-revs', got \"{line}\"", idx + 1));
        }
        rows.push(Revisions {
            entity: fields[0].trim().to_string(),
            revisions: parse_count(&fields[1], "n-revs", idx + 1)?,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_commit(hash: &str, files: &[&str]) -> Commit {
        Commit {
            hash: hash.to_string(),
            author: "dev".to_string(),
            date: "2024-01-01".to_string(),
            subject: "change".to_string(),
            files: files.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_most_changed_file_first() {
        let commits = vec![
            make_commit("1", &["hot.rs", "cold.rs"]),
            make_commit("2", &["hot.rs"]),
            make_commit("3", &["hot.rs"]),
        ];
        let rows = analyze_revisions(&commits);
        assert_eq!(rows[0], Revisions { entity: "hot.rs".into(), revisions: 3 });
        assert_eq!(rows[1], Revisions { entity: "cold.rs".into(), revisions: 1 });
    }

    #[test]
    fn test_ties_sorted_by_name() {
        let commits = vec![make_commit("1", &["b.rs", "a.rs"])];
        let rows = analyze_revisions(&commits);
        let names: Vec<&str> = rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(names, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn test_duplicate_file_in_commit_counts_once() {
        let commits = vec![make_commit("1", &["a.rs", "a.rs"])];
        assert_eq!(analyze_revisions(&commits)[0].revisions, 1);
    }

    #[test]
    fn test_empty_history_yields_header_only() {
        let mut out = Vec::new();
        write_revisions(&analyze_revisions(&[]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "entity,n-revs\n");
    }

    #[test]
    fn test_read_back_written_table() {
        let rows = vec![
            Revisions { entity: "src/a.rs".into(), revisions: 3 },
            Revisions { entity: "src/b.rs".into(), revisions: 1 },
        ];
        let mut out = Vec::new();
        write_revisions(&rows, &mut out).unwrap();
        assert_eq!(read_revisions(out.as_slice()).unwrap(), rows);
    }

    #[test]
    fn test_read_rejects_bad_count() {
        let err = read_revisions("entity,n-revs\nsrc/a.rs,many\n".as_bytes()).unwrap_err();
        assert!(err.contains("n-revs"), "got: {err}");
    }
}
