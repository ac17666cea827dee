use crate::analyzers::lines::clean_path;
use crate::table::{join_record, parse_count, split_record};
use crate::types::{Effort, LineCount, Revisions};
use std::collections::HashMap;
use std::io::{BufRead, Write};

pub const HEADER: &str = "module,revisions,code";

/// Joins change frequency with lines of code on the file path.
///
/// Only files present in both tables survive. Sorted by revisions, then code
/// (both descending), then module name.
pub fn merge_effort(revisions: &[Revisions], lines: &[LineCount]) -> Vec<Effort> {
    let code_by_file: HashMap<&str, u64> = lines
        .iter()
        .map(|l| (clean_path(&l.file), l.code))
        .collect();

    let mut rows: Vec<Effort> = revisions
        .iter()
        .filter_map(|r| {
            let module = clean_path(&r.entity);
            code_by_file.get(module).map(|&code| Effort {
                module: module.to_string(),
                revisions: r.revisions,
                code,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.revisions
            .cmp(&a.revisions)
            .then_with(|| b.code.cmp(&a.code))
            .then_with(|| a.module.cmp(&b.module))
    });
    rows
}

pub fn write_effort<W: Write>(rows: &[Effort], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{HEADER}")?;
    for e in rows {
        let (revisions, code) = (e.revisions.to_string(), e.code.to_string());
        writeln!(writer, "{}", join_record(&[e.module.as_str(), revisions.as_str(), code.as_str()]))?;
    }
    writer.flush()
}

/// Reads a `module,revisions,code` table, whether written here or by the
/// maat-scripts merge.
pub fn read_effort<R: BufRead>(reader: R) -> Result<Vec<Effort>, String> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| format!("line {line_no}: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line);
        if idx == 0 && fields.first().map(|f| f.trim()) == Some("module") {
            continue;
        }
        if fields.len() < 3 {
            return Err(format!("line {line_no}: expected 'module,revisions,code', got \"{line}\""));
        }
        rows.push(Effort {
            module: clean_path(&fields[0]).to_string(),
            revisions: parse_count(&fields[1], "revisions", line_no)?,
            code: parse_count(&fields[2], "code", line_no)?,
        });
    }
    Ok(rows)
}
