//! Indentation complexity: every leading tab counts as one logical indent,
//! every four leading spaces as another. Blank lines are not measured.

use crate::table::join_record;
use crate::types::RevisionComplexity;
use std::io::Write;

pub const HEADER: &str = "rev,n,total,mean,sd";
pub const SPACES_PER_INDENT: f64 = 4.0;

/// Logical indentation of one line.
pub fn line_complexity(line: &str) -> f64 {
    let (mut tabs, mut spaces) = (0usize, 0usize);
    for c in line.chars() {
        match c {
            '\t' => tabs += 1,
            ' ' => spaces += 1,
            _ => break,
        }
    }
    tabs as f64 + spaces as f64 / SPACES_PER_INDENT
}

/// Complexity of every non-blank line, in source order.
pub fn complexity_by_line(source: &str) -> Vec<f64> {
    source
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(line_complexity)
        .collect()
}

/// Descriptive statistics (population standard deviation) of one revision.
pub fn revision_stats(rev: &str, values: &[f64]) -> RevisionComplexity {
    let n = values.len();
    let total: f64 = values.iter().sum();
    let (mean, sd) = if n == 0 {
        (0.0, 0.0)
    } else {
        let mean = total / n as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        (mean, var.sqrt())
    };
    RevisionComplexity {
        rev: rev.to_string(),
        n,
        total,
        mean,
        sd,
        max: values.iter().copied().fold(0.0, f64::max),
    }
}

/// Writes the trend table. Mean and sd are rounded to two decimals.
pub fn write_trend<W: Write>(rows: &[RevisionComplexity], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{HEADER}")?;
    for r in rows {
        let fields = [
            r.rev.clone(),
            r.n.to_string(),
            decimal(r.total),
            decimal(round2(r.mean)),
            decimal(round2(r.sd)),
        ];
        writeln!(writer, "{}", join_record(&fields))?;
    }
    writer.flush()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// Whole numbers keep one decimal place: `12.0`, not `12`.
fn decimal(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.1}") } else { v.to_string() }
}
