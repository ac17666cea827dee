use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, Table};

use crate::types::{HotspotTree, LogSummary, ReportMeta};

/// Prints the revision-log statistics as a `statistic | value` table.
pub fn report_summary(summary: &LogSummary) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["STATISTIC", "VALUE"]);
    for (name, value) in summary.rows() {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}

/// Closing overview: the files with the highest change weight, biggest first
/// among equals.
pub fn report_hotspots(meta: &ReportMeta, tree: &HotspotTree, limit: usize) {
    println!();
    println!(
        "{} {} since \"{}\" ({} files)",
        "🔥 hotspot-map".red().bold(),
        meta.folder.cyan(),
        meta.since.bright_black(),
        meta.file_count.to_string().bright_black(),
    );
    println!();

    let mut rows = Vec::new();
    collect_rows(tree, "", &mut rows);
    rows.retain(|r| r.weight > 0.0);
    if rows.is_empty() {
        println!("{}", "  No changed files in this period.".yellow());
        println!();
        return;
    }
    rows.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then(b.size.total_cmp(&a.size))
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["RANK", "FILE", "LINES", "WEIGHT"]);
    for (i, row) in rows.iter().take(limit).enumerate() {
        table.add_row(vec![
            Cell::new(format!("{:3}", i + 1)),
            Cell::new(truncate_path(&row.path, 56)),
            Cell::new(format!("{}", row.size.round() as u64)).set_alignment(CellAlignment::Right),
            weight_cell(row.weight),
        ]);
    }
    println!("{table}");
    println!();
}

struct Row {
    path: String,
    size: f64,
    weight: f64,
}

fn collect_rows(node: &HotspotTree, prefix: &str, out: &mut Vec<Row>) {
    for child in &node.children {
        let path = if prefix.is_empty() { child.name.clone() } else { format!("{prefix}/{}", child.name) };
        if child.is_leaf() {
            out.push(Row {
                path,
                size: child.size.unwrap_or(0.0),
                weight: child.weight.unwrap_or(0.0),
            });
        } else {
            collect_rows(child, &path, out);
        }
    }
}

/// Weight as a two-decimal number, coloured like a risk tier.
fn weight_cell(weight: f64) -> Cell {
    let text = format!("{weight:.2}");
    if weight >= 0.75 {
        Cell::new(text).fg(Color::Red).add_attribute(Attribute::Bold)
    } else if weight >= 0.5 {
        Cell::new(text).fg(Color::Yellow)
    } else if weight >= 0.25 {
        Cell::new(text)
    } else {
        Cell::new(text).fg(Color::Green)
    }
}

fn truncate_path(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - (max - 1)).collect();
    format!("…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_carry_full_paths() {
        let mut src = HotspotTree::directory("src");
        src.children.push(HotspotTree::leaf("a.rs", 10.0, 1.0));
        let mut root = HotspotTree::root();
        root.children.push(src);
        root.children.push(HotspotTree::leaf("build.rs", 3.0, 0.0));

        let mut rows = Vec::new();
        collect_rows(&root, "", &mut rows);
        let paths: Vec<&str> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.rs", "build.rs"]);
    }

    #[test]
    fn test_truncate_path_keeps_tail() {
        assert_eq!(truncate_path("short.rs", 20), "short.rs");
        assert_eq!(truncate_path("a/b/c/d/e.rs", 6), "…/e.rs");
    }
}
