use crate::table::{parse_count, split_record};
use crate::types::LineCount;
use std::io::BufRead;

/// Arguments for `cloc <folder> --vcs git --by-file --csv --quiet`.
/// `--vcs git` restricts counting to tracked files, so ignored files never
/// show up in the tree.
pub fn cloc_args(folder: &str) -> Vec<String> {
    vec![
        folder.into(),
        "--vcs".into(),
        "git".into(),
        "--by-file".into(),
        "--csv".into(),
        "--quiet".into(),
    ]
}

/// Strips the `./` prefix cloc adds when counting from the current directory.
pub fn clean_path(raw: &str) -> &str {
    let mut path = raw.trim();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path
}

/// Reads a cloc `--by-file --csv` table.
///
/// The header row (`language,filename,...`), blank lines and the trailing
/// `SUM` row are skipped. Rows keep cloc's order.
pub fn read_line_counts<R: BufRead>(reader: R) -> Result<Vec<LineCount>, String> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| format!("line {line_no}: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line);
        let language = fields[0].trim();
        if language == "language" || language == "SUM" {
            continue;
        }
        if fields.len() < 5 {
            return Err(format!(
                "line {line_no}: expected 'language,filename,blank,comment,code', got \"{line}\""
            ));
        }
        rows.push(LineCount {
            language: language.to_string(),
            file: clean_path(&fields[1]).to_string(),
            blank: parse_count(&fields[2], "blank", line_no)?,
            comment: parse_count(&fields[3], "comment", line_no)?,
            code: parse_count(&fields[4], "code", line_no)?,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOC: &str = "\
language,filename,blank,comment,code,\"github.com/AlDanial/cloc v 1.98  T=0.01 s (300.0 files/s, 12000.0 lines/s)\"
Rust,./src/main.rs,12,4,220
Rust,./src/lib.rs,3,10,48
TOML,./Cargo.toml,2,0,18
SUM,,17,14,286
";

    #[test]
    fn test_cloc_args_shape() {
        let args = cloc_args("src");
        assert_eq!(args[0], "src");
        assert!(args.contains(&"--by-file".to_string()));
        assert!(args.contains(&"--csv".to_string()));
    }

    #[test]
    fn test_reads_rows_and_skips_header_and_sum() {
        let rows = read_line_counts(CLOC.as_bytes()).expect("cloc table should parse");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].file, "src/main.rs", "leading ./ should be stripped");
        assert_eq!(rows[0].code, 220);
        assert_eq!(rows[2].language, "TOML");
        assert_eq!(rows[2].comment, 0);
    }

    #[test]
    fn test_empty_table() {
        let rows = read_line_counts("".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_bad_code_column_rejected() {
        let err = read_line_counts("Rust,src/a.rs,1,2,lots\n".as_bytes()).unwrap_err();
        assert!(err.contains("code") && err.contains("line 1"), "got: {err}");
    }

    #[test]
    fn test_short_row_rejected() {
        assert!(read_line_counts("Rust,src/a.rs\n".as_bytes()).is_err());
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("./src/a.rs"), "src/a.rs");
        assert_eq!(clean_path("src/a.rs"), "src/a.rs");
        assert_eq!(clean_path("././x"), "x");
    }
}
