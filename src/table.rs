//! Minimal CSV reading and writing for the metrics artifacts.
//!
//! The tables exchanged with cloc and code-maat are plain comma-separated
//! rows; only cloc's banner column is ever quoted.

/// Splits one CSV record, honouring double-quoted fields and `""` escapes.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches(['\r', '\n']).chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Quotes a field when it contains a separator, quote, or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Joins fields into one CSV record (without the trailing newline).
pub fn join_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a numeric column, naming the column and line in the error.
pub fn parse_count<T: std::str::FromStr>(raw: &str, column: &str, line_no: usize) -> Result<T, String> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("line {line_no}: column '{column}' is not a number: \"{raw}\""))
}
