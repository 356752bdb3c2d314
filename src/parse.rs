//! Parse stage: delimited text into a [`Table`].
//!
//! Each line is trimmed to decide whether it is skipped (blank, or a
//! comment starting with the comment prefix). Kept lines are split on the
//! original, untrimmed text and each field is trimmed on its own.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use log::{debug, trace};

use crate::error::PipelineError;
use crate::pipeline::Table;
use crate::row::Row;
use crate::separator::Separator;

/// Default prefix marking a comment line.
pub const COMMENT_PREFIX: &str = "#";

/// Options for the parse stage.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub separator: Separator,
    pub comment_prefix: String,
}

impl ParseOptions {
    pub fn new(separator: Separator) -> Self {
        Self {
            separator,
            comment_prefix: COMMENT_PREFIX.to_string(),
        }
    }

    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    fn is_skipped(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty()
            || (!self.comment_prefix.is_empty() && trimmed.starts_with(self.comment_prefix.as_str()))
    }
}

/// Parse `source` into a table using `separator` and the `#` comment prefix.
pub fn parse<R: BufRead>(source: R, separator: &Separator) -> Result<Table, PipelineError> {
    parse_with(source, "<input>", &ParseOptions::new(separator.clone()))
}

/// Parse in-memory text.
///
/// ```
/// use rowpipe::{Separator, parse_str};
///
/// let sep = Separator::literal(";").unwrap();
/// let table = parse_str("\n# comment\nA;B\n", &sep).unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table[0], ["A", "B"]);
/// ```
pub fn parse_str(text: &str, separator: &Separator) -> Result<Table, PipelineError> {
    parse_with(Cursor::new(text), "<text>", &ParseOptions::new(separator.clone()))
}

/// Parse the file at `path`. The file is closed before this returns.
pub fn parse_file(path: impl AsRef<Path>, separator: &Separator) -> Result<Table, PipelineError> {
    parse_file_with(path, &ParseOptions::new(separator.clone()))
}

/// Parse the file at `path` with explicit options.
pub fn parse_file_with(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Table, PipelineError> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|source| PipelineError::SourceUnavailable {
        source_name: source_name.clone(),
        source,
    })?;
    parse_with(BufReader::new(file), &source_name, options)
}

/// Parse any buffered reader with explicit options.
///
/// `source_name` is used only in error messages and logs.
pub fn parse_with<R: BufRead>(
    source: R,
    source_name: &str,
    options: &ParseOptions,
) -> Result<Table, PipelineError> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (line_num, line) in source.lines().enumerate() {
        let line = line.map_err(|source| PipelineError::SourceUnavailable {
            source_name: source_name.to_string(),
            source,
        })?;

        if options.is_skipped(&line) {
            trace!("{source_name}:{}: skipped", line_num + 1);
            skipped += 1;
            continue;
        }

        rows.push(Row::new(options.separator.split_trimmed(&line)));
    }

    debug!(
        "parsed {} rows from {source_name} ({skipped} blank/comment lines skipped, separator {})",
        rows.len(),
        options.separator
    );

    Ok(Table::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn semi() -> Separator {
        Separator::literal(";").unwrap()
    }

    #[test]
    fn test_parse_cities() {
        let text = "Warsaw;Poland;1790658;517.24\nKrakow;Poland;779115;326.85\nBerlin;Germany;3644826;891.68\n";
        let table = parse_str(text, &semi()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.iter().all(|row| row.len() == 4));
        assert_eq!(table[2], ["Berlin", "Germany", "3644826", "891.68"]);
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        let table = parse_str("\n# comment\nA;B\n", &semi()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0], ["A", "B"]);
    }

    #[test]
    fn test_indented_comment_and_whitespace_line() {
        let table = parse_str("   \t\n   # indented\nx;y\n\t\n", &semi()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_hash_inside_line_is_data() {
        let table = parse_str("a;#b\n", &semi()).unwrap();
        assert_eq!(table[0], ["a", "#b"]);
    }

    #[test]
    fn test_split_uses_untrimmed_line() {
        let table = parse_str(" a ; b \n", &semi()).unwrap();
        assert_eq!(table[0], ["a", "b"]);

        // Leading separator survives because splitting happens before trimming
        let table = parse_str("  ;x\n", &semi()).unwrap();
        assert_eq!(table[0], ["", "x"]);
    }

    #[test]
    fn test_trailing_separator_adds_no_field() {
        let table = parse_str("Warsaw;Poland;\n", &semi()).unwrap();
        assert_eq!(table[0], ["Warsaw", "Poland"]);

        // A separator-only line is still a row, with no fields
        let table = parse_str(";;\n", &semi()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table[0].is_empty());
    }

    #[test]
    fn test_ragged_rows_accepted() {
        let table = parse_str("a\na;b;c\na;b\n", &semi()).unwrap();
        let lens: Vec<usize> = table.iter().map(Row::len).collect();
        assert_eq!(lens, vec![1, 3, 2]);
    }

    #[test]
    fn test_crlf_lines() {
        let table = parse_str("a;b\r\nc;d\r\n", &semi()).unwrap();
        assert_eq!(table[0], ["a", "b"]);
        assert_eq!(table[1], ["c", "d"]);
    }

    #[test]
    fn test_custom_comment_prefix() {
        let options = ParseOptions::new(semi()).with_comment_prefix("//");
        let table = parse_with(Cursor::new("// note\n# not a comment;x\n"), "t", &options).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0], ["# not a comment", "x"]);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = parse_file("/definitely/not/here.csv", &semi()).unwrap_err();
        match err {
            PipelineError::SourceUnavailable { source_name, source } => {
                assert_eq!(source_name, "/definitely/not/here.csv");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_source_unavailable() {
        let bytes: &[u8] = b"ok;1\n\xff\xfe;2\n";
        let err = parse(bytes, &semi()).unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.csv");
        std::fs::write(&path, "# header\nWarsaw;Poland\n\nBerlin;Germany\n").unwrap();

        let table = parse_file(&path, &semi()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1], ["Berlin", "Germany"]);
    }
}
