//! Stage language for describing a pipeline as text.
//!
//! Pipeline format, one stage per line:
//! ```text
//! PIPE FILTER 1 = /Poland/
//! | SELECT 0, 2
//! | FORMAT /{0} (pop: {1})/
//! ?
//! ```
//!
//! - A leading `PIPE` keyword and leading `|` are accepted and ignored
//! - A line holding only `?` ends the pipeline; later lines are ignored
//! - Lines starting with `#` are comments
//! - Keywords are case-insensitive
//!
//! Strings are delimited: the first non-blank character is the delimiter and
//! the string runs to its next occurrence (`/Poland/`, `"Poland"`, `.a/b.`).
//! Digits cannot be delimiters: where a stage takes a field index, the digits
//! at the front are the index and the first non-digit starts the string.
//!
//! Supported stages:
//! - `FILTER n = /v/` - Keep rows whose field `n` equals `v`
//! - `FILTER n != /v/` - Keep rows whose field `n` differs from `v`
//! - `FILTER n ~ /v/` - Keep rows whose field `n` equals `v`, ignoring case
//! - `LOCATE /p/` - Keep rows where any field contains `p`
//! - `LOCATE n /p/` - Keep rows where field `n` contains `p`
//! - `NLOCATE /p/`, `NLOCATE n /p/` - Keep rows `LOCATE` would drop
//! - `SELECT i, j, ...` - Keep the listed columns, in order
//! - `TAKE n` - Keep the first `n` rows
//! - `SKIP n` - Drop the first `n` rows
//! - `FORMAT /template/` - Replace each row by one field rendered from `{i}` placeholders
//! - `COUNT` - Replace the table by one row holding the row count

use crate::error::PipelineError;
use crate::template::Template;

/// Comparison used by `FILTER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    EqIgnoreCase,
}

impl FilterOp {
    pub fn matches(self, field: &str, value: &str) -> bool {
        match self {
            FilterOp::Eq => field == value,
            FilterOp::Ne => field != value,
            FilterOp::EqIgnoreCase => field
                .chars()
                .flat_map(char::to_lowercase)
                .eq(value.chars().flat_map(char::to_lowercase)),
        }
    }
}

/// Parsed pipeline command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// FILTER n op /value/
    Filter {
        field: usize,
        op: FilterOp,
        value: String,
    },
    /// LOCATE /pattern/ - keep rows containing pattern
    Locate {
        pattern: String,
        /// Optional field restriction
        field: Option<usize>,
    },
    /// NLOCATE /pattern/ - keep rows NOT containing pattern
    Nlocate {
        pattern: String,
        field: Option<usize>,
    },
    /// SELECT i, j, ...
    Select { indices: Vec<i64> },
    /// TAKE n
    Take { n: usize },
    /// SKIP n
    Skip { n: usize },
    /// FORMAT /template/
    Format { template: Template },
    /// COUNT
    Count,
}

impl Command {
    /// Stage name for reports and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Filter { .. } => "FILTER",
            Command::Locate { .. } => "LOCATE",
            Command::Nlocate { .. } => "NLOCATE",
            Command::Select { .. } => "SELECT",
            Command::Take { .. } => "TAKE",
            Command::Skip { .. } => "SKIP",
            Command::Format { .. } => "FORMAT",
            Command::Count => "COUNT",
        }
    }
}

/// Parse stage language text into commands.
pub fn parse_commands(text: &str) -> Result<Vec<Command>, PipelineError> {
    let mut commands = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Explicit end of pipeline
        if line == "?" {
            break;
        }

        // Handle continuation lines: "| COMMAND ..."
        let line = match line.strip_prefix('|') {
            Some(stripped) => stripped.trim(),
            None => line,
        };

        // Handle "PIPE COMMAND" - extract command after PIPE
        let (keyword, rest) = split_keyword(line);
        let line = if keyword.eq_ignore_ascii_case("PIPE") {
            rest
        } else {
            line
        };

        if line.is_empty() {
            continue;
        }

        let cmd = parse_command(line).map_err(|message| PipelineError::Dsl {
            line: line_num + 1,
            message,
        })?;
        commands.push(cmd);
    }

    Ok(commands)
}

/// Split off the first whitespace-delimited word.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(idx) => (&line[..idx], line[idx..].trim()),
        None => (line, ""),
    }
}

/// Parse a single command line.
fn parse_command(line: &str) -> Result<Command, String> {
    let (keyword, rest) = split_keyword(line);

    match keyword.to_ascii_uppercase().as_str() {
        "FILTER" => parse_filter(rest),
        "LOCATE" => {
            let (pattern, field) = parse_locate_args("LOCATE", rest)?;
            Ok(Command::Locate { pattern, field })
        }
        "NLOCATE" => {
            let (pattern, field) = parse_locate_args("NLOCATE", rest)?;
            Ok(Command::Nlocate { pattern, field })
        }
        "SELECT" => parse_select(rest),
        "TAKE" => Ok(Command::Take {
            n: parse_count("TAKE", rest)?,
        }),
        "SKIP" => Ok(Command::Skip {
            n: parse_count("SKIP", rest)?,
        }),
        "FORMAT" => parse_format(rest),
        "COUNT" => {
            if rest.is_empty() {
                Ok(Command::Count)
            } else {
                Err("COUNT takes no arguments".to_string())
            }
        }
        _ => Err(format!("Unknown command: {keyword}")),
    }
}

/// Parse FILTER arguments: `n = /v/`, `n != /v/` or `n ~ /v/`.
fn parse_filter(rest: &str) -> Result<Command, String> {
    let (field, after_field) =
        parse_leading_index(rest)?.ok_or_else(|| "FILTER requires a field index".to_string())?;

    let after_field = after_field.trim_start();
    let (op, value_part) = if let Some(v) = after_field.strip_prefix("!=") {
        (FilterOp::Ne, v)
    } else if let Some(v) = after_field.strip_prefix('=') {
        (FilterOp::Eq, v)
    } else if let Some(v) = after_field.strip_prefix('~') {
        (FilterOp::EqIgnoreCase, v)
    } else {
        return Err("FILTER requires =, != or ~ operator".to_string());
    };

    let value = parse_sole_delimited_string(value_part)?;
    Ok(Command::Filter { field, op, value })
}

/// Parse LOCATE/NLOCATE arguments: `/p/` or `n /p/`.
fn parse_locate_args(name: &str, rest: &str) -> Result<(String, Option<usize>), String> {
    if rest.is_empty() {
        return Err(format!("{name} requires a pattern"));
    }

    match parse_leading_index(rest)? {
        Some((field, pattern_part)) => {
            if pattern_part.trim().is_empty() {
                return Err(format!(
                    "{name} field index {field} must be followed by a delimited pattern \
                     (digits cannot be delimiters)"
                ));
            }
            let pattern = parse_sole_delimited_string(pattern_part)?;
            Ok((pattern, Some(field)))
        }
        None => Ok((parse_sole_delimited_string(rest)?, None)),
    }
}

/// Parse SELECT arguments: indices separated by commas and/or whitespace.
fn parse_select(rest: &str) -> Result<Command, String> {
    let indices = rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| format!("Invalid column index '{s}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if indices.is_empty() {
        return Err("SELECT requires at least one column index".to_string());
    }

    Ok(Command::Select { indices })
}

fn parse_count(name: &str, rest: &str) -> Result<usize, String> {
    rest.parse().map_err(|_| format!("{name} requires a number"))
}

fn parse_format(rest: &str) -> Result<Command, String> {
    let source = parse_sole_delimited_string(rest)?;
    let template = Template::parse(&source)?;
    Ok(Command::Format { template })
}

/// Parse a field index at the start of `s` when `s` starts with a digit.
/// Returns (index, rest_of_input), or `None` when `s` has no leading digit.
fn parse_leading_index(s: &str) -> Result<Option<(usize, &str)>, String> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return Ok(None);
    }
    let digits = &s[..end];
    let index = digits
        .parse()
        .map_err(|_| format!("Field index {digits} is out of range"))?;
    Ok(Some((index, &s[end..])))
}

/// Parse a delimited string using CMS Pipelines convention.
/// The first non-blank character is the delimiter, and the string
/// continues until the next occurrence of that delimiter.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> Result<(String, &str), String> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err("Expected delimited string".to_string());
    };
    let after_delim = &s[delim.len_utf8()..];

    // Find the closing delimiter
    match after_delim.find(delim) {
        Some(end) => {
            let extracted = after_delim[..end].to_string();
            let rest = &after_delim[end + delim.len_utf8()..];
            Ok((extracted, rest))
        }
        None => Err(format!("Unclosed delimiter '{delim}'")),
    }
}

/// Parse a delimited string that must be the last thing on the line.
fn parse_sole_delimited_string(s: &str) -> Result<String, String> {
    let (value, rest) = parse_delimited_string(s)?;
    let rest = rest.trim();
    if !rest.is_empty() {
        return Err(format!("Unexpected text after string: '{rest}'"));
    }
    Ok(value)
}
