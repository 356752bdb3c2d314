//! Field separators.

use std::fmt;

use regex::Regex;

use crate::error::PipelineError;

/// How a line is split into fields.
#[derive(Debug, Clone)]
pub enum Separator {
    /// Split on every occurrence of an exact, non-empty string.
    Literal(String),
    /// Split on every match of a regular expression.
    Pattern(Regex),
}

impl Separator {
    /// Exact-string separator. Empty strings are rejected.
    pub fn literal(sep: impl Into<String>) -> Result<Self, PipelineError> {
        let sep = sep.into();
        if sep.is_empty() {
            return Err(PipelineError::InvalidSeparator(
                "separator must not be empty".to_string(),
            ));
        }
        Ok(Separator::Literal(sep))
    }

    /// Regular-expression separator.
    ///
    /// Patterns that match the empty string are rejected, since they would
    /// split between every character.
    pub fn pattern(pattern: &str) -> Result<Self, PipelineError> {
        let re = Regex::new(pattern)
            .map_err(|e| PipelineError::InvalidSeparator(format!("'{pattern}': {e}")))?;
        if re.is_match("") {
            return Err(PipelineError::InvalidSeparator(format!(
                "'{pattern}' matches the empty string"
            )));
        }
        Ok(Separator::Pattern(re))
    }

    /// Split `line` into trimmed fields.
    ///
    /// Trailing segments that are empty before trimming are dropped, so
    /// `"a;b;"` yields two fields while `"a; "` keeps its blank second field.
    pub fn split_trimmed(&self, line: &str) -> Vec<String> {
        let mut segments: Vec<&str> = match self {
            Separator::Literal(sep) => line.split(sep.as_str()).collect(),
            Separator::Pattern(re) => re.split(line).collect(),
        };
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        segments.into_iter().map(|f| f.trim().to_string()).collect()
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Literal(sep) => write!(f, "{sep:?}"),
            Separator::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}
