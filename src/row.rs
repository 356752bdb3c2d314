//! Row type: the ordered fields parsed from one input line.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::RowError;

/// An ordered sequence of string fields.
///
/// Rows carry no schema, so two rows in the same table may have different
/// field counts. Rows are never modified once built; stages produce new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    /// Create a row from owned fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields as a slice.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Field at `index`, or an empty string when the row is too short.
    ///
    /// Negative indices are always out of range.
    pub fn get_or_empty(&self, index: i64) -> &str {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.get(i))
            .unwrap_or("")
    }

    /// Field at `index`, failing with [`RowError::MissingField`] on short rows.
    ///
    /// Intended for predicates and mappers:
    ///
    /// ```
    /// use rowpipe::Row;
    ///
    /// let row = Row::from(vec!["Warsaw", "Poland"]);
    /// assert_eq!(row.require(1).unwrap(), "Poland");
    /// assert!(row.require(2).is_err());
    /// ```
    pub fn require(&self, index: usize) -> Result<&str, RowError> {
        self.get(index).ok_or(RowError::MissingField {
            index,
            len: self.len(),
        })
    }

    /// Parse the field at `index` into `T`.
    pub fn parse_field<T>(&self, index: usize) -> Result<T, RowError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.require(index)?;
        value.parse().map_err(|e: T::Err| RowError::InvalidField {
            index,
            value: value.to_string(),
            reason: e.to_string(),
        })
    }

    /// Fields joined with `sep`.
    pub fn join(&self, sep: &str) -> String {
        self.fields.join(sep)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.fields.iter()
    }

    /// Consume the row and return its fields.
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl Index<usize> for Row {
    type Output = str;

    /// Panics when `index` is out of range; use [`Row::require`] for a
    /// fallible lookup.
    fn index(&self, index: usize) -> &str {
        &self.fields[index]
    }
}

impl<S: Into<String>> From<Vec<S>> for Row {
    fn from(fields: Vec<S>) -> Self {
        Self::new(fields.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<const N: usize> PartialEq<[&str; N]> for Row {
    fn eq(&self, other: &[&str; N]) -> bool {
        self.fields.len() == N && self.fields.iter().zip(other).all(|(a, b)| a == b)
    }
}

/// Renders as a bracketed list, e.g. `[Warsaw, 1790658]`.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.fields.join(", "))
    }
}
