//! Table type and the filter, select and map stages.
//!
//! Every stage borrows its input and returns a fresh value, so a table can be
//! fed to several stages. The free functions and the [`Table`] methods are
//! interchangeable:
//!
//! ```
//! use rowpipe::{Separator, parse_str};
//!
//! let sep = Separator::literal(";").unwrap();
//! let table = parse_str("Warsaw;Poland;1790658\nBerlin;Germany;3644826", &sep).unwrap();
//!
//! let names: Vec<String> = table
//!     .filter(|r| r.get(1) == Some("Poland"))
//!     .select(&[0])
//!     .map(|r| r[0].to_string());
//!
//! assert_eq!(names, vec!["Warsaw"]);
//! ```

use std::ops::Index;

use crate::error::{BoxError, PipelineError};
use crate::row::Row;

/// An ordered sequence of rows, in source line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Keep rows for which `predicate` returns true.
    pub fn filter<P>(&self, predicate: P) -> Table
    where
        P: FnMut(&Row) -> bool,
    {
        filter(self, predicate)
    }

    /// Keep rows for which a fallible `predicate` returns `Ok(true)`.
    pub fn try_filter<P, E>(&self, predicate: P) -> Result<Table, PipelineError>
    where
        P: FnMut(&Row) -> Result<bool, E>,
        E: Into<BoxError>,
    {
        try_filter(self, predicate)
    }

    /// Project each row onto `indices`.
    pub fn select(&self, indices: &[i64]) -> Table {
        select(self, indices)
    }

    /// Convert each row with `mapper`.
    pub fn map<T, F>(&self, mapper: F) -> Vec<T>
    where
        F: FnMut(&Row) -> T,
    {
        map(self, mapper)
    }

    /// Convert each row with a fallible `mapper`.
    pub fn try_map<T, F, E>(&self, mapper: F) -> Result<Vec<T>, PipelineError>
    where
        F: FnMut(&Row) -> Result<T, E>,
        E: Into<BoxError>,
    {
        try_map(self, mapper)
    }
}

impl Index<usize> for Table {
    type Output = Row;

    fn index(&self, index: usize) -> &Row {
        &self.rows[index]
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for Table {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Filter stage: keep rows matching `predicate`, in order.
pub fn filter<P>(table: &Table, mut predicate: P) -> Table
where
    P: FnMut(&Row) -> bool,
{
    table.iter().filter(|row| predicate(row)).cloned().collect()
}

/// Fallible filter stage.
///
/// The first predicate error aborts the stage; no partial table is returned.
/// The error carries the failing row's position.
pub fn try_filter<P, E>(table: &Table, mut predicate: P) -> Result<Table, PipelineError>
where
    P: FnMut(&Row) -> Result<bool, E>,
    E: Into<BoxError>,
{
    let mut kept = Vec::new();
    for (pos, row) in table.iter().enumerate() {
        if predicate(row).map_err(|e| PipelineError::transform("filter", pos, e))? {
            kept.push(row.clone());
        }
    }
    Ok(Table::new(kept))
}

/// Select stage: build each output row from the fields at `indices`.
///
/// Indices may repeat. Out-of-range and negative indices yield `""`, so
/// every output row has exactly `indices.len()` fields.
pub fn select(table: &Table, indices: &[i64]) -> Table {
    table
        .iter()
        .map(|row| indices.iter().map(|&i| row.get_or_empty(i)).collect::<Row>())
        .collect()
}

/// Map stage: one output value per row, in order.
pub fn map<T, F>(table: &Table, mapper: F) -> Vec<T>
where
    F: FnMut(&Row) -> T,
{
    table.iter().map(mapper).collect()
}

/// Fallible map stage.
///
/// The first mapper error aborts the stage; no partial results are returned.
pub fn try_map<T, F, E>(table: &Table, mut mapper: F) -> Result<Vec<T>, PipelineError>
where
    F: FnMut(&Row) -> Result<T, E>,
    E: Into<BoxError>,
{
    table
        .iter()
        .enumerate()
        .map(|(pos, row)| mapper(row).map_err(|e| PipelineError::transform("map", pos, e)))
        .collect()
}
