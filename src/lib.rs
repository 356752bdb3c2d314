//! # rowpipe
//!
//! Delimited text parsing with row-level filter, select and map stages.
//!
//! ## Overview
//!
//! A pipeline run has a fixed shape:
//! - **Parse**: read lines, skip blank and `#` comment lines, split the rest
//!   on a separator and trim every field
//! - **Filter**: keep rows matching a predicate
//! - **Select**: keep chosen columns by index, padding missing ones with `""`
//! - **Map**: turn each row into a value of any type
//!
//! Parse runs first; the other stages run in any order after it. No stage
//! reorders rows or mutates its input.
//!
//! ## Example
//!
//! ```
//! use rowpipe::{Row, RowError, Separator, parse_str};
//!
//! let text = "\
//! Warsaw;Poland;1790658;517.24
//! Krakow;Poland;779115;326.85
//! Berlin;Germany;3644826;891.68
//! ";
//!
//! let table = parse_str(text, &Separator::literal(";").unwrap()).unwrap();
//! let polish = table
//!     .try_filter(|r| Ok::<_, RowError>(r.require(1)? == "Poland"))
//!     .unwrap();
//!
//! let cities: Vec<(String, u32)> = polish
//!     .try_map(|r: &Row| Ok::<_, RowError>((r.require(0)?.to_string(), r.parse_field(2)?)))
//!     .unwrap();
//!
//! assert_eq!(cities, vec![("Warsaw".to_string(), 1790658), ("Krakow".to_string(), 779115)]);
//! ```

pub mod dsl;
pub mod error;
pub mod executor;
pub mod parse;
pub mod pipeline;
pub mod row;
pub mod separator;
pub mod template;

pub use dsl::{Command, FilterOp, parse_commands};
pub use error::{BoxError, PipelineError, RowError};
pub use executor::{Execution, StageReport, execute, row_error};
pub use parse::{COMMENT_PREFIX, ParseOptions, parse, parse_file, parse_file_with, parse_str, parse_with};
pub use pipeline::{Table, filter, map, select, try_filter, try_map};
pub use row::Row;
pub use separator::Separator;
pub use template::Template;
