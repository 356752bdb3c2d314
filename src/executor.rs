//! Batch executor for stage language commands.
//!
//! Each command runs over the whole table before the next one starts. A
//! failing stage aborts the run and nothing after it is executed.

use log::debug;

use crate::dsl::Command;
use crate::error::{PipelineError, RowError};
use crate::pipeline::{Table, select, try_filter, try_map};
use crate::row::Row;

/// Row counts observed at one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: &'static str,
    pub input_rows: usize,
    pub output_rows: usize,
}

/// Result of running a command list.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub table: Table,
    pub stages: Vec<StageReport>,
}

impl Execution {
    /// Rows entering the first stage.
    pub fn input_rows(&self) -> usize {
        self.stages
            .first()
            .map_or(self.table.len(), |s| s.input_rows)
    }

    pub fn output_rows(&self) -> usize {
        self.table.len()
    }
}

/// Apply `commands` to `table` in order.
pub fn execute(table: &Table, commands: &[Command]) -> Result<Execution, PipelineError> {
    let mut current = table.clone();
    let mut stages = Vec::with_capacity(commands.len());

    for (index, cmd) in commands.iter().enumerate() {
        let input_rows = current.len();
        current = apply_command(&current, cmd)?;
        debug!(
            "stage {index} {}: {input_rows} -> {} rows",
            cmd.name(),
            current.len()
        );
        stages.push(StageReport {
            name: cmd.name(),
            input_rows,
            output_rows: current.len(),
        });
    }

    Ok(Execution {
        table: current,
        stages,
    })
}

/// Apply a single command to a table.
fn apply_command(table: &Table, cmd: &Command) -> Result<Table, PipelineError> {
    match cmd {
        Command::Filter { field, op, value } => {
            // Short rows fail the stage instead of being dropped
            try_filter(table, |row| {
                row.require(*field).map(|f| op.matches(f, value))
            })
        }
        Command::Locate { pattern, field } => {
            Ok(table.filter(|row| row_contains(row, pattern, *field)))
        }
        Command::Nlocate { pattern, field } => {
            Ok(table.filter(|row| !row_contains(row, pattern, *field)))
        }
        Command::Select { indices } => Ok(select(table, indices)),
        Command::Take { n } => Ok(table.iter().take(*n).cloned().collect()),
        Command::Skip { n } => Ok(table.iter().skip(*n).cloned().collect()),
        Command::Format { template } => {
            let rendered = try_map(table, |row| template.render(row))?;
            Ok(rendered.into_iter().map(|s| Row::new(vec![s])).collect())
        }
        Command::Count => Ok(Table::new(vec![Row::new(vec![table.len().to_string()])])),
    }
}

/// Does `row` (or its field `field`) contain `pattern`?
///
/// A missing field never contains anything.
fn row_contains(row: &Row, pattern: &str, field: Option<usize>) -> bool {
    match field {
        Some(i) => row.get(i).is_some_and(|f| f.contains(pattern)),
        None => row.iter().any(|f| f.contains(pattern)),
    }
}

/// Extract the [`RowError`] behind a transform failure, if any.
pub fn row_error(err: &PipelineError) -> Option<&RowError> {
    match err {
        PipelineError::TransformFailure { source, .. } => source.downcast_ref::<RowError>(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse_commands;
    use crate::parse::parse_str;
    use crate::separator::Separator;

    const CITIES: &str = "\
Warsaw;Poland;1790658;517.24
Krakow;Poland;779115;326.85
Berlin;Germany;3644826;891.68
";

    fn cities() -> Table {
        parse_str(CITIES, &Separator::literal(";").unwrap()).unwrap()
    }

    fn run(pipeline: &str) -> Result<Execution, PipelineError> {
        execute(&cities(), &parse_commands(pipeline).unwrap())
    }

    #[test]
    fn test_empty_pipeline_passes_through() {
        let exec = run("").unwrap();
        assert_eq!(exec.table, cities());
        assert!(exec.stages.is_empty());
        assert_eq!(exec.input_rows(), 3);
        assert_eq!(exec.output_rows(), 3);
    }

    #[test]
    fn test_filter_select() {
        let exec = run("FILTER 1 = /Poland/\n| SELECT 0,2").unwrap();
        assert_eq!(exec.table.len(), 2);
        assert_eq!(exec.table[0], ["Warsaw", "1790658"]);
        assert_eq!(exec.table[1], ["Krakow", "779115"]);
        assert_eq!(
            exec.stages,
            vec![
                StageReport {
                    name: "FILTER",
                    input_rows: 3,
                    output_rows: 2
                },
                StageReport {
                    name: "SELECT",
                    input_rows: 2,
                    output_rows: 2
                },
            ]
        );
    }

    #[test]
    fn test_filter_ignore_case() {
        let exec = run("FILTER 1 ~ /POLAND/").unwrap();
        assert_eq!(exec.output_rows(), 2);
    }

    #[test]
    fn test_filter_ignore_case_folds_non_ascii() {
        let table = parse_str("x;ŁÓDŹ\ny;Łódź\nz;Lodz\n", &Separator::literal(";").unwrap()).unwrap();
        let commands = parse_commands("FILTER 1 ~ /łódź/").unwrap();
        let exec = execute(&table, &commands).unwrap();
        assert_eq!(exec.output_rows(), 2);
        assert_eq!(exec.table[0], ["x", "ŁÓDŹ"]);
        assert_eq!(exec.table[1], ["y", "Łódź"]);
    }

    #[test]
    fn test_filter_short_row_fails() {
        let table = parse_str("a;x\nb\n", &Separator::literal(";").unwrap()).unwrap();
        let commands = parse_commands("FILTER 1 = /x/").unwrap();
        let err = execute(&table, &commands).unwrap_err();
        assert_eq!(err.row(), Some(1));
        assert_eq!(
            row_error(&err),
            Some(&RowError::MissingField { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_locate_and_nlocate() {
        assert_eq!(run("LOCATE /Pol/").unwrap().output_rows(), 2);
        assert_eq!(run("LOCATE 0 /Pol/").unwrap().output_rows(), 0);
        assert_eq!(run("LOCATE 1 /many/").unwrap().output_rows(), 1);
        assert_eq!(&run("NLOCATE 1 /Pol/").unwrap().table[0][0], "Berlin");
        // Missing field never matches
        assert_eq!(run("LOCATE 9 //").unwrap().output_rows(), 0);
        assert_eq!(run("NLOCATE 9 //").unwrap().output_rows(), 3);
    }

    #[test]
    fn test_take_skip() {
        let exec = run("SKIP 1\n| TAKE 1").unwrap();
        assert_eq!(exec.table.len(), 1);
        assert_eq!(&exec.table[0][0], "Krakow");
        assert_eq!(run("TAKE 10").unwrap().output_rows(), 3);
        assert_eq!(run("SKIP 10").unwrap().output_rows(), 0);
    }

    #[test]
    fn test_format() {
        let exec = run("FILTER 1 = /Poland/\n| FORMAT /{0} (pop: {2})/").unwrap();
        assert_eq!(exec.table[0], ["Warsaw (pop: 1790658)"]);
        assert_eq!(exec.table[1], ["Krakow (pop: 779115)"]);
    }

    #[test]
    fn test_format_missing_field_fails() {
        let err = run("FORMAT /{7}/").unwrap_err();
        assert!(err.to_string().starts_with("map failed at row 0"));
    }

    #[test]
    fn test_count() {
        let exec = run("FILTER 1 != /Poland/\n| COUNT").unwrap();
        assert_eq!(exec.table.len(), 1);
        assert_eq!(exec.table[0], ["1"]);
        assert_eq!(exec.input_rows(), 3);
    }

    #[test]
    fn test_count_of_empty_table() {
        let exec = execute(&Table::default(), &[Command::Count]).unwrap();
        assert_eq!(exec.table[0], ["0"]);
    }
}
