//! CLI tool to parse a delimited file and run stages over its rows.
//!
//! Usage:
//!   rowpipe cities.csv -s ';' -p 'FILTER 1 ~ /poland/' -p 'SELECT 0,2'
//!   rowpipe cities.csv -f polish-cities.pipe -o out.txt

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug};
use rowpipe::{Execution, ParseOptions, Row, Separator, execute, parse_commands, parse_file_with};

/// How each output row is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Bracketed list: `[Warsaw, 1790658]`
    List,
    /// Fields joined with `--join`
    Joined,
}

/// Parse a delimited text file and run filter/select/map stages over it.
///
/// Blank lines and lines starting with `#` are skipped; every field is
/// trimmed. Without stages, all parsed rows are printed.
#[derive(Parser)]
#[command(name = "rowpipe")]
struct Cli {
    /// Input data file (or /dev/stdin)
    input: PathBuf,

    /// Field separator
    #[arg(short, long, default_value = ";")]
    separator: String,

    /// Treat the separator as a regular expression
    #[arg(long)]
    regex: bool,

    /// Stage to run, e.g. 'FILTER 1 = /Poland/' (repeatable, applied in order).
    /// Each value is a single stage; '?' and line breaks are rejected
    #[arg(short = 'p', long = "stage", conflicts_with = "pipeline")]
    stages: Vec<String>,

    /// Stage file, one stage per line
    #[arg(short = 'f', long)]
    pipeline: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output row format
    #[arg(long, value_enum, default_value_t = OutputFormat::List)]
    display: OutputFormat,

    /// Field joiner for `--display joined`
    #[arg(long, default_value = ";")]
    join: String,

    /// Show paths and row counts on stderr, enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

/// Join `-p` values into stage text, one stage per line.
fn inline_stages(stages: &[String]) -> Result<String> {
    for stage in stages {
        if stage.trim() == "?" {
            bail!("'?' is not a stage; it would end the pipeline and drop later -p stages");
        }
        if stage.contains(['\n', '\r']) {
            bail!("stage '{}' spans several lines; pass one stage per -p", stage.trim());
        }
    }
    Ok(stages.join("\n"))
}

fn run(cli: &Cli) -> Result<()> {
    let separator = if cli.regex {
        Separator::pattern(&cli.separator)?
    } else {
        Separator::literal(cli.separator.as_str())?
    };

    let pipeline_text = match &cli.pipeline {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading stage file '{}'", path.display()))?,
        None => inline_stages(&cli.stages)?,
    };
    let commands = parse_commands(&pipeline_text).context("parsing stages")?;
    debug!("{} stages", commands.len());

    if cli.verbose {
        eprintln!("Input:     {}", cli.input.display());
        eprintln!("Separator: {separator}");
        if let Some(path) = &cli.pipeline {
            eprintln!("Stages:    {}", path.display());
        }
        eprintln!(
            "Output:    {}",
            cli.output
                .as_ref()
                .map_or_else(|| "(stdout)".to_string(), |p| p.display().to_string())
        );
    }

    let table = parse_file_with(&cli.input, &ParseOptions::new(separator))?;
    let execution = execute(&table, &commands)?;
    let output = render(&execution, cli.display, &cli.join);

    match &cli.output {
        Some(out_path) => write_output_file(out_path, &output)?,
        None => io::stdout()
            .write_all(output.as_bytes())
            .context("writing output")?,
    }

    if cli.verbose {
        for stage in &execution.stages {
            eprintln!(
                "Stage:     {} {} -> {}",
                stage.name, stage.input_rows, stage.output_rows
            );
        }
        eprintln!(
            "Rows:      {} in -> {} out",
            execution.input_rows(),
            execution.output_rows()
        );
    }

    Ok(())
}

/// One line per row, each terminated by a newline.
fn render(execution: &Execution, display: OutputFormat, join: &str) -> String {
    let mut out = String::new();
    for row in &execution.table {
        out.push_str(&render_row(row, display, join));
        out.push('\n');
    }
    out
}

fn render_row(row: &Row, display: OutputFormat, join: &str) -> String {
    match display {
        OutputFormat::List => row.to_string(),
        OutputFormat::Joined => row.join(join),
    }
}

fn write_output_file(out_path: &Path, output: &str) -> Result<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory for '{}'", out_path.display()))?;
    }
    fs::write(out_path, output)
        .with_context(|| format!("writing output file '{}'", out_path.display()))
}
