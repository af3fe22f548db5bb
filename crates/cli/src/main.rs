//! # sweeper-cli
//!
//! Command-line interface for sweeper: clean CSV and Excel files in batch.

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sweeper_core::sheet::{CellValue, Table};
use sweeper_core::{run_batch, Action, FileFormat, Plan, ProcessedFile, UploadedFile};
use tracing_subscriber::EnvFilter;

/// sweep - remove duplicates, fill gaps and convert CSV/Excel files
#[derive(Parser)]
#[command(name = "sweep")]
#[command(author, version, about = "Clean and convert CSV and Excel files", long_about = None)]
struct Cli {
    /// Files to process (.csv or .xlsx)
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Remove rows that duplicate an earlier row
    #[arg(long)]
    dedupe: bool,

    /// Fill missing numeric cells with the column mean
    #[arg(long)]
    fill_missing: bool,

    /// Keep only these columns (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "COLUMNS")]
    columns: Option<Vec<String>>,

    /// Write a bar chart of the first numeric columns as HTML
    #[arg(long)]
    chart: bool,

    /// Output format
    #[arg(long = "to", value_enum, default_value = "csv")]
    to: Target,

    /// Directory for the converted files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the first N rows of each cleaned table
    #[arg(long, value_name = "N")]
    preview: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for converted files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum Target {
    /// Comma-separated values (default)
    #[default]
    Csv,
    /// Excel workbook
    Xlsx,
}

impl From<Target> for FileFormat {
    fn from(target: Target) -> Self {
        match target {
            Target::Csv => FileFormat::Csv,
            Target::Xlsx => FileFormat::Xlsx,
        }
    }
}

impl Cli {
    /// Actions to run on every file, in pipeline order.
    fn plan(&self) -> Plan {
        let mut plan = Plan::new();
        if self.dedupe {
            plan = plan.then(Action::RemoveDuplicates);
        }
        if self.fill_missing {
            plan = plan.then(Action::FillMissing);
        }
        if let Some(columns) = &self.columns {
            plan = plan.then(Action::SelectColumns {
                columns: columns.iter().map(|c| c.trim().to_string()).collect(),
            });
        }
        if self.chart {
            plan = plan.then(Action::Visualize);
        }
        plan.then(Action::Export {
            format: self.to.into(),
        })
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let failures = run(&cli)?;
    if failures > 0 {
        eprintln!(
            "{} {failures} of {} files failed",
            "Error:".red().bold(),
            cli.files.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Process every file and return how many failed.
fn run(cli: &Cli) -> Result<usize> {
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("Failed to create directory: {}", cli.out_dir.display()))?;
    let out_dir = fs::canonicalize(&cli.out_dir)
        .with_context(|| format!("Failed to resolve directory: {}", cli.out_dir.display()))?;

    let mut failures = 0;
    // inputs and every file written so far; none of them may be overwritten
    let mut claimed = HashSet::new();
    let mut uploads = Vec::new();
    for path in &cli.files {
        match read_upload(path) {
            Ok(upload) => {
                if let Ok(source) = fs::canonicalize(path) {
                    claimed.insert(source);
                }
                uploads.push(upload);
            }
            Err(e) => {
                eprintln!("{} {e:#}", "Error:".red().bold());
                failures += 1;
            }
        }
    }

    let plan = cli.plan();
    for report in run_batch(uploads, &plan) {
        let processed = match report.result {
            Ok(processed) => processed,
            Err(e) => {
                eprintln!("{} {}: {e}", "Error:".red().bold(), report.file_name);
                failures += 1;
                continue;
            }
        };

        println!(
            "{} {}: {}",
            "✓".green().bold(),
            report.file_name,
            processed.messages.join(", ")
        );

        match write_outputs(&processed, &out_dir, &mut claimed) {
            Ok(written) => {
                for path in written {
                    println!("  {} {}", "wrote".cyan(), path.display());
                }
            }
            Err(e) => {
                eprintln!("{} {e:#}", "Error:".red().bold());
                failures += 1;
                continue;
            }
        }

        if let Some(limit) = cli.preview {
            let table = processed.session.current()?;
            print!("{}", format_preview(&table, limit));
        }
    }

    Ok(failures)
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file: {}", path.display()))?;
    Ok(UploadedFile::new(name, content))
}

/// Write exported files and chart pages into `out_dir`.
///
/// `claimed` holds the canonical paths of the inputs and of everything
/// already written; a target in that set fails the file before anything is
/// written. `out_dir` must be canonical.
fn write_outputs(
    processed: &ProcessedFile,
    out_dir: &Path,
    claimed: &mut HashSet<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let stem = Path::new(&processed.session.info().name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut outputs: Vec<(PathBuf, Vec<u8>)> = processed
        .artifacts
        .iter()
        .map(|artifact| (out_dir.join(&artifact.file_name), artifact.bytes.clone()))
        .collect();
    for chart in &processed.charts {
        outputs.push((
            out_dir.join(format!("{stem}.chart.html")),
            chart.to_html().into_bytes(),
        ));
    }

    for (target, _) in &outputs {
        if claimed.contains(target) {
            bail!(
                "Refusing to overwrite {}: it is an input or was already written; use --out-dir or --to",
                target.display()
            );
        }
    }

    let mut written = Vec::new();
    for (target, bytes) in outputs {
        fs::write(&target, bytes)
            .with_context(|| format!("Failed to write file: {}", target.display()))?;
        claimed.insert(target.clone());
        written.push(target);
    }

    Ok(written)
}

/// Render the first `limit` rows as an aligned text table.
fn format_preview(table: &Table, limit: usize) -> String {
    let header: Vec<String> = table.column_names().to_vec();
    let rows: Vec<Vec<String>> = table
        .rows()
        .take(limit)
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        format!("  {}\n", padded.join(" | ").trim_end())
    };

    let mut out = render(&header);
    for row in &rows {
        out.push_str(&render(row));
    }
    if table.row_count() > rows.len() {
        out.push_str(&format!("  ... {} more rows\n", table.row_count() - rows.len()));
    }
    out
}

fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "null".to_string(),
        other => other.to_field(),
    }
}
