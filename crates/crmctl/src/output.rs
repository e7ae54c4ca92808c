//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Record tables are
//! built from the generated columns of each resource; structured formats
//! serialize the raw records via serde; plain emits one id per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crmctl_core::table::{Column, render_rows};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Report a completed action on stderr.
pub fn success(global: &GlobalOpts, message: &str) {
    if global.quiet {
        return;
    }
    if should_color(global.color) {
        eprintln!("{} {message}", "✓".green());
    } else {
        eprintln!("✓ {message}");
    }
}

/// Informational note on stderr.
pub fn note(global: &GlobalOpts, message: &str) {
    if global.quiet {
        return;
    }
    if should_color(global.color) {
        eprintln!("{}", message.dimmed());
    } else {
        eprintln!("{message}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render records through generated columns.
///
/// - `table`: an id column followed by every generated column
/// - `json` / `json-compact` / `yaml`: the raw records
/// - `plain`: one record id per line
pub fn render_records(format: OutputFormat, columns: &[Column], records: &[Value]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let headers = std::iter::once("ID".to_owned()).chain(columns.iter().map(|c| c.title.clone()));
            let rows = records
                .iter()
                .zip(render_rows(columns, records))
                .map(|(record, cells)| std::iter::once(record_id(record)).chain(cells).collect());
            Ok(render_grid(headers.collect(), rows.collect()))
        }
        OutputFormat::Plain => Ok(records.iter().map(record_id).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, records),
    }
}

/// Render one record as `Title: value` lines.
pub fn render_record(format: OutputFormat, columns: &[Column], record: &Value) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let width = columns.iter().map(|c| c.title.chars().count()).max().unwrap_or(0).max(2);
            let mut lines = vec![format!("{:<width$}  {}", "ID", record_id(record))];
            lines.extend(
                columns
                    .iter()
                    .map(|c| format!("{:<width$}  {}", c.title, c.render(record))),
            );
            Ok(lines.join("\n"))
        }
        OutputFormat::Plain => Ok(record_id(record)),
        structured => render_structured(structured, record),
    }
}

/// Render any serializable value, using `detail_fn` for table output and
/// `id_fn` for plain output.
pub fn render_single<T: Serialize>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// A rounded table from a header row and body rows.
pub fn render_grid(headers: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_structured<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    })
}

pub(crate) fn record_id(record: &Value) -> String {
    match record.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
