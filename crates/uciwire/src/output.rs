//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits `uci show` style lines.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use uciwire_core::{OptionValue, Section};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status line on stderr, e.g. after a save.
pub fn notice(mode: &ColorMode, quiet: bool, message: &str) {
    if quiet {
        return;
    }
    if should_color(mode) {
        eprintln!("{} {message}", "✓".green());
    } else {
        eprintln!("✓ {message}");
    }
}

/// Warning line on stderr; printed even in quiet mode.
pub fn warning(mode: &ColorMode, message: &str) {
    if should_color(mode) {
        eprintln!("{} {message}", "!".yellow().bold());
    } else {
        eprintln!("! {message}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `line_fn` on each item
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(data)?,
        OutputFormat::JsonCompact => render_json_compact(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => data.iter().map(&line_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json_pretty(data)?,
        OutputFormat::JsonCompact => render_json_compact(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => plain_fn(data),
    })
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

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(
    data: &T,
) -> Result<String, CliError> {
    Ok(serde_json::to_string(data)?)
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

// ── uci show notation ────────────────────────────────────────────────

/// Quote a value the way `uci show` does: single quotes, with embedded
/// quotes closed, escaped, and reopened.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn quote_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Scalar(s) => quote(s),
        OptionValue::List(items) => items.iter().map(|v| quote(v)).collect::<Vec<_>>().join(" "),
    }
}

/// `uci show` lines for a set of sections. Anonymous sections are
/// addressed as `@type[n]`, counting per type in the given order.
pub fn uci_lines(config: &str, sections: &[Section]) -> String {
    let mut counters: HashMap<&str, usize> = HashMap::new();
    let mut out = String::new();

    for section in sections {
        let counter = counters.entry(section.section_type.as_str()).or_default();
        let id = if section.anonymous {
            format!("@{}[{counter}]", section.section_type)
        } else {
            section.name.clone()
        };
        *counter += 1;

        let _ = writeln!(out, "{config}.{id}={}", section.section_type);
        for (name, value) in &section.options {
            let _ = writeln!(out, "{config}.{id}.{name}={}", quote_value(value));
        }
    }

    out.trim_end().to_owned()
}
