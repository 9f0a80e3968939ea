//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};
use vayu_core::format::{AirQualityLevel, RiskLevel, SystemHealth};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Paint an air-quality band: green through magenta.
pub fn paint_level(level: AirQualityLevel, color: bool) -> String {
    let text = level.to_string();
    if !color {
        return text;
    }
    match level {
        AirQualityLevel::Good => text.green().to_string(),
        AirQualityLevel::Moderate => text.yellow().to_string(),
        AirQualityLevel::Unhealthy => text.bright_red().to_string(),
        AirQualityLevel::VeryUnhealthy => text.red().bold().to_string(),
        AirQualityLevel::Hazardous => text.magenta().bold().to_string(),
    }
}

pub fn paint_risk(risk: RiskLevel, color: bool) -> String {
    let text = risk.to_string();
    if !color {
        return text;
    }
    match risk {
        RiskLevel::Low => text.green().to_string(),
        RiskLevel::Medium => text.yellow().to_string(),
        RiskLevel::High => text.red().bold().to_string(),
    }
}

pub fn paint_health(health: SystemHealth, color: bool) -> String {
    let text = health.to_string();
    if !color {
        return text;
    }
    match health {
        SystemHealth::Healthy => text.green().to_string(),
        SystemHealth::Warning => text.yellow().to_string(),
        SystemHealth::Critical => text.red().bold().to_string(),
    }
}

/// Print a warning line to stderr.
pub fn warn(message: &str, color: bool) {
    let line = if color {
        format!("{} {message}", "warning:".yellow().bold())
    } else {
        format!("warning: {message}")
    };
    let _ = writeln!(io::stderr().lock(), "{line}");
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `plain`: calls `id_fn` on each item to emit one value per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Plain => id_fn(data),
    }
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

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        render_json_compact(data)
    } else {
        render_json_pretty(data)
    }
}
