//! Terminal output formatting.
//!
//! Human-readable output uses colored symbols; `--json` switches every line to
//! a JSON object of the form `{"type": ..., "payload": ...}` for scripting.
//! Quiet mode suppresses everything except warnings, errors and the summary.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::json;

use crate::domain::RunSummary;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Verbosity level (0 = normal, 1+ = increasingly verbose).
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

fn regular_output_suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!(
        "{}",
        json!({
            "type": kind,
            "payload": payload,
        })
    );
}

/// Apply output settings from global CLI flags.
///
/// Call this before any handler prints, right after argument parsing.
pub fn configure(config: OutputConfig) {
    write_config(config);
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Return whether quiet mode is enabled.
#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

/// Verbosity from `-v` flags.
#[must_use]
pub fn verbosity() -> u8 {
    read_config().verbose
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    let config = read_config();
    if config.json {
        emit_json_line(
            "header",
            json!({
                "app": "pgfailover",
                "version": version,
            }),
        );
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("{} {}", "pgfailover".bold(), version.dimmed());
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();

    if config.json {
        emit_json_line(
            "field",
            json!({
                "label": label,
                "value": value,
            }),
        );
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {:<18} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line. Shown even in quiet mode.
pub fn warning(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    let config = read_config();

    if config.json {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }

    eprintln!("  {} {}", "×".red(), message);
}

/// Print a section header.
pub fn section(title: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!();
    println!("{}", title.bold());
}

/// Print a dimmed note.
pub fn note(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {}", message.dimmed());
}

/// Emit a JSON value directly, wrapped as `{"type": kind, "payload": value}`.
pub fn json_value(kind: &str, value: serde_json::Value) {
    emit_json_line(kind, value);
}

/// Print the end-of-run counters. Printed even in quiet mode.
pub fn summary(summary: &RunSummary) {
    let config = read_config();

    if config.json {
        match serde_json::to_value(summary) {
            Ok(value) => emit_json_line("summary", value),
            Err(e) => error(&format!("failed to serialize summary: {e}")),
        }
        return;
    }

    println!();
    println!("{}", "Summary".bold());
    println!("  {:<18} {}", "Inserts ok".dimmed(), summary.inserts_ok);
    println!("  {:<18} {}", "Selects ok".dimmed(), summary.selects_ok);
    println!("  {:<18} {}", "Errors".dimmed(), count(summary.errors));
    println!("  {:<18} {}", "Reconnects".dimmed(), count(summary.reconnects));
    println!("  {:<18} {}", "Outages".dimmed(), count(summary.outages));
    println!(
        "  {:<18} {:.3}s",
        "Outage time".dimmed(),
        summary.total_outage_secs
    );
    if config.verbose > 0 {
        println!("  {:<18} {:.3}s", "Elapsed".dimmed(), summary.elapsed_secs);
        println!(
            "  {:<18} {:.2}%",
            "Availability".dimmed(),
            summary.availability_pct()
        );
        if let Some(reason) = summary.stop_reason {
            println!("  {:<18} {}", "Stopped".dimmed(), reason);
        }
    }
    if summary.outage_open_at_end {
        println!(
            "  {} {}",
            "⚠".yellow(),
            "run ended while the target was unreachable"
        );
    }
}

/// Highlight non-zero failure counters.
fn count(value: u64) -> String {
    if value == 0 {
        value.green().to_string()
    } else {
        value.yellow().to_string()
    }
}
