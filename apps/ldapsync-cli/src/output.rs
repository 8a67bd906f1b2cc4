//! Terminal output helpers

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CliResult;

/// Machine-readable output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Serialize `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Print a failure message (red cross)
pub fn print_failure(message: &str) {
    if use_color() {
        println!("\x1b[31m✗\x1b[0m {}", message);
    } else {
        println!("FAILED: {}", message);
    }
}

/// Print a summary line to stderr, keeping stdout for data
pub fn print_summary(message: &str) {
    if use_color() {
        eprintln!("\x1b[34mℹ\x1b[0m {}", message);
    } else {
        eprintln!("Info: {}", message);
    }
}
