//! Output formatters for CLI commands.
//!
//! Every command builds a serializable result and prints it through
//! [`format_output`], so `--format` behaves the same everywhere.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use skillc_core::cli::OutputFormat;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use skillc_cli::formatters::format_output;
/// use skillc_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     skill: String,
///     tools: usize,
/// }
///
/// let summary = Summary { skill: "weather-skill".to_string(), tools: 2 };
/// let output = format_output(&summary, OutputFormat::Json)?;
/// assert!(output.contains("\"skill\": \"weather-skill\""));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format data as single-line JSON.
    pub fn format_compact<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize, json};

    /// Format data as single-line JSON, for piping into other tools.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        json::format_compact(data)
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize};
    use serde_json::Value;

    /// Format data as an indented `key: value` listing with colors.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        match &value {
            Value::Object(_) | Value::Array(_) => write_value(&mut out, &value, 0),
            scalar => out.push_str(&scalar_text(scalar)),
        }
        Ok(out.trim_end().to_string())
    }

    fn write_value(out: &mut String, value: &Value, indent: usize) {
        let pad = "  ".repeat(indent);
        match value {
            Value::Object(map) => {
                for (key, item) in map {
                    let label = key.replace('_', " ");
                    match item {
                        Value::Object(inner) if !inner.is_empty() => {
                            out.push_str(&format!("{pad}{}:\n", label.bold()));
                            write_value(out, item, indent + 1);
                        }
                        Value::Array(items) if !items.is_empty() => {
                            out.push_str(&format!("{pad}{}:\n", label.bold()));
                            write_value(out, item, indent + 1);
                        }
                        _ => out.push_str(&format!("{pad}{}: {}\n", label.bold(), scalar_text(item))),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::Object(_) | Value::Array(_) => {
                            out.push_str(&format!("{pad}-\n"));
                            write_value(out, item, indent + 1);
                        }
                        _ => out.push_str(&format!("{pad}- {}\n", scalar_text(item))),
                    }
                }
            }
            scalar => out.push_str(&format!("{pad}{}\n", scalar_text(scalar))),
        }
    }

    fn scalar_text(value: &Value) -> String {
        match value {
            Value::Null => "none".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => s.green().to_string(),
            Value::Array(_) => "[]".dimmed().to_string(),
            Value::Object(_) => "{}".dimmed().to_string(),
        }
    }
}
