//! Output formatting functions.

pub mod pretty;

use crate::cli::OutputFormat;

/// Format a value for output. JSON is compact so streams stay one line per item.
pub fn format_output<T: serde::Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(value).unwrap_or_default(),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}
