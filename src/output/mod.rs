//! Output formatters (C10): `stdout`, `json`, `tap` (§4.10).

mod json;
mod stdout;
mod tap;

use crate::config::OutputFormat;
use crate::validator::ValidationResult;

/// Renders `results` per `format` and returns the text to print.
pub fn render(results: &[ValidationResult], format: OutputFormat, no_color: bool) -> String {
  match format {
    OutputFormat::Stdout => stdout::render(results, no_color),
    OutputFormat::Json => json::render(results),
    OutputFormat::Tap => tap::render(results),
  }
}
