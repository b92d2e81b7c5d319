//! TAP formatter: one plan line plus one `ok`/`not ok`/`# SKIP` line per
//! resource, expanding into one line per validation error when present
//! (`pkg.tapOutputManager`).

use crate::validator::ValidationResult;

pub fn render(results: &[ValidationResult]) -> String {
  if results.is_empty() {
    return String::new();
  }

  let total: usize = results
    .iter()
    .map(|r| {
      let errors = r.errors_for_original.len() + r.errors_for_latest.len();
      if errors > 0 { errors } else { 1 }
    })
    .sum();

  let mut lines = Vec::with_capacity(total + 1);
  lines.push(format!("1..{total}"));

  let mut count = 0;
  for result in results {
    let kind_marker = if result.kind.is_empty() { String::new() } else { format!(" ({})", result.kind) };
    let errors: Vec<&str> = result
      .errors_for_original
      .iter()
      .chain(result.errors_for_latest.iter())
      .map(|e| e.reason.as_str())
      .collect();

    if result.kind.is_empty() {
      count += 1;
      lines.push(format!("ok {count} - {}{kind_marker} # SKIP", result.file_name));
    } else if errors.is_empty() {
      count += 1;
      lines.push(format!("ok {count} - {}{kind_marker}", result.file_name));
    } else {
      for reason in errors {
        count += 1;
        lines.push(format!("not ok {count} - {}{kind_marker} - {reason}", result.file_name));
      }
    }
  }

  lines.join("\n")
}
