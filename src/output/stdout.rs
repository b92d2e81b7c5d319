//! Partitioned table formatter (`pkg.STDOutputManager`): buckets resources
//! into removed / deprecated / newer-version-available / unchanged sections,
//! each rendered as a `tabled` table.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::validator::ValidationResult;

#[derive(Tabled)]
struct SummaryRow {
  #[tabled(rename = "NAMESPACE")]
  namespace: String,
  #[tabled(rename = "NAME")]
  name: String,
  #[tabled(rename = "KIND")]
  kind: String,
  #[tabled(rename = "API VERSION")]
  api_version: String,
  #[tabled(rename = "REPLACE WITH")]
  latest_api_version: String,
  #[tabled(rename = "MIGRATION STATUS")]
  migration_status: String,
}

#[derive(Tabled)]
struct FindingRow {
  #[tabled(rename = "NAMESPACE")]
  namespace: String,
  #[tabled(rename = "NAME")]
  name: String,
  #[tabled(rename = "KIND")]
  kind: String,
  #[tabled(rename = "API VERSION")]
  api_version: String,
  #[tabled(rename = "FIELD")]
  field: String,
  #[tabled(rename = "REASON")]
  reason: String,
}

pub fn render(results: &[ValidationResult], no_color: bool) -> String {
  let mut deleted = Vec::new();
  let mut deprecated = Vec::new();
  let mut newer_version = Vec::new();
  let mut unchanged = Vec::new();

  for result in results {
    if result.kind.is_empty() {
      continue;
    } else if result.deleted {
      deleted.push(result);
    } else if result.deprecated {
      deprecated.push(result);
    } else if !result.latest_api_version.is_empty() {
      newer_version.push(result);
    } else if result.is_uninteresting() {
      unchanged.push(result);
    }
  }

  for bucket in [&mut deleted, &mut deprecated, &mut newer_version] {
    bucket.sort_by_key(|r| std::cmp::Reverse(r.errors_for_latest.len()));
  }

  let mut out = Vec::new();

  if !deleted.is_empty() {
    out.push(section_header(">>>> Removed API Versions <<<<", no_color, Color::Red));
    out.push(summary_table(&deleted));
    out.push(findings_table(&deleted, "Validation errors against latest API version", false, Kind::Error));
    out.push(findings_table(&deleted, "Deprecated fields against latest API version", false, Kind::Deprecation));
  }
  if !deprecated.is_empty() {
    out.push(section_header(">>>> Deprecated API Versions <<<<", no_color, Color::Yellow));
    out.push(summary_table(&deprecated));
    out.push(findings_table(&deprecated, "Deprecated fields against current API version", true, Kind::Deprecation));
    out.push(findings_table(&deprecated, "Validation errors against current API version", true, Kind::Error));
    out.push(findings_table(&deprecated, "Deprecated fields against latest API version", false, Kind::Deprecation));
    out.push(findings_table(&deprecated, "Validation errors against latest API version", false, Kind::Error));
  }
  if !newer_version.is_empty() {
    out.push(section_header(">>>> Newer Versions Available <<<<", no_color, Color::Yellow));
    out.push(summary_table(&newer_version));
    out.push(findings_table(&newer_version, "Deprecated fields against current API version", true, Kind::Deprecation));
    out.push(findings_table(&newer_version, "Validation errors against current API version", true, Kind::Error));
    out.push(findings_table(&newer_version, "Deprecated fields against latest API version", false, Kind::Deprecation));
    out.push(findings_table(&newer_version, "Validation errors against latest API version", false, Kind::Error));
  }
  if !unchanged.is_empty() {
    out.push(section_header(">>>> Unchanged API Versions <<<<", no_color, Color::Green));
    out.push(findings_table(&unchanged, "Deprecated fields against current API version", true, Kind::Deprecation));
    out.push(findings_table(&unchanged, "Validation errors against current API version", true, Kind::Error));
  }

  if deleted.is_empty() && deprecated.is_empty() && newer_version.is_empty() && unchanged.is_empty() {
    out.push(section_header("Everything will work as-is after the migration", no_color, Color::Green));
  }

  out.into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join("\n\n")
}

enum Color {
  Red,
  Yellow,
  Green,
}

fn section_header(text: &str, no_color: bool, color: Color) -> String {
  if no_color {
    return text.to_string();
  }
  let ansi = match color {
    Color::Red => anstyle::AnsiColor::BrightRed,
    Color::Yellow => anstyle::AnsiColor::BrightYellow,
    Color::Green => anstyle::AnsiColor::BrightGreen,
  };
  let style = anstyle::Style::new().underline().fg_color(Some(anstyle::Color::Ansi(ansi)));
  format!("{}{text}{}", style.render(), style.render_reset())
}

fn summary_table(results: &[&ValidationResult]) -> String {
  let rows: Vec<SummaryRow> = results
    .iter()
    .map(|result| {
      let migration_status = if result.is_version_supported == 2 {
        "cannot migrate: no replacement API version".to_string()
      } else if !result.errors_for_latest.is_empty() {
        format!("{} issue(s): fix before migrating", result.errors_for_latest.len())
      } else {
        "can be migrated with just an apiVersion change".to_string()
      };
      SummaryRow {
        namespace: result.resource_namespace.clone(),
        name: result.resource_name.clone(),
        kind: result.kind.clone(),
        api_version: result.api_version.clone(),
        latest_api_version: result.latest_api_version.clone(),
        migration_status,
      }
    })
    .collect();
  let mut table = Table::new(rows);
  table.with(Style::sharp());
  table.to_string()
}

enum Kind {
  Error,
  Deprecation,
}

fn findings_table(results: &[&ValidationResult], title: &str, against_original: bool, kind: Kind) -> String {
  let mut rows = Vec::new();
  for result in results {
    let (errors, api_version) = match (against_original, &kind) {
      (true, Kind::Error) => (&result.errors_for_original, &result.api_version),
      (false, Kind::Error) => (&result.errors_for_latest, &result.latest_api_version),
      (true, Kind::Deprecation) => (&result.deprecation_for_original, &result.api_version),
      (false, Kind::Deprecation) => (&result.deprecation_for_latest, &result.latest_api_version),
    };
    for error in errors.iter() {
      rows.push(FindingRow {
        namespace: result.resource_namespace.clone(),
        name: result.resource_name.clone(),
        kind: result.kind.clone(),
        api_version: api_version.clone(),
        field: error.joined_pointer(),
        reason: error.reason.clone(),
      });
    }
  }
  if rows.is_empty() {
    return String::new();
  }
  let mut table = Table::new(rows);
  table.with(Style::sharp());
  format!("{title}\n{table}")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validator::SchemaError;

  fn error(reason: &str) -> SchemaError {
    SchemaError {
      path: vec!["spec".to_string()],
      schema_field: "spec".to_string(),
      reason: reason.to_string(),
      value: None,
      schema_type: None,
      schema_description: None,
    }
  }

  #[test]
  fn deleted_resource_lands_in_removed_section() {
    let result = ValidationResult {
      kind: "Deployment".to_string(),
      deleted: true,
      latest_api_version: "apps/v1".to_string(),
      ..Default::default()
    };
    let rendered = render(&[result], true);
    assert!(rendered.contains("Removed API Versions"));
  }

  #[test]
  fn no_findings_prints_everything_is_fine() {
    let rendered = render(&[], true);
    assert!(rendered.contains("Everything will work as-is"));
  }

  #[test]
  fn findings_table_reports_reason() {
    let mut result = ValidationResult { kind: "Deployment".to_string(), deleted: true, ..Default::default() };
    result.errors_for_latest.push(error("required field missing"));
    let rendered = render(&[result], true);
    assert!(rendered.contains("required field missing"));
  }
}
