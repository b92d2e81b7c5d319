//! JSON formatter: indented array of `SummaryValidationResult`, dropping
//! uninteresting entries (`pkg.jsonOutputManager`).

use crate::summary;
use crate::validator::ValidationResult;

pub fn render(results: &[ValidationResult]) -> String {
  let summarized = summary::bulk(results);
  serde_json::to_string_pretty(&summarized).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_results_render_empty_array() {
    assert_eq!(render(&[]), "[]");
  }

  #[test]
  fn deleted_result_is_included() {
    let result = ValidationResult { kind: "Deployment".to_string(), deleted: true, ..Default::default() };
    let rendered = render(&[result]);
    assert!(rendered.contains("\"deleted\": true"));
  }
}
