//! Wire-friendly projections of [`crate::validator::ValidationResult`] (§3),
//! shared by the JSON formatter and the gRPC response.

use serde::{Deserialize, Serialize};

use crate::validator::{SchemaError, ValidationResult};

/// A single finding, flattened for JSON/gRPC: only the leaf reason crosses
/// the wire, not the nested cause.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummarySchemaError {
  pub path: String,
  pub schema_field: String,
  pub reason: String,
}

impl From<&SchemaError> for SummarySchemaError {
  fn from(error: &SchemaError) -> Self {
    Self {
      path: error.joined_pointer(),
      schema_field: error.schema_field.clone(),
      reason: error.reason.clone(),
    }
  }
}

/// Flattened projection of one resource's [`ValidationResult`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryValidationResult {
  pub file_name: String,
  pub kind: String,
  pub api_version: String,
  pub resource_name: String,
  pub resource_namespace: String,
  pub deleted: bool,
  pub deprecated: bool,
  pub latest_api_version: String,
  pub is_version_supported: u8,
  pub errors_for_original: Vec<SummarySchemaError>,
  pub errors_for_latest: Vec<SummarySchemaError>,
  pub deprecation_for_original: Vec<SummarySchemaError>,
  pub deprecation_for_latest: Vec<SummarySchemaError>,
}

impl From<&ValidationResult> for SummaryValidationResult {
  fn from(result: &ValidationResult) -> Self {
    Self {
      file_name: result.file_name.clone(),
      kind: result.kind.clone(),
      api_version: result.api_version.clone(),
      resource_name: result.resource_name.clone(),
      resource_namespace: result.resource_namespace.clone(),
      deleted: result.deleted,
      deprecated: result.deprecated,
      latest_api_version: result.latest_api_version.clone(),
      is_version_supported: result.is_version_supported,
      errors_for_original: result.errors_for_original.iter().map(Into::into).collect(),
      errors_for_latest: result.errors_for_latest.iter().map(Into::into).collect(),
      deprecation_for_original: result.deprecation_for_original.iter().map(Into::into).collect(),
      deprecation_for_latest: result.deprecation_for_latest.iter().map(Into::into).collect(),
    }
  }
}

/// Projects every non-uninteresting result (§4.10's json formatter rule).
pub fn bulk(results: &[ValidationResult]) -> Vec<SummaryValidationResult> {
  results.iter().filter(|r| !r.is_uninteresting()).map(Into::into).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bulk_drops_uninteresting_results() {
    let boring = ValidationResult { kind: "Pod".to_string(), ..Default::default() };
    let interesting = ValidationResult { kind: "Pod".to_string(), deleted: true, ..Default::default() };
    let summarized = bulk(&[boring, interesting]);
    assert_eq!(summarized.len(), 1);
    assert!(summarized[0].deleted);
  }
}
