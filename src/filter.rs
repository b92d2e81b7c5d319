//! Post-processes a [`ValidationResult`], dropping findings per §4.6.
//!
//! Every rule here only removes entries — the filter never adds a finding,
//! matching the invariant in SPEC_FULL.md §3.

use crate::config::Config;
use crate::validator::{SchemaError, ValidationResult};

/// Applies every §4.6 rule to `result`, returning the filtered copy.
pub fn apply(mut result: ValidationResult, config: &Config) -> ValidationResult {
  result.errors_for_original = filter_errors(result.errors_for_original, config);
  result.errors_for_latest = filter_errors(result.errors_for_latest, config);
  result.deprecation_for_original = remove_ignored(result.deprecation_for_original, &config.ignore_keys_from_deprecation);
  result.deprecation_for_latest = remove_ignored(result.deprecation_for_latest, &config.ignore_keys_from_deprecation);
  result.errors_for_original = remove_ignored(result.errors_for_original, &config.ignore_keys_from_validation);
  result.errors_for_latest = remove_ignored(result.errors_for_latest, &config.ignore_keys_from_validation);
  result
}

fn filter_errors(errors: Vec<SchemaError>, config: &Config) -> Vec<SchemaError> {
  errors
    .into_iter()
    .filter(|error| !should_drop(error, config))
    .collect()
}

fn should_drop(error: &SchemaError, config: &Config) -> bool {
  (config.ignore_null_errors && error.reason == "Value is not nullable")
    || exclude_array_null_error(error)
    || exclude_raw_extension_error(error)
    || exclude_cpu_memory_number_error(error)
}

fn exclude_array_null_error(error: &SchemaError) -> bool {
  error.reason.trim() == "Value is not nullable" && error.schema_type.as_deref() == Some("array")
}

fn exclude_raw_extension_error(error: &SchemaError) -> bool {
  error
    .schema_description
    .as_deref()
    .is_some_and(|d| crate::glob::matches(d, "RawExtension*"))
}

fn exclude_cpu_memory_number_error(error: &SchemaError) -> bool {
  if error.path.len() < 2 {
    return false;
  }
  let penultimate = &error.path[error.path.len() - 2];
  let is_quantity_key = penultimate == "requests" || penultimate == "limits";
  is_quantity_key && error.value.as_deref() == Some("number, integer")
}

fn remove_ignored(errors: Vec<SchemaError>, patterns: &[String]) -> Vec<SchemaError> {
  errors
    .into_iter()
    .filter(|error| !crate::glob::contains(&error.joined_pointer(), patterns))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn error(path: &[&str], reason: &str) -> SchemaError {
    SchemaError {
      path: path.iter().map(|s| s.to_string()).collect(),
      schema_field: String::new(),
      reason: reason.to_string(),
      value: None,
      schema_type: None,
      schema_description: None,
    }
  }

  #[test]
  fn drops_null_error_only_when_ignore_flag_and_reason_match() {
    let config = Config { ignore_null_errors: true, ..Config::default() };
    let dropped = error(&["spec"], "Value is not nullable");
    assert!(should_drop(&dropped, &config));

    let config_off = Config { ignore_null_errors: false, ..Config::default() };
    assert!(!should_drop(&dropped, &config_off), "must not drop unrelated reasons just because flag is on");
  }

  #[test]
  fn cpu_memory_quantity_strings_are_excluded() {
    let mut error = error(&["spec", "containers", "0", "resources", "requests", "cpu"], "invalid type");
    error.value = Some("number, integer".to_string());
    let config = Config::default();
    assert!(should_drop(&error, &config));
  }

  #[test]
  fn filter_never_adds_findings() {
    let config = Config::default();
    let errors = vec![error(&["spec"], "some unrelated reason")];
    let filtered = filter_errors(errors.clone(), &config);
    assert!(filtered.len() <= errors.len());
  }
}
