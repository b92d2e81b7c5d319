//! The file (C8) and cluster (C9) pipelines: both feed resource bodies
//! through the same validate → filter path and aggregate the results.

pub mod cluster;
pub mod file;

use crate::config::Config;
use crate::repository::Repository;
use crate::validator::ValidationResult;

/// Validates and filters a single resource body, sharing the exact logic
/// both pipelines need (§4.5 + §4.6).
pub(crate) async fn validate_one(
  bytes: &[u8],
  file_name: &str,
  repository: &Repository,
  config: &Config,
) -> crate::error::Result<ValidationResult> {
  let release = repository
    .get(&config.target_kubernetes_version, &config.target_schema_location, config)
    .await?;

  let result = crate::validator::validate_yaml(bytes, &release.catalog, &release.document, file_name, config.ignore_missing_schemas)?;
  Ok(crate::filter::apply(result, config))
}
