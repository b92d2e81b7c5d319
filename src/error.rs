//! Crate-wide error classification.
//!
//! Four kinds, matching the error-handling design: schema load failures are
//! fatal to the invocation, malformed resources and cluster-listing failures
//! are per-item and logged, and validation/deprecation findings are never
//! represented as errors at all — they are the product, carried on
//! [`crate::validator::ValidationResult`].

use thiserror::Error;

/// Errors surfaced by the schema loader, catalog builder, validator and
/// pipelines.
#[derive(Debug, Error)]
pub enum Error {
  /// The target or source OpenAPI document could not be loaded. Fatal to
  /// the current invocation.
  #[error("schema unavailable for release {release} ({source}): {cause}")]
  SchemaUnavailable {
    /// The release the document was requested for, e.g. `"1.22"`.
    release: String,
    /// Where the document was meant to come from (a URL or a path).
    source: SchemaSource,
    /// The underlying cause.
    cause: String,
  },

  /// A resource could not be parsed, or was missing required identity
  /// fields (`apiVersion`, `kind`, `metadata.name`). Per-resource; the
  /// pipeline logs and continues past these unless `exit_on_error` is set.
  #[error("malformed resource in {file}: {reason}")]
  MalformedResource {
    /// The file the resource came from (or `"stdin"`).
    file: String,
    /// Why it was rejected.
    reason: String,
  },

  /// One kind failed to list against a live cluster. Per-kind; logged and
  /// skipped, never aborts the rest of the cluster pipeline.
  #[error("failed to list {gvk} in cluster: {cause}")]
  ClusterListingFailed {
    /// The group/version/kind that failed to list.
    gvk: String,
    /// The underlying cause.
    cause: String,
  },

  /// Transparent passthrough for I/O failures.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Transparent passthrough for HTTP failures.
  #[error(transparent)]
  Http(#[from] reqwest::Error),

  /// Transparent passthrough for YAML (de)serialization failures.
  #[error(transparent)]
  Yaml(#[from] serde_yaml::Error),

  /// Transparent passthrough for JSON (de)serialization failures.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// Transparent passthrough for Kubernetes client failures.
  #[error(transparent)]
  Kube(#[from] kube::Error),
}

/// Where a schema document was requested from.
#[derive(Debug, Clone)]
pub enum SchemaSource {
  /// Fetched over HTTPS.
  Url(String),
  /// Read from a local path.
  Path(String),
}

impl std::fmt::Display for SchemaSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Url(u) => write!(f, "url {u}"),
      Self::Path(p) => write!(f, "path {p}"),
    }
  }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
