//! `Config` (§3): loaded from an explicit path, the conventional
//! `.kubeshift.yaml` in the current directory, or `Config::default()`.
//! CLI flags and `KUBEADD_*` environment variables override the loaded
//! fields at the call site in `cli.rs`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Where resources should be read from and how they should be diagnosed and
/// filtered (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// The release to migrate *to*. Required in practice; defaults to the
  /// same value the CLI's `--target-kubernetes-version` flag defaults to.
  pub target_kubernetes_version: String,
  /// Release current objects are assumed to be written against. Defaults
  /// to the target version when left empty (file mode).
  pub source_kubernetes_version: String,
  /// Local path to the target release's OpenAPI document; empty fetches
  /// over HTTPS.
  pub target_schema_location: String,
  /// Local path to the source release's OpenAPI document.
  pub source_schema_location: String,
  /// Extra local OpenAPI documents merged into the kind catalog after the
  /// primary target document loads (SPEC_FULL.md supplement).
  pub additional_schema_locations: Vec<String>,
  /// When true, a resource whose kind has no catalog entry produces no
  /// finding instead of a malformed-resource error (SPEC_FULL.md
  /// supplement).
  pub ignore_missing_schemas: bool,
  /// Carried through for parity with the upstream tool; no relaxed-mode
  /// behavior is implemented (see DESIGN.md).
  pub strict: bool,
  /// Namespace substituted for cluster objects with no namespace.
  pub default_namespace: String,
  /// Cluster-mode namespace allowlist; empty means "all".
  pub select_namespaces: Vec<String>,
  /// Cluster-mode namespace denylist.
  pub ignore_namespaces: Vec<String>,
  /// Cluster-mode kind allowlist; empty means "all".
  pub select_kinds: Vec<String>,
  /// Cluster-mode kind denylist.
  pub ignore_kinds: Vec<String>,
  /// JSON-pointer glob patterns dropped from deprecation findings.
  pub ignore_keys_from_deprecation: Vec<String>,
  /// JSON-pointer glob patterns dropped from validation findings.
  pub ignore_keys_from_validation: Vec<String>,
  /// Suppresses "Value is not nullable" findings.
  pub ignore_null_errors: bool,
  /// Skip TLS certificate verification on the schema-fetch HTTP client.
  pub insecure_skip_tls_verify: bool,
  /// Suppress informational logging.
  pub quiet: bool,
  /// Abort the whole invocation on the first per-resource/per-kind error.
  pub exit_on_error: bool,
  /// `stdout`, `json`, or `tap`.
  pub output_format: OutputFormat,
  /// Source file name attached to results (`"stdin"` when reading piped
  /// input).
  pub file_name: String,
}

/// Output formatter selection (§4.10).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  #[default]
  Stdout,
  Json,
  Tap,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      target_kubernetes_version: "1.22".to_string(),
      source_kubernetes_version: String::new(),
      target_schema_location: String::new(),
      source_schema_location: String::new(),
      additional_schema_locations: Vec::new(),
      ignore_missing_schemas: false,
      strict: false,
      default_namespace: "default".to_string(),
      select_namespaces: Vec::new(),
      ignore_namespaces: vec!["kube-system".to_string()],
      select_kinds: Vec::new(),
      ignore_kinds: vec!["event".to_string(), "CustomResourceDefinition".to_string()],
      ignore_keys_from_deprecation: vec!["metadata*".to_string(), "status*".to_string()],
      ignore_keys_from_validation: vec!["status*".to_string(), "metadata*".to_string()],
      ignore_null_errors: true,
      insecure_skip_tls_verify: false,
      quiet: false,
      exit_on_error: false,
      output_format: OutputFormat::default(),
      file_name: "stdin".to_string(),
    }
  }
}

impl Config {
  /// The source version to validate current objects against, defaulting
  /// to the target version when unset (§4.8/`kubedd.Validate`).
  pub fn effective_source_version(&self) -> &str {
    if self.source_kubernetes_version.is_empty() {
      &self.target_kubernetes_version
    } else {
      &self.source_kubernetes_version
    }
  }

  /// The gRPC service builds a near-zero-value `Config` for each request
  /// rather than the CLI's opinionated defaults (no namespace/kind
  /// denylists, no null-error suppression) — callers are expected to have
  /// already scoped the request to the cluster and version they care
  /// about. `default_namespace` still falls back to `"default"`, matching
  /// what cluster-mode always assumed regardless of config.
  pub fn bare(target_kubernetes_version: String) -> Self {
    Self {
      target_kubernetes_version,
      default_namespace: "default".to_string(),
      output_format: OutputFormat::Json,
      ..Self::zeroed()
    }
  }

  fn zeroed() -> Self {
    Self {
      target_kubernetes_version: String::new(),
      source_kubernetes_version: String::new(),
      target_schema_location: String::new(),
      source_schema_location: String::new(),
      additional_schema_locations: Vec::new(),
      ignore_missing_schemas: false,
      strict: false,
      default_namespace: String::new(),
      select_namespaces: Vec::new(),
      ignore_namespaces: Vec::new(),
      select_kinds: Vec::new(),
      ignore_kinds: Vec::new(),
      ignore_keys_from_deprecation: Vec::new(),
      ignore_keys_from_validation: Vec::new(),
      ignore_null_errors: false,
      insecure_skip_tls_verify: false,
      quiet: true,
      exit_on_error: false,
      output_format: OutputFormat::default(),
      file_name: String::new(),
    }
  }
}

const DEFAULT_CONFIG_FILE: &str = ".kubeshift.yaml";

/// Loads configuration from an explicit path, `.kubeshift.yaml` in the
/// current working directory, or falls back to `Config::default()`.
pub fn load(path: Option<&str>) -> Result<Config> {
  load_from(path, std::env::current_dir().ok().as_deref())
}

fn load_from(path: Option<&str>, base_dir: Option<&std::path::Path>) -> Result<Config> {
  if let Some(p) = path {
    let contents = std::fs::read_to_string(p).with_context(|| format!("Failed to read config file: {p}"))?;
    let config: Config = serde_yaml::from_str(&contents).with_context(|| format!("Failed to parse config file: {p}"))?;
    return Ok(config);
  }

  if let Some(dir) = base_dir {
    let default_path = dir.join(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
      let contents = std::fs::read_to_string(&default_path)
        .with_context(|| format!("Failed to read config file: {}", default_path.display()))?;
      let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", default_path.display()))?;
      return Ok(config);
    }
  }

  Ok(Config::default())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn defaults_match_the_documented_values() {
    let cfg = Config::default();
    assert_eq!(cfg.target_kubernetes_version, "1.22");
    assert_eq!(cfg.ignore_namespaces, vec!["kube-system"]);
    assert_eq!(cfg.ignore_kinds, vec!["event", "CustomResourceDefinition"]);
    assert_eq!(cfg.ignore_keys_from_deprecation, vec!["metadata*", "status*"]);
    assert_eq!(cfg.ignore_keys_from_validation, vec!["status*", "metadata*"]);
    assert!(cfg.ignore_null_errors);
    assert_eq!(cfg.output_format, OutputFormat::Stdout);
  }

  #[test]
  fn effective_source_version_falls_back_to_target() {
    let mut cfg = Config::default();
    cfg.target_kubernetes_version = "1.25".to_string();
    assert_eq!(cfg.effective_source_version(), "1.25");
    cfg.source_kubernetes_version = "1.24".to_string();
    assert_eq!(cfg.effective_source_version(), "1.24");
  }

  #[test]
  fn deserialize_partial_yaml_keeps_other_defaults() {
    let yaml = "target_kubernetes_version: \"1.28\"\n";
    let cfg: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.target_kubernetes_version, "1.28");
    assert_eq!(cfg.ignore_namespaces, vec!["kube-system"]);
  }

  #[test]
  fn load_no_path_no_default_file_returns_default() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = load_from(None, Some(tmp.path())).unwrap();
    assert_eq!(cfg.target_kubernetes_version, "1.22");
  }

  #[test]
  fn load_explicit_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("my-config.yaml");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "target_kubernetes_version: \"1.30\"").unwrap();

    let cfg = load_from(Some(path.to_str().unwrap()), None).unwrap();
    assert_eq!(cfg.target_kubernetes_version, "1.30");
  }

  #[test]
  fn load_explicit_path_not_found() {
    let result = load_from(Some("/tmp/does-not-exist-kubeshift-test.yaml"), None);
    assert!(result.is_err());
  }

  #[test]
  fn bare_config_has_no_namespace_or_kind_filters() {
    let cfg = Config::bare("1.27".to_string());
    assert_eq!(cfg.target_kubernetes_version, "1.27");
    assert_eq!(cfg.default_namespace, "default");
    assert!(cfg.ignore_namespaces.is_empty());
    assert!(cfg.ignore_kinds.is_empty());
    assert!(!cfg.ignore_null_errors);
    assert_eq!(cfg.output_format, OutputFormat::Json);
  }

  #[test]
  fn load_default_file_in_base_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let default_path = tmp.path().join(".kubeshift.yaml");
    let mut f = std::fs::File::create(&default_path).unwrap();
    writeln!(f, "target_kubernetes_version: \"1.29\"").unwrap();

    let cfg = load_from(None, Some(tmp.path())).unwrap();
    assert_eq!(cfg.target_kubernetes_version, "1.29");
  }
}
