//! Per-resource validation (C5): identity extraction, original/latest kind
//! lookup, schema application, and the `ValidationResult` these produce.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::{Catalog, Document};
use crate::visitor::{self, VisitSettings};

/// A single structural-validation or deprecation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
  /// Root-to-leaf JSON pointer segments.
  pub path: Vec<String>,
  /// The schema field/type name the finding concerns, e.g. `"string"` or a
  /// property name, used for display.
  pub schema_field: String,
  /// Human-readable reason.
  pub reason: String,
  /// The offending value rendered as a string, when cheap to capture
  /// (used by the CPU/memory quantity filter rule).
  pub value: Option<String>,
  /// The schema node's own `type`, when known (used by the array-null
  /// filter rule).
  pub schema_type: Option<String>,
  /// The schema node's own `description`, when known (used by the
  /// RawExtension filter rule).
  pub schema_description: Option<String>,
}

impl SchemaError {
  /// `/`-joined, lowercase JSON pointer, used for glob matching and display.
  pub fn joined_pointer(&self) -> String {
    self.path.join("/").to_lowercase()
  }
}

/// The outcome of validating one resource object (§3).
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
  pub file_name: String,
  pub kind: String,
  pub api_version: String,
  pub resource_name: String,
  pub resource_namespace: String,

  pub latest_api_version: String,
  pub deleted: bool,
  pub deprecated: bool,
  /// 0 = unset, 1 = supported, 2 = removed (§9 open question, resolved).
  pub is_version_supported: u8,

  pub errors_for_original: Vec<SchemaError>,
  pub errors_for_latest: Vec<SchemaError>,
  pub deprecation_for_original: Vec<SchemaError>,
  pub deprecation_for_latest: Vec<SchemaError>,
}

impl ValidationResult {
  /// `deleted || deprecated || errors_for_original.len() > 0 || errors_for_latest.len() > 0`
  /// — the broader definition stated by SPEC_FULL.md §4.11 (see DESIGN.md
  /// for why this is preferred over a narrower historical reading).
  pub fn has_errors(&self) -> bool {
    self.deleted || self.deprecated || !self.errors_for_original.is_empty() || !self.errors_for_latest.is_empty()
  }

  /// True iff nothing at all was found: no diagnosis and no findings. Used
  /// by the JSON formatter to drop uninteresting entries.
  pub fn is_uninteresting(&self) -> bool {
    !self.deleted
      && !self.deprecated
      && self.errors_for_latest.is_empty()
      && self.errors_for_original.is_empty()
      && self.deprecation_for_latest.is_empty()
      && self.deprecation_for_original.is_empty()
  }

  /// `group/version` or bare `version` qualifying this result's original
  /// `apiVersion`.
  pub fn version_kind(&self) -> String {
    format!("{}/{}", self.api_version, self.kind)
  }

  /// `namespace/name`.
  pub fn qualified_name(&self) -> String {
    format!("{}/{}", self.resource_namespace, self.resource_name)
  }
}

/// Validates a single already-parsed resource object against a catalog +
/// document pair (§4.5). When `ignore_missing_schemas` is set and the
/// catalog has no entry at all for the resource's kind, returns a result
/// with no findings and no diagnosis instead of an error.
pub fn validate_object(
  object: &Value,
  catalog: &Catalog,
  doc: &Document,
  file_name: &str,
  ignore_missing_schemas: bool,
) -> Result<ValidationResult> {
  let mut result = populate_identity(object, file_name)?;

  if !catalog.has_kind(&result.kind) {
    if ignore_missing_schemas {
      return Ok(result);
    }
    return Err(Error::MalformedResource {
      file: file_name.to_string(),
      reason: format!("no schema known for kind {}", result.kind),
    });
  }

  let (group, version) = split_api_version(&result.api_version);
  let entries = catalog.entries(&result.kind);

  let original = entries
    .iter()
    .find(|k| k.group.eq_ignore_ascii_case(&group) && k.version.eq_ignore_ascii_case(&version) && !k.rest_path.is_empty())
    .map(|k| k.component_key.clone());
  let latest = entries.last().map(|k| k.component_key.clone());

  match (&original, &latest) {
    (None, Some(_)) => {
      result.deleted = true;
      result.is_version_supported = 2;
    }
    (Some(_), _) => {
      result.is_version_supported = 1;
    }
    (None, None) => {}
  }

  if let Some(original_key) = &original {
    let (errors, deprecations) = apply_schema(object, original_key, doc)?;
    result.deprecated = !deprecations.is_empty();
    result.errors_for_original = errors;
    result.deprecation_for_original = deprecations;
  }

  if let (Some(latest_key), true) = (&latest, latest.as_deref() != original.as_deref()) {
    let (errors, deprecations) = apply_schema(object, latest_key, doc)?;
    result.errors_for_latest = errors;
    result.deprecation_for_latest = deprecations;
    result.latest_api_version = key_for_gv_from_token(latest_key, doc);
  }

  Ok(result)
}

/// Converts YAML bytes to JSON then validates (§4.5 entry point).
pub fn validate_yaml(
  bytes: &[u8],
  catalog: &Catalog,
  doc: &Document,
  file_name: &str,
  ignore_missing_schemas: bool,
) -> Result<ValidationResult> {
  let value: Value = serde_yaml::from_slice(bytes)?;
  validate_object(&value, catalog, doc, file_name, ignore_missing_schemas)
}

/// Parses JSON bytes then validates.
pub fn validate_json(
  bytes: &[u8],
  catalog: &Catalog,
  doc: &Document,
  file_name: &str,
  ignore_missing_schemas: bool,
) -> Result<ValidationResult> {
  let value: Value = serde_json::from_slice(bytes)?;
  validate_object(&value, catalog, doc, file_name, ignore_missing_schemas)
}

fn populate_identity(object: &Value, file_name: &str) -> Result<ValidationResult> {
  let api_version = object
    .get("apiVersion")
    .and_then(Value::as_str)
    .ok_or_else(|| Error::MalformedResource {
      file: file_name.to_string(),
      reason: "missing apiVersion".to_string(),
    })?
    .to_string();

  let kind = object
    .get("kind")
    .and_then(Value::as_str)
    .ok_or_else(|| Error::MalformedResource {
      file: file_name.to_string(),
      reason: "missing kind".to_string(),
    })?
    .to_string();

  let metadata = object.get("metadata").and_then(Value::as_object).ok_or_else(|| Error::MalformedResource {
    file: file_name.to_string(),
    reason: "missing metadata".to_string(),
  })?;

  let name = metadata
    .get("name")
    .and_then(Value::as_str)
    .ok_or_else(|| Error::MalformedResource {
      file: file_name.to_string(),
      reason: "missing metadata.name".to_string(),
    })?
    .to_string();

  let namespace = metadata
    .get("namespace")
    .and_then(Value::as_str)
    .unwrap_or("undefined")
    .to_string();

  Ok(ValidationResult {
    file_name: file_name.to_string(),
    kind,
    api_version,
    resource_name: name,
    resource_namespace: namespace,
    ..Default::default()
  })
}

fn split_api_version(api_version: &str) -> (String, String) {
  match api_version.split_once('/') {
    Some((group, version)) => (group.to_string(), version.to_string()),
    None => (String::new(), api_version.to_string()),
  }
}

/// Resolves the component, runs the deprecation visitor, runs the
/// structural validator, and classifies each into its bucket (§4.5 step 4).
fn apply_schema(object: &Value, component_key: &str, doc: &Document) -> Result<(Vec<SchemaError>, Vec<SchemaError>)> {
  let Some(schema) = doc.component(component_key) else {
    return Ok((Vec::new(), Vec::new()));
  };

  let deprecations = visitor::visit(&schema, object, VisitSettings { multi_error: true })
    .into_iter()
    .map(|f| SchemaError {
      path: f.json_pointer(),
      schema_field: component_key.to_string(),
      reason: f.reason,
      value: None,
      schema_type: None,
      schema_description: None,
    })
    .collect();

  let errors = crate::structural::validate(&schema, object, doc);

  Ok((errors, deprecations))
}

/// Reads the component's own `x-kubernetes-group-version-kind` to build
/// `"group/version"` (or bare `"version"`), per `getKeyForGVFromToken`.
fn key_for_gv_from_token(component_key: &str, doc: &Document) -> String {
  let Some(schema) = doc.component(component_key) else {
    return String::new();
  };
  let Some(gvk) = schema.group_version_kind() else {
    return String::new();
  };
  if gvk.group.is_empty() {
    gvk.version
  } else {
    format!("{}/{}", gvk.group, gvk.version)
  }
}
