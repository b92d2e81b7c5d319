//! The normalized OpenAPI v3 document model.
//!
//! Deliberately a thin wrapper over [`serde_json::Value`] rather than a
//! typed OpenAPI struct hierarchy: the conversion and validation logic this
//! crate implements is the hard engineering this system exists for, and a
//! hand-rolled model keeps every field the validator touches — including
//! Kubernetes' own `x-kubernetes-group-version-kind` extension — directly
//! inspectable as JSON.

use serde_json::Value;

use crate::error::{Error, Result};

/// A single schema node: a `$ref`, or an inline object/array/scalar type
/// with a description, used both by the structural validator and the
/// deprecation visitor.
#[derive(Debug, Clone)]
pub struct Schema<'a> {
  /// The raw JSON node (post `$ref` resolution).
  pub node: &'a Value,
}

impl<'a> Schema<'a> {
  /// Wraps a raw schema node.
  pub fn new(node: &'a Value) -> Self {
    Self { node }
  }

  /// The node's `description`, if any.
  pub fn description(&self) -> Option<&str> {
    self.node.get("description").and_then(Value::as_str)
  }

  /// True iff `description` contains the case-insensitive substring
  /// `"deprecated"`.
  pub fn is_deprecated(&self) -> bool {
    self
      .description()
      .is_some_and(|d| d.to_lowercase().contains("deprecated"))
  }

  /// The node's `type`, e.g. `"array"`, `"object"`, `"string"`.
  pub fn schema_type(&self) -> Option<&str> {
    self.node.get("type").and_then(Value::as_str)
  }

  /// The schema for `items`, for an array-typed node.
  pub fn items(&self) -> Option<Schema<'a>> {
    self.node.get("items").map(Schema::new)
  }

  /// The schema for a named property, for an object-typed node.
  pub fn property(&self, key: &str) -> Option<Schema<'a>> {
    self.node.get("properties").and_then(|p| p.get(key)).map(Schema::new)
  }

  /// Iterates the `(name, description-ignoring-schema)` pairs declared as
  /// required, used by the structural validator to report missing fields.
  pub fn required(&self) -> Vec<&str> {
    self
      .node
      .get("required")
      .and_then(Value::as_array)
      .map(|arr| arr.iter().filter_map(Value::as_str).collect())
      .unwrap_or_default()
  }

  /// True iff unknown object keys are rejected (the crate normalizes every
  /// component to this, so this is mostly a documentation aid in tests).
  pub fn additional_properties_allowed(&self) -> bool {
    self
      .node
      .get("additionalPropertiesAllowed")
      .and_then(Value::as_bool)
      .unwrap_or(false)
  }

  /// The `x-kubernetes-group-version-kind` extension, if present and
  /// unambiguous (a single object, not an array of length >1).
  pub fn group_version_kind(&self) -> Option<Gvk> {
    parse_gvk(self.node.get("x-kubernetes-group-version-kind")?)
  }
}

/// A single `(group, version, kind)` triple as declared by
/// `x-kubernetes-group-version-kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gvk {
  /// API group, empty string for the core group.
  pub group: String,
  /// API version, e.g. `"v1"`, `"v1beta1"`.
  pub version: String,
  /// Kind name, e.g. `"Deployment"`.
  pub kind: String,
}

/// Parses the `x-kubernetes-group-version-kind` extension value. Per
/// §4.3/§9, an array of length >1 is ambiguous and is skipped (returns
/// `None`); this loses a kind→schema mapping but the source behavior is
/// preserved deliberately.
pub fn parse_gvk(value: &Value) -> Option<Gvk> {
  if let Some(arr) = value.as_array() {
    if arr.len() > 1 {
      return None;
    }
    return arr.first().and_then(parse_single_gvk);
  }
  parse_single_gvk(value)
}

fn parse_single_gvk(value: &Value) -> Option<Gvk> {
  let obj = value.as_object()?;
  Some(Gvk {
    group: obj.get("group").and_then(Value::as_str).unwrap_or_default().to_string(),
    version: obj.get("version").and_then(Value::as_str).unwrap_or_default().to_string(),
    kind: obj.get("kind").and_then(Value::as_str).unwrap_or_default().to_string(),
  })
}

/// The normalized OpenAPI v3 document: raw JSON plus a resolver for
/// `$ref`-chased component lookups.
#[derive(Debug, Clone)]
pub struct Document {
  pub(crate) root: Value,
}

impl Document {
  /// Wraps an already-normalized OpenAPI v3 JSON document.
  pub fn new(root: Value) -> Self {
    Self { root }
  }

  /// The raw `paths` object.
  pub fn paths(&self) -> Option<&serde_json::Map<String, Value>> {
    self.root.get("paths").and_then(Value::as_object)
  }

  /// The raw `components.schemas` object.
  pub fn component_schemas(&self) -> Option<&serde_json::Map<String, Value>> {
    self.root.get("components")?.get("schemas")?.as_object()
  }

  /// Resolves a component by name, following a single `$ref` indirection if
  /// the named entry is itself a ref (components in this document never
  /// nest refs more than one level deep in practice, matching the source).
  pub fn component(&self, name: &str) -> Option<Schema<'_>> {
    let schemas = self.component_schemas()?;
    let node = schemas.get(name)?;
    if let Some(r) = node.get("$ref").and_then(Value::as_str) {
      let target = component_name_from_ref(r)?;
      return schemas.get(target).map(Schema::new);
    }
    Some(Schema::new(node))
  }

  /// Resolves a `$ref` string (e.g. `"#/components/schemas/io.k8s...Deployment"`)
  /// to the trailing component-name token and looks it up.
  pub fn lookup_ref(&self, reference: &str) -> Option<Schema<'_>> {
    let name = component_name_from_ref(reference)?;
    self.component(name)
  }

  /// Sets every component's `additionalPropertiesAllowed` to `false`
  /// (§4.2 step 4 — strict mode).
  pub fn lock_additional_properties(&mut self) {
    if let Some(components) = self.root.get_mut("components").and_then(|c| c.get_mut("schemas")) {
      if let Some(map) = components.as_object_mut() {
        for schema in map.values_mut() {
          if let Some(obj) = schema.as_object_mut() {
            obj.insert("additionalPropertiesAllowed".to_string(), Value::Bool(false));
          }
        }
      }
    }
  }

  /// Merges another normalized document's component schemas and paths into
  /// this one, used by `AdditionalSchemaLocations`. A component key already
  /// present in `self` is left untouched (the primary document wins).
  pub fn merge(&mut self, other: Document) {
    if let Some(other_schemas) = other.root.get("components").and_then(|c| c.get("schemas")).and_then(Value::as_object) {
      let self_schemas = self
        .root
        .entry("components")
        .or_insert_with(|| serde_json::json!({}))
        .as_object_mut()
        .expect("components must be an object")
        .entry("schemas")
        .or_insert_with(|| serde_json::json!({}));
      if let Some(self_map) = self_schemas.as_object_mut() {
        for (key, value) in other_schemas {
          self_map.entry(key.clone()).or_insert_with(|| value.clone());
        }
      }
    }
    if let Some(other_paths) = other.root.get("paths").and_then(Value::as_object) {
      let self_paths = self.root.entry("paths").or_insert_with(|| serde_json::json!({}));
      if let Some(self_map) = self_paths.as_object_mut() {
        for (key, value) in other_paths {
          self_map.entry(key.clone()).or_insert_with(|| value.clone());
        }
      }
    }
  }
}

fn component_name_from_ref(reference: &str) -> Option<&str> {
  reference.rsplit('/').next()
}

/// A structural-soundness check over `components.schemas`: every entry
/// either resolves its `$ref` to a real sibling component, or declares a
/// `type`/`oneOf` of its own. Run after the v2→v3 conversion and again after
/// the `IntOrString` patch (§4.2 steps 2 and 4) — the two points where the
/// document's shape changes under us and a conversion bug would otherwise go
/// unnoticed until some unlucky resource happened to hit the broken node.
pub fn validate_structural_soundness(doc: &Value) -> std::result::Result<(), String> {
  let schemas = doc
    .get("components")
    .and_then(|c| c.get("schemas"))
    .and_then(Value::as_object)
    .ok_or("components.schemas missing")?;

  for (name, node) in schemas {
    let obj = node.as_object().ok_or_else(|| format!("component {name} is not an object"))?;

    if let Some(r) = obj.get("$ref").and_then(Value::as_str) {
      let target = component_name_from_ref(r).unwrap_or_default();
      if !schemas.contains_key(target) {
        return Err(format!("component {name}'s $ref {r} does not resolve"));
      }
      continue;
    }

    if !obj.contains_key("type") && !obj.contains_key("oneOf") {
      return Err(format!("component {name} has neither type, oneOf, nor $ref"));
    }
  }

  Ok(())
}

/// Deletes `definitions.io.k8s.apimachinery.pkg.util.intstr.IntOrString.format`
/// from a raw OpenAPI v2 document (§4.2 step 1).
pub fn delete_int_or_string_format(doc: &mut Value) -> Result<()> {
  let target = doc
    .get_mut("definitions")
    .and_then(|d| d.get_mut("io.k8s.apimachinery.pkg.util.intstr.IntOrString"))
    .and_then(Value::as_object_mut)
    .ok_or_else(|| Error::SchemaUnavailable {
      release: String::new(),
      source: crate::error::SchemaSource::Path("<in-memory>".into()),
      cause: "definitions.io.k8s.apimachinery.pkg.util.intstr.IntOrString missing".into(),
    })?;
  target.remove("format");
  Ok(())
}

/// Patches `components.schemas.io.k8s.apimachinery.pkg.util.intstr.IntOrString`
/// to the `oneOf[string, integer]` shape standard OpenAPI 3 validators can
/// express (§4.2 step 3).
pub fn patch_int_or_string(doc: &mut Value) -> Result<()> {
  let schemas = doc
    .get_mut("components")
    .and_then(|c| c.get_mut("schemas"))
    .and_then(Value::as_object_mut)
    .ok_or_else(|| Error::SchemaUnavailable {
      release: String::new(),
      source: crate::error::SchemaSource::Path("<in-memory>".into()),
      cause: "components.schemas missing after openapi2->3 conversion".into(),
    })?;
  schemas.insert(
    "io.k8s.apimachinery.pkg.util.intstr.IntOrString".to_string(),
    serde_json::json!({"oneOf": [{"type": "string"}, {"type": "integer"}]}),
  );
  Ok(())
}

#[cfg(test)]
mod soundness_tests {
  use super::*;

  #[test]
  fn sound_document_passes() {
    let doc = serde_json::json!({
      "components": {
        "schemas": {
          "io.k8s.api.apps.v1.Deployment": {"type": "object"},
          "io.k8s.api.apps.v1.DeploymentAlias": {"$ref": "#/components/schemas/io.k8s.api.apps.v1.Deployment"},
          "io.k8s.apimachinery.pkg.util.intstr.IntOrString": {"oneOf": [{"type": "string"}, {"type": "integer"}]}
        }
      }
    });
    assert!(validate_structural_soundness(&doc).is_ok());
  }

  #[test]
  fn dangling_ref_is_rejected() {
    let doc = serde_json::json!({
      "components": {
        "schemas": {
          "io.k8s.api.apps.v1.DeploymentAlias": {"$ref": "#/components/schemas/does.not.Exist"}
        }
      }
    });
    assert!(validate_structural_soundness(&doc).is_err());
  }

  #[test]
  fn node_with_no_type_oneof_or_ref_is_rejected() {
    let doc = serde_json::json!({
      "components": {
        "schemas": {
          "io.k8s.api.apps.v1.Empty": {}
        }
      }
    });
    assert!(validate_structural_soundness(&doc).is_err());
  }

  #[test]
  fn missing_components_schemas_is_rejected() {
    let doc = serde_json::json!({});
    assert!(validate_structural_soundness(&doc).is_err());
  }
}
