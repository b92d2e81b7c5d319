//! Recursive deprecation walk of a value against a schema (C4).
//!
//! Independent of structural validation: a node can be well-formed and
//! still deprecated. The walk only descends into keys/indices the schema
//! actually declares — unknown-field detection is the structural
//! validator's job, not this one's.

use serde_json::Value;

use crate::schema::Schema;

/// A single deprecation finding, pre-reversal-path. Converted to a public
/// [`crate::validator::SchemaError`] once the walk completes.
#[derive(Debug, Clone)]
pub struct DeprecationFinding {
  /// Path segments from leaf to root; reversed on extraction.
  reverse_path: Vec<String>,
  /// The deprecated schema node's own description, used verbatim as the
  /// reason.
  pub reason: String,
}

impl DeprecationFinding {
  /// The root-to-leaf JSON pointer segments.
  pub fn json_pointer(&self) -> Vec<String> {
    self.reverse_path.iter().rev().cloned().collect()
  }
}

/// Controls whether the walk stops at the first finding within a subtree.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitSettings {
  /// When false, the first deprecation inside an object stops further keys
  /// in that object, matching the structural validator's own single-error
  /// mode. Array elements are always walked in full regardless.
  pub multi_error: bool,
}

/// Walks `value` against `schema`, collecting deprecation findings.
pub fn visit(schema: &Schema<'_>, value: &Value, settings: VisitSettings) -> Vec<DeprecationFinding> {
  let mut findings = Vec::new();
  visit_inner(schema, value, settings, &mut Vec::new(), &mut findings);
  findings
}

fn visit_inner(
  schema: &Schema<'_>,
  value: &Value,
  settings: VisitSettings,
  path: &mut Vec<String>,
  out: &mut Vec<DeprecationFinding>,
) {
  match value {
    Value::Array(items) => visit_array(schema, items, settings, path, out),
    Value::Object(map) => visit_object(schema, map, settings, path, out),
    Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
      if schema.is_deprecated() {
        out.push(DeprecationFinding {
          reverse_path: path.clone(),
          reason: schema.description().unwrap_or_default().to_string(),
        });
      }
    }
  }
}

fn visit_array(
  schema: &Schema<'_>,
  items: &[Value],
  settings: VisitSettings,
  path: &mut Vec<String>,
  out: &mut Vec<DeprecationFinding>,
) {
  let Some(item_schema) = schema.items() else { return };
  for (index, item) in items.iter().enumerate() {
    path.push(index.to_string());
    visit_inner(&item_schema, item, settings, path, out);
    path.pop();
  }
}

fn visit_object(
  schema: &Schema<'_>,
  map: &serde_json::Map<String, Value>,
  settings: VisitSettings,
  path: &mut Vec<String>,
  out: &mut Vec<DeprecationFinding>,
) {
  if schema.is_deprecated() {
    out.push(DeprecationFinding {
      reverse_path: path.clone(),
      reason: schema.description().unwrap_or_default().to_string(),
    });
    if !settings.multi_error {
      return;
    }
  }

  for (key, value) in map {
    let Some(child_schema) = schema.property(key) else { continue };
    path.push(key.clone());
    visit_inner(&child_schema, value, settings, path, out);
    path.pop();
    if !settings.multi_error && !out.is_empty() {
      return;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scalar_deprecated_only_when_node_itself_marked() {
    let node = serde_json::json!({"type": "string", "description": "deprecated: use x instead"});
    let schema = Schema::new(&node);
    let value = serde_json::json!("v1beta1");
    let findings = visit(&schema, &value, VisitSettings { multi_error: true });
    assert_eq!(findings.len(), 1);
    assert!(findings[0].json_pointer().is_empty());
  }

  #[test]
  fn array_findings_tagged_with_index() {
    let node = serde_json::json!({
      "type": "array",
      "items": {"type": "string", "description": "Deprecated field"}
    });
    let schema = Schema::new(&node);
    let value = serde_json::json!(["a", "b"]);
    let findings = visit(&schema, &value, VisitSettings { multi_error: true });
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].json_pointer(), vec!["0"]);
    assert_eq!(findings[1].json_pointer(), vec!["1"]);
  }

  #[test]
  fn object_findings_tagged_with_key_and_only_declared_properties_visited() {
    let node = serde_json::json!({
      "type": "object",
      "properties": {
        "rollbackTo": {"type": "object", "description": "Deprecated."}
      }
    });
    let schema = Schema::new(&node);
    let value = serde_json::json!({"rollbackTo": {}, "other": "untouched"});
    let findings = visit(&schema, &value, VisitSettings { multi_error: true });
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].json_pointer(), vec!["rollbackTo"]);
  }

  #[test]
  fn single_error_mode_short_circuits_object_walk() {
    let node = serde_json::json!({
      "type": "object",
      "properties": {
        "a": {"type": "string", "description": "deprecated"},
        "b": {"type": "string", "description": "deprecated"}
      }
    });
    let schema = Schema::new(&node);
    let value = serde_json::json!({"a": "x", "b": "y"});
    let findings = visit(&schema, &value, VisitSettings { multi_error: false });
    assert_eq!(findings.len(), 1);
  }
}
