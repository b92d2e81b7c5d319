//! Structural validation of a value against an OpenAPI schema node.
//!
//! Produces the same [`crate::validator::SchemaError`] shape the
//! deprecation visitor does, so both can be filtered uniformly by
//! [`crate::filter`]. Every component is normalized with
//! `additionalPropertiesAllowed = false` (§4.2), so unrecognized object
//! keys are reported here as unknown-property errors.

use serde_json::Value;

use crate::schema::{Document, Schema};
use crate::validator::SchemaError;

/// Validates `value` against `schema`, resolving nested `$ref`s through
/// `doc`. Runs in multi-error mode: every finding in the tree is collected,
/// not just the first.
pub fn validate(schema: &Schema<'_>, value: &Value, doc: &Document) -> Vec<SchemaError> {
  let mut out = Vec::new();
  walk(schema, value, doc, &mut Vec::new(), &mut out);
  out
}

fn resolve<'a>(schema: &Schema<'a>, doc: &'a Document) -> Schema<'a> {
  if let Some(r) = schema.node.get("$ref").and_then(Value::as_str) {
    if let Some(resolved) = doc.lookup_ref(r) {
      return resolved;
    }
  }
  schema.clone()
}

fn walk(schema: &Schema<'_>, value: &Value, doc: &Document, path: &mut Vec<String>, out: &mut Vec<SchemaError>) {
  let schema = resolve(schema, doc);

  // `oneOf` (IntOrString) — valid if it matches any branch.
  if let Some(variants) = schema.node.get("oneOf").and_then(Value::as_array) {
    let matches = variants.iter().any(|v| type_matches(Schema::new(v).schema_type(), value));
    if !matches {
      out.push(make_error(path, &schema, "oneOf", "value does not match any allowed type", value));
    }
    return;
  }

  match (schema.schema_type(), value) {
    (Some("object") | None, Value::Object(map)) if schema.node.get("properties").is_some() || schema.schema_type() == Some("object") => {
      for required in schema.required() {
        if !map.contains_key(required) {
          out.push(make_error(path, &schema, required, "Property is missing", value));
        }
      }
      let allow_extra = schema.additional_properties_allowed();
      for (key, child_value) in map {
        match schema.property(key) {
          Some(child_schema) => {
            path.push(key.clone());
            walk(&child_schema, child_value, doc, path, out);
            path.pop();
          }
          None if !allow_extra => {
            path.push(key.clone());
            out.push(make_error(path, &schema, key, "Property does not match schema", value));
            path.pop();
          }
          None => {}
        }
      }
    }
    (Some("array"), Value::Array(items)) => {
      if let Some(item_schema) = schema.items() {
        for (index, item) in items.iter().enumerate() {
          path.push(index.to_string());
          walk(&item_schema, item, doc, path, out);
          path.pop();
        }
      }
    }
    (Some(expected), actual) if !type_matches(Some(expected), actual) => {
      if is_nullable_violation(actual) {
        out.push(make_error(path, &schema, expected, "Value is not nullable", value));
      } else {
        out.push(make_error(
          path,
          &schema,
          expected,
          &format!("expected {expected}, found {}", type_name(actual)),
          value,
        ));
      }
    }
    _ => {}
  }
}

fn is_nullable_violation(value: &Value) -> bool {
  matches!(value, Value::Null)
}

fn type_matches(expected: Option<&str>, value: &Value) -> bool {
  match (expected, value) {
    (None, _) => true,
    (Some("object"), Value::Object(_)) => true,
    (Some("array"), Value::Array(_)) => true,
    (Some("string"), Value::String(_)) => true,
    (Some("boolean"), Value::Bool(_)) => true,
    (Some("integer"), Value::Number(n)) => n.is_i64() || n.is_u64(),
    (Some("number"), Value::Number(_)) => true,
    (Some(_), Value::Null) => false,
    _ => false,
  }
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number, integer",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

fn make_error(path: &[String], schema: &Schema<'_>, field: &str, reason: &str, value: &Value) -> SchemaError {
  SchemaError {
    path: path.to_vec(),
    schema_field: field.to_string(),
    reason: reason.to_string(),
    value: Some(render_value(value)),
    schema_type: schema.schema_type().map(str::to_string),
    schema_description: schema.description().map(str::to_string),
  }
}

fn render_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => type_name(other).to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn doc() -> Document {
    Document::new(serde_json::json!({"components": {"schemas": {}}}))
  }

  #[test]
  fn unknown_property_reported_when_strict() {
    let node = serde_json::json!({
      "type": "object",
      "additionalPropertiesAllowed": false,
      "properties": {
        "containerPort": {"type": "integer"}
      }
    });
    let schema = Schema::new(&node);
    let value = serde_json::json!({"containerPort1": 80});
    let doc = doc();
    let errors = validate(&schema, &value, &doc);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].path.last().unwrap().ends_with("containerPort1"));
  }

  #[test]
  fn int_or_string_accepts_either_branch() {
    let node = serde_json::json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
    let schema = Schema::new(&node);
    let doc = doc();
    assert!(validate(&schema, &serde_json::json!("sds"), &doc).is_empty());
    assert!(validate(&schema, &serde_json::json!(80), &doc).is_empty());
  }

  #[test]
  fn int_or_string_rejects_object() {
    let node = serde_json::json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
    let schema = Schema::new(&node);
    let doc = doc();
    let errors = validate(&schema, &serde_json::json!({}), &doc);
    assert_eq!(errors.len(), 1);
  }

  #[test]
  fn required_field_missing() {
    let node = serde_json::json!({"type": "object", "required": ["name"], "properties": {"name": {"type": "string"}}});
    let schema = Schema::new(&node);
    let doc = doc();
    let errors = validate(&schema, &serde_json::json!({}), &doc);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].reason, "Property is missing");
  }
}
