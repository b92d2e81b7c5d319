//! Fetches and normalizes a Kubernetes OpenAPI document (C2).
//!
//! Kubernetes still publishes its release schema as Swagger/OpenAPI v2.
//! Standard OpenAPI v3 tooling cannot express the `IntOrString` type
//! Kubernetes uses pervasively (e.g. `Deployment.spec.strategy.maxSurge`),
//! so the document is converted and patched before anything downstream
//! touches it.

use std::time::Duration;

use serde_json::Value;

use super::document::{self, Document};
use crate::error::{Error, Result, SchemaSource};

const URL_TEMPLATE: &str = "https://raw.githubusercontent.com/kubernetes/kubernetes/release-{release}/api/openapi-spec/swagger.json";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a Kubernetes release's OpenAPI v2 document over HTTPS and
/// normalizes it. `insecure_skip_tls_verify` matches `Config`'s flag of the
/// same name.
pub async fn load_from_url(release: &str, insecure_skip_tls_verify: bool) -> Result<Document> {
  let url = URL_TEMPLATE.replace("{release}", release);
  let client = reqwest::Client::builder()
    .timeout(HTTP_TIMEOUT)
    .danger_accept_invalid_certs(insecure_skip_tls_verify)
    .build()?;

  let response = client.get(&url).send().await.map_err(|e| Error::SchemaUnavailable {
    release: release.to_string(),
    source: SchemaSource::Url(url.clone()),
    cause: e.to_string(),
  })?;

  let response = response.error_for_status().map_err(|e| Error::SchemaUnavailable {
    release: release.to_string(),
    source: SchemaSource::Url(url.clone()),
    cause: e.to_string(),
  })?;

  let raw: Value = response.json().await.map_err(|e| Error::SchemaUnavailable {
    release: release.to_string(),
    source: SchemaSource::Url(url.clone()),
    cause: e.to_string(),
  })?;

  normalize(raw, release, SchemaSource::Url(url))
}

/// Loads and normalizes a release's OpenAPI v2 document from a local path.
pub fn load_from_path(release: &str, path: &str) -> Result<Document> {
  let bytes = std::fs::read(path)?;
  let raw: Value = serde_json::from_slice(&bytes)?;
  normalize(raw, release, SchemaSource::Path(path.to_string()))
}

/// Runs the full normalization pipeline (§4.2) over a raw OpenAPI v2 JSON
/// document.
fn normalize(mut raw: Value, release: &str, source: SchemaSource) -> Result<Document> {
  document::delete_int_or_string_format(&mut raw).map_err(|_| Error::SchemaUnavailable {
    release: release.to_string(),
    source: source.clone(),
    cause: "missing IntOrString definition in openapi v2 document".into(),
  })?;

  let mut v3 = convert_v2_to_v3(&raw);

  document::validate_structural_soundness(&v3).map_err(|cause| Error::SchemaUnavailable {
    release: release.to_string(),
    source: source.clone(),
    cause,
  })?;

  document::patch_int_or_string(&mut v3).map_err(|_| Error::SchemaUnavailable {
    release: release.to_string(),
    source: source.clone(),
    cause: "openapi v2->v3 conversion produced no components.schemas".into(),
  })?;

  document::validate_structural_soundness(&v3).map_err(|cause| Error::SchemaUnavailable {
    release: release.to_string(),
    source: source.clone(),
    cause,
  })?;

  let mut doc = Document::new(v3);
  doc.lock_additional_properties();
  Ok(doc)
}

/// Converts an OpenAPI v2 (Swagger) document to the subset of OpenAPI v3
/// this crate's catalog builder and validator actually read: `definitions`
/// become `components.schemas` (with `$ref`s rewritten), and each path's
/// `post`/`put` operations are carried through unchanged, including the
/// `x-kubernetes-group-version-kind` extension. This is not a general-purpose
/// OpenAPI converter — Kubernetes' own swagger.json never exercises the
/// parts of v2 (e.g. `consumes`/`produces` negotiation) that a general
/// converter would need to handle.
fn convert_v2_to_v3(v2: &Value) -> Value {
  let definitions = v2.get("definitions").cloned().unwrap_or_else(|| serde_json::json!({}));
  let schemas = rewrite_refs(definitions);

  let mut paths = serde_json::Map::new();
  if let Some(v2_paths) = v2.get("paths").and_then(Value::as_object) {
    for (path, methods) in v2_paths {
      paths.insert(path.clone(), rewrite_refs(methods.clone()));
    }
  }

  serde_json::json!({
    "openapi": "3.0.0",
    "info": v2.get("info").cloned().unwrap_or_else(|| serde_json::json!({"title": "", "version": ""})),
    "paths": Value::Object(paths),
    "components": {"schemas": schemas},
  })
}

/// Recursively rewrites every `"$ref": "#/definitions/X"` to
/// `"$ref": "#/components/schemas/X"`.
fn rewrite_refs(value: Value) -> Value {
  match value {
    Value::Object(mut map) => {
      if let Some(Value::String(r)) = map.get("$ref") {
        if let Some(rest) = r.strip_prefix("#/definitions/") {
          map.insert("$ref".to_string(), Value::String(format!("#/components/schemas/{rest}")));
        }
      }
      for v in map.values_mut() {
        *v = rewrite_refs(std::mem::take(v));
      }
      Value::Object(map)
    }
    Value::Array(arr) => Value::Array(arr.into_iter().map(rewrite_refs).collect()),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rewrites_definition_refs_to_component_refs() {
    let input = serde_json::json!({"$ref": "#/definitions/io.k8s.Foo"});
    let rewritten = rewrite_refs(input);
    assert_eq!(rewritten["$ref"], "#/components/schemas/io.k8s.Foo");
  }

  #[test]
  fn conversion_preserves_group_version_kind_extension() {
    let v2 = serde_json::json!({
      "definitions": {
        "io.k8s.api.apps.v1.Deployment": {
          "type": "object",
          "x-kubernetes-group-version-kind": [{"group": "apps", "version": "v1", "kind": "Deployment"}]
        }
      },
      "paths": {
        "/apis/apps/v1/deployments": {
          "post": {
            "x-kubernetes-group-version-kind": {"group": "apps", "version": "v1", "kind": "Deployment"}
          }
        }
      }
    });
    let v3 = convert_v2_to_v3(&v2);
    assert!(v3["components"]["schemas"]["io.k8s.api.apps.v1.Deployment"]["x-kubernetes-group-version-kind"].is_array());
    assert!(v3["paths"]["/apis/apps/v1/deployments"]["post"]["x-kubernetes-group-version-kind"].is_object());
  }
}
