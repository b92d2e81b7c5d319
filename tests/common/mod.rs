//! Shared fixtures for the end-to-end CLI tests: a tiny OpenAPI v2 document
//! covering two releases of one kind, written to a temp file so tests never
//! touch the network.

use std::path::PathBuf;

/// Writes a minimal swagger.json covering `apps/v1beta1` (no required
/// fields) and `apps/v1` (requires `spec.replicas`) for `Deployment`, and
/// returns its path.
pub fn write_schema_fixture(dir: &std::path::Path) -> PathBuf {
  let path = dir.join("swagger.json");
  let doc = serde_json::json!({
    "definitions": {
      "io.k8s.apimachinery.pkg.util.intstr.IntOrString": {"type": "string", "format": "int-or-string"},
      "io.k8s.api.apps.v1beta1.Deployment": {
        "type": "object",
        "x-kubernetes-group-version-kind": [{"group": "apps", "version": "v1beta1", "kind": "Deployment"}],
        "properties": {"spec": {"type": "object", "properties": {}}}
      },
      "io.k8s.api.apps.v1.Deployment": {
        "type": "object",
        "x-kubernetes-group-version-kind": [{"group": "apps", "version": "v1", "kind": "Deployment"}],
        "properties": {
          "spec": {
            "type": "object",
            "required": ["replicas"],
            "properties": {"replicas": {"type": "integer"}}
          }
        }
      }
    },
    "paths": {
      "/apis/apps/v1beta1/deployments": {
        "post": {"x-kubernetes-group-version-kind": {"group": "apps", "version": "v1beta1", "kind": "Deployment"}}
      },
      "/apis/apps/v1/deployments": {
        "post": {"x-kubernetes-group-version-kind": {"group": "apps", "version": "v1", "kind": "Deployment"}}
      }
    }
  });
  std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
  path
}
