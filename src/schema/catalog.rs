//! Builds the kind catalog from a normalized document (C3).

use std::collections::HashMap;

use super::document::{Document, Gvk};
use crate::version;

/// One group/version entry for a kind, ordered within its kind's list by
/// the version comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindInfo {
  /// API group, empty for the core group.
  pub group: String,
  /// API version, e.g. `"v1"`.
  pub version: String,
  /// The `components.schemas` key addressing this kind's schema.
  pub component_key: String,
  /// Non-empty iff the document declares a POST/PUT path for this GVK.
  pub rest_path: String,
  /// True iff the version string matches the GA pattern.
  pub is_ga: bool,
}

/// `lowercase(kind) -> ordered KindInfo list`, increasing by the version
/// comparator; the last element of each list is the newest.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  kinds: HashMap<String, Vec<KindInfo>>,
}

impl Catalog {
  /// Builds a catalog from a normalized document (§4.3).
  pub fn build(doc: &Document) -> Self {
    let rest_paths = build_rest_path_map(doc);
    let mut catalog = Self::default();
    catalog.merge_from(doc, &rest_paths);
    catalog
  }

  /// Merges another document's component/REST-path passes into this
  /// catalog (`Config.AdditionalSchemaLocations`, §4.3). A `component_key`
  /// already present is left untouched — the primary document wins.
  pub fn merge_additional(&mut self, doc: &Document) {
    let rest_paths = build_rest_path_map(doc);
    let mut incoming = Self::default();
    incoming.merge_from(doc, &rest_paths);
    for (kind, entries) in incoming.kinds {
      let existing = self.kinds.entry(kind).or_default();
      let existing_keys: std::collections::HashSet<_> = existing.iter().map(|k| k.component_key.clone()).collect();
      for entry in entries {
        if !existing_keys.contains(&entry.component_key) {
          existing.push(entry);
        }
      }
      existing.sort_by(|a, b| {
        if version::is_smaller(&a.version, &b.version) {
          std::cmp::Ordering::Less
        } else if version::is_smaller(&b.version, &a.version) {
          std::cmp::Ordering::Greater
        } else {
          std::cmp::Ordering::Equal
        }
      });
    }
  }

  fn merge_from(&mut self, doc: &Document, rest_paths: &HashMap<String, String>) {
    let Some(schemas) = doc.component_schemas() else { return };
    for (component_key, node) in schemas {
      let schema = super::document::Schema::new(node);
      let Some(gvk) = schema.group_version_kind() else { continue };

      let rest_path = rest_paths.get(&canonical_key(&gvk)).cloned().unwrap_or_default();
      let info = KindInfo {
        group: gvk.group.clone(),
        version: gvk.version.clone(),
        component_key: component_key.clone(),
        rest_path,
        is_ga: version::is_ga(&gvk.version),
      };

      self.kinds.entry(gvk.kind.to_lowercase()).or_default().push(info);
    }

    for entries in self.kinds.values_mut() {
      entries.sort_by(|a, b| {
        if version::is_smaller(&a.version, &b.version) {
          std::cmp::Ordering::Less
        } else if version::is_smaller(&b.version, &a.version) {
          std::cmp::Ordering::Greater
        } else {
          std::cmp::Ordering::Equal
        }
      });
    }
  }

  /// All `KindInfo` entries for a kind, in comparator order.
  pub fn entries(&self, kind: &str) -> &[KindInfo] {
    self.kinds.get(&kind.to_lowercase()).map(Vec::as_slice).unwrap_or(&[])
  }

  /// True iff `kind` has at least one catalog entry at all (used by
  /// `IgnoreMissingSchemas`).
  pub fn has_kind(&self, kind: &str) -> bool {
    self.kinds.contains_key(&kind.to_lowercase())
  }

  /// `isApiVersionSupported`: true iff the catalog has an entry for `kind`
  /// with matching group/version and a non-empty REST path.
  pub fn is_api_version_supported(&self, group: &str, version: &str, kind: &str) -> bool {
    self
      .entries(kind)
      .iter()
      .any(|k| k.group.eq_ignore_ascii_case(group) && k.version.eq_ignore_ascii_case(version) && !k.rest_path.is_empty())
  }

  /// For each kind, the last catalog entry with a non-empty REST path,
  /// deduplicated by the `(group, version, kind)` triple.
  pub fn latest_kinds(&self) -> Vec<(String, KindInfo)> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (kind, entries) in &self.kinds {
      if let Some(last) = entries.last() {
        if last.rest_path.is_empty() {
          continue;
        }
        let triple = (last.group.clone(), last.version.clone(), kind.clone());
        if seen.insert(triple) {
          out.push((kind.clone(), last.clone()));
        }
      }
    }
    out
  }
}

fn build_rest_path_map(doc: &Document) -> HashMap<String, String> {
  let mut map = HashMap::new();
  let Some(paths) = doc.paths() else { return map };
  for (path, operations) in paths {
    let Some(ops) = operations.as_object() else { continue };
    for method in ["post", "put"] {
      let Some(op) = ops.get(method) else { continue };
      if let Some(gvk) = op
        .get("x-kubernetes-group-version-kind")
        .and_then(super::document::parse_gvk)
      {
        map.insert(canonical_key(&gvk), path.clone());
      }
    }
  }
  map
}

/// Lowercase `"group/version/kind"` (or `"version/kind"` when group is
/// empty) — the canonical key linking a REST path to its component.
pub fn canonical_key(gvk: &Gvk) -> String {
  if gvk.group.is_empty() {
    format!("{}/{}", gvk.version, gvk.kind).to_lowercase()
  } else {
    format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind).to_lowercase()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::document::Document;

  fn doc_with(schemas: serde_json::Value, paths: serde_json::Value) -> Document {
    Document::new(serde_json::json!({"paths": paths, "components": {"schemas": schemas}}))
  }

  #[test]
  fn catalog_orders_by_version_and_marks_rest_path() {
    let schemas = serde_json::json!({
      "io.k8s.api.apps.v1beta1.Deployment": {
        "type": "object",
        "x-kubernetes-group-version-kind": [{"group": "apps", "version": "v1beta1", "kind": "Deployment"}]
      },
      "io.k8s.api.apps.v1.Deployment": {
        "type": "object",
        "x-kubernetes-group-version-kind": [{"group": "apps", "version": "v1", "kind": "Deployment"}]
      },
    });
    let paths = serde_json::json!({
      "/apis/apps/v1/deployments": {
        "post": {"x-kubernetes-group-version-kind": {"group": "apps", "version": "v1", "kind": "Deployment"}}
      }
    });
    let doc = doc_with(schemas, paths);
    let catalog = Catalog::build(&doc);
    let entries = catalog.entries("deployment");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].version, "v1beta1");
    assert_eq!(entries[0].rest_path, "");
    assert_eq!(entries[1].version, "v1");
    assert_eq!(entries[1].rest_path, "/apis/apps/v1/deployments");
  }

  #[test]
  fn ambiguous_group_version_kind_array_is_skipped() {
    let schemas = serde_json::json!({
      "io.k8s.Shared": {
        "type": "object",
        "x-kubernetes-group-version-kind": [
          {"group": "a", "version": "v1", "kind": "Foo"},
          {"group": "b", "version": "v1", "kind": "Bar"}
        ]
      }
    });
    let doc = doc_with(schemas, serde_json::json!({}));
    let catalog = Catalog::build(&doc);
    assert!(catalog.entries("foo").is_empty());
    assert!(catalog.entries("bar").is_empty());
  }

  #[test]
  fn latest_kinds_requires_rest_path() {
    let schemas = serde_json::json!({
      "io.k8s.api.apps.v1.DeploymentStatus": {
        "type": "object",
        "x-kubernetes-group-version-kind": [{"group": "apps", "version": "v1", "kind": "DeploymentStatus"}]
      },
    });
    let doc = doc_with(schemas, serde_json::json!({}));
    let catalog = Catalog::build(&doc);
    assert!(catalog.latest_kinds().is_empty());
  }
}
