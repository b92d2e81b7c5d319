//! Cluster pipeline (C9): live objects discovered against a running
//! apiserver, validated the same way file-sourced resources are (§4.9).

use std::collections::{BTreeMap, HashMap};

use kube::api::{Api, DynamicObject, ListParams, ResourceExt};
use kube::discovery::{ApiCapabilities, ApiResource, Discovery};
use kube::Client;

use crate::config::Config;
use crate::error::Result;
use crate::repository::{Release, Repository};
use crate::validator::ValidationResult;

const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// What the cluster pipeline produced: the apiserver version it actually
/// talked to, plus every validated object's result.
pub struct ClusterOutcome {
  pub server_version: String,
  pub results: Vec<ValidationResult>,
}

/// Discovers every kind the target release knows about with a REST path,
/// lists live objects for it (honoring `select_kinds`/`ignore_kinds` and
/// `select_namespaces`/`ignore_namespaces`), and validates each one (§4.9).
pub async fn run(client: Client, repository: &Repository, config: &Config) -> Result<ClusterOutcome> {
  let server_version = match client.apiserver_version().await {
    Ok(info) => format!("{}.{}", info.major, info.minor),
    Err(err) => {
      tracing::warn!(error = %err, "could not determine server version, falling back to target-kubernetes-version");
      config.target_kubernetes_version.clone()
    }
  };

  let Some(release) = resolve_release(repository, &server_version, config).await else {
    tracing::warn!(server_version, target_version = config.target_kubernetes_version, "no schema available for either the discovered server version or the target version, returning no results");
    return Ok(ClusterOutcome { server_version, results: Vec::new() });
  };

  let discovery = Discovery::new(client.clone()).run().await?;
  let kind_map = build_kind_map(&discovery);

  let mut results = Vec::new();
  for (kind, _) in release.catalog.latest_kinds() {
    if crate::glob::contains(&kind, &config.ignore_kinds) {
      continue;
    }
    if !config.select_kinds.is_empty() && !crate::glob::contains(&kind, &config.select_kinds) {
      continue;
    }

    let Some((resource, _caps)) = kind_map.get(&kind) else {
      continue;
    };
    if is_skipped_resource(&resource.plural) {
      continue;
    }

    let api: Api<DynamicObject> = Api::all_with(client.clone(), resource);

    let objects = match api.list(&ListParams::default()).await {
      Ok(list) => list.items,
      Err(err) => {
        tracing::error!(kind = %kind, error = %err, "failed to list resource in cluster");
        continue;
      }
    };

    for object in objects {
      let namespace = object.namespace().unwrap_or_else(|| config.default_namespace.clone());
      if crate::glob::contains(&namespace, &config.ignore_namespaces) {
        continue;
      }
      if !config.select_namespaces.is_empty() && !crate::glob::contains(&namespace, &config.select_namespaces) {
        continue;
      }

      let Some(body) = resource_body(&object) else { continue };
      match crate::validator::validate_yaml(body.as_bytes(), &release.catalog, &release.document, "cluster", config.ignore_missing_schemas) {
        Ok(result) => results.push(crate::filter::apply(result, config)),
        Err(err) => tracing::error!(kind = %kind, name = object.name_any(), error = %err, "skipping object"),
      }
    }
  }

  Ok(ClusterOutcome { server_version, results })
}

/// Tries the discovered server version first, falling back to
/// `Config.TargetKubernetesVersion` if no schema is available for it, and
/// giving up (not erroring) if neither load succeeds (§4.9).
async fn resolve_release(repository: &Repository, server_version: &str, config: &Config) -> Option<Release> {
  match repository.get(server_version, &config.target_schema_location, config).await {
    Ok(release) => Some(release),
    Err(err) => {
      tracing::warn!(error = %err, version = server_version, "failed to load schema for discovered server version, falling back to target-kubernetes-version");
      match repository
        .get(&config.target_kubernetes_version, &config.target_schema_location, config)
        .await
      {
        Ok(release) => Some(release),
        Err(err) => {
          tracing::warn!(error = %err, version = config.target_kubernetes_version, "failed to load schema for target-kubernetes-version either");
          None
        }
      }
    }
  }
}

/// `kind(lowercase) -> (ApiResource, ApiCapabilities)`, preferring the first
/// group/version discovery returns for a given kind (mirrors the `kubectl`
/// example's precedence note: discovery order is not a perfect signal but is
/// the best one available without a full REST mapper).
fn build_kind_map(discovery: &Discovery) -> HashMap<String, (ApiResource, ApiCapabilities)> {
  let mut kinds: BTreeMap<String, (ApiResource, ApiCapabilities)> = BTreeMap::new();
  for group in discovery.groups() {
    for (resource, caps) in group.recommended_resources() {
      kinds.entry(resource.kind.to_lowercase()).or_insert((resource, caps));
    }
  }
  kinds.into_iter().collect()
}

fn is_skipped_resource(plural: &str) -> bool {
  plural.contains("lists") || plural.contains("reviews") || plural.eq_ignore_ascii_case("bindings")
}

/// Prefers the `kubectl.kubernetes.io/last-applied-configuration` annotation
/// (the desired-state manifest) over the live object's own JSON, matching
/// `FetchK8sObjects`.
fn resource_body(object: &DynamicObject) -> Option<String> {
  if let Some(applied) = object.annotations().get(LAST_APPLIED_ANNOTATION) {
    if !applied.is_empty() {
      return Some(applied.clone());
    }
  }
  serde_json::to_string(object).ok()
}
