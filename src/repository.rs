//! Per-release document cache with cooperative single-flight loading (C7).
//!
//! Concurrent callers asking for the same release observe at-most-one
//! load; once a release is cached it is treated as immutable and readers
//! never block on each other again.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::config::Config;
use crate::error::Result;
use crate::schema::{Catalog, Document};

/// A loaded release: its normalized document plus the catalog built from it.
#[derive(Clone)]
pub struct Release {
  pub document: Arc<Document>,
  pub catalog: Arc<Catalog>,
}

struct Slot {
  cell: OnceCell<Release>,
}

/// Caches [`Release`]s by Kubernetes version string.
#[derive(Default)]
pub struct Repository {
  slots: Mutex<HashMap<String, Arc<Slot>>>,
}

impl Repository {
  /// Creates an empty repository.
  pub fn new() -> Self {
    Self::default()
  }

  /// Ensures `release` is loaded (from `schema_location` if set, else
  /// fetched over HTTPS), building its catalog on first load, and returns
  /// the cached result. At most one load per `release` key runs
  /// concurrently; later callers await the in-flight load rather than
  /// starting their own.
  pub async fn get(&self, release: &str, schema_location: &str, config: &Config) -> Result<Release> {
    let slot = {
      let mut slots = self.slots.lock().await;
      slots
        .entry(release.to_string())
        .or_insert_with(|| Arc::new(Slot { cell: OnceCell::new() }))
        .clone()
    };

    slot
      .cell
      .get_or_try_init(|| async {
        let mut document = if schema_location.is_empty() {
          crate::schema::load_from_url(release, config.insecure_skip_tls_verify).await?
        } else {
          crate::schema::load_from_path(release, schema_location)?
        };

        let mut catalog = Catalog::build(&document);
        for extra in &config.additional_schema_locations {
          let extra_doc = crate::schema::load_from_path(release, extra)?;
          catalog.merge_additional(&extra_doc);
          document.merge(extra_doc);
        }

        tracing::info!(release, "loaded kubernetes openapi schema");

        Ok(Release {
          document: Arc::new(document),
          catalog: Arc::new(catalog),
        })
      })
      .await
      .cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn concurrent_gets_share_a_single_load() {
    // Uses a local schema file so the test needs no network access; the
    // single-flight property is that both calls observe the same `Arc`.
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(
      tmp.path(),
      serde_json::json!({"definitions": {"io.k8s.apimachinery.pkg.util.intstr.IntOrString": {"type": "string", "format": "int-or-string"}}, "paths": {}})
        .to_string(),
    )
    .unwrap();

    let repo = Repository::new();
    let config = Config::default();
    let path = tmp.path().to_str().unwrap();

    let (a, b) = tokio::join!(
      repo.get("1.22", path, &config),
      repo.get("1.22", path, &config),
    );
    let a = a.unwrap();
    let b = b.unwrap();
    assert!(Arc::ptr_eq(&a.document, &b.document));
  }
}
