//! End-to-end CLI tests: real temp-directory YAML files and a local
//! OpenAPI fixture (no network), driven through the public `Cli`/`run` API
//! exactly as the binary invokes it.

mod common;

use clap::Parser;
use kubeshift::Cli;

fn args(schema: &str, file: &std::path::Path, extra: &[&str]) -> Vec<String> {
  let mut a = vec![
    "kubeshift".to_string(),
    "--target-schema-location".to_string(),
    schema.to_string(),
    "--output-format".to_string(),
    "json".to_string(),
    "--quiet".to_string(),
    file.to_string_lossy().to_string(),
  ];
  a.extend(extra.iter().map(|s| s.to_string()));
  a
}

#[tokio::test]
async fn conforming_resource_has_no_errors() {
  let tmp = tempfile::tempdir().unwrap();
  let schema = common::write_schema_fixture(tmp.path());
  let resource = tmp.path().join("deployment.yaml");
  std::fs::write(
    &resource,
    "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: 3\n",
  )
  .unwrap();

  let cli = Cli::parse_from(args(schema.to_str().unwrap(), &resource, &[]));
  let has_errors = kubeshift::run(cli).await.unwrap();
  assert!(!has_errors);
}

#[tokio::test]
async fn older_version_missing_a_field_required_by_latest() {
  let tmp = tempfile::tempdir().unwrap();
  let schema = common::write_schema_fixture(tmp.path());
  let resource = tmp.path().join("deployment.yaml");
  std::fs::write(
    &resource,
    "apiVersion: apps/v1beta1\nkind: Deployment\nmetadata:\n  name: web\nspec: {}\n",
  )
  .unwrap();

  let cli = Cli::parse_from(args(schema.to_str().unwrap(), &resource, &[]));
  let has_errors = kubeshift::run(cli).await.unwrap();
  assert!(has_errors);
}

#[tokio::test]
async fn removed_api_version_is_flagged_deleted() {
  let tmp = tempfile::tempdir().unwrap();
  let schema = common::write_schema_fixture(tmp.path());
  let resource = tmp.path().join("deployment.yaml");
  std::fs::write(
    &resource,
    "apiVersion: apps/v1alpha1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: 1\n",
  )
  .unwrap();

  let cli = Cli::parse_from(args(schema.to_str().unwrap(), &resource, &[]));
  let has_errors = kubeshift::run(cli).await.unwrap();
  assert!(has_errors, "a removed api version must fail the run even with zero structural errors");
}

#[tokio::test]
async fn malformed_document_is_skipped_without_aborting_the_run() {
  let tmp = tempfile::tempdir().unwrap();
  let schema = common::write_schema_fixture(tmp.path());
  let resource = tmp.path().join("mixed.yaml");
  std::fs::write(
    &resource,
    "kind: Deployment\n---\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  replicas: 2\n",
  )
  .unwrap();

  let cli = Cli::parse_from(args(schema.to_str().unwrap(), &resource, &[]));
  let has_errors = kubeshift::run(cli).await.unwrap();
  assert!(!has_errors, "the malformed first document must be skipped, not abort the second");
}

#[tokio::test]
async fn exit_on_error_aborts_on_the_first_malformed_document() {
  let tmp = tempfile::tempdir().unwrap();
  let schema = common::write_schema_fixture(tmp.path());
  let resource = tmp.path().join("unreadable.yaml");
  std::fs::write(&resource, "kind: Deployment\n").unwrap();

  let cli = Cli::parse_from(args(schema.to_str().unwrap(), &resource, &["--exit-on-error"]));
  let err = kubeshift::run(cli).await.unwrap_err();
  assert!(err.to_string().contains("unreadable.yaml"));
}
