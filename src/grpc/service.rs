//! `GetClusterUpgradeSummaryValidationResult`, grounded in
//! `ClusterUpgradeReadServiceImpl`: build a client for the caller's
//! cluster, run the cluster pipeline with a near-zero-value `Config`
//! (the original hands `kubedd.ValidateCluster` a bare `pkg.Config{TargetKubernetesVersion:
//! ...}`, deliberately skipping the CLI's opinionated defaults — see
//! `Config::bare` and DESIGN.md), and return the flattened summary.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::SecretString;
use tonic::{Request, Response, Status};

use super::cluster_upgrade_read_service_server::ClusterUpgradeReadService;
use super::remote_connection_config::Connection;
use super::{ClusterConfig, ClusterUpgradeRequest, ClusterUpgradeResponse, SummarySchemaError, SummaryValidationResult};
use crate::config::Config;
use crate::repository::Repository;

impl From<&crate::summary::SummarySchemaError> for SummarySchemaError {
  fn from(error: &crate::summary::SummarySchemaError) -> Self {
    Self {
      path: error.path.clone(),
      schema_field: error.schema_field.clone(),
      reason: error.reason.clone(),
    }
  }
}

impl From<&crate::summary::SummaryValidationResult> for SummaryValidationResult {
  fn from(result: &crate::summary::SummaryValidationResult) -> Self {
    Self {
      file_name: result.file_name.clone(),
      kind: result.kind.clone(),
      api_version: result.api_version.clone(),
      resource_name: result.resource_name.clone(),
      resource_namespace: result.resource_namespace.clone(),
      deleted: result.deleted,
      deprecated: result.deprecated,
      latest_api_version: result.latest_api_version.clone(),
      is_version_supported: u32::from(result.is_version_supported),
      errors_for_original: result.errors_for_original.iter().map(Into::into).collect(),
      errors_for_latest: result.errors_for_latest.iter().map(Into::into).collect(),
      deprecation_for_original: result.deprecation_for_original.iter().map(Into::into).collect(),
      deprecation_for_latest: result.deprecation_for_latest.iter().map(Into::into).collect(),
    }
  }
}

/// Backs the `ClusterUpgradeReadService` RPC.
pub struct ClusterUpgradeService {
  repository: Arc<Repository>,
}

impl ClusterUpgradeService {
  pub fn new() -> Self {
    Self { repository: Arc::new(Repository::new()) }
  }
}

impl Default for ClusterUpgradeService {
  fn default() -> Self {
    Self::new()
  }
}

#[tonic::async_trait]
impl ClusterUpgradeReadService for ClusterUpgradeService {
  async fn get_cluster_upgrade_summary_validation_result(
    &self,
    request: Request<ClusterUpgradeRequest>,
  ) -> Result<Response<ClusterUpgradeResponse>, Status> {
    let request = request.into_inner();
    let repository = self.repository.clone();

    // Runs on its own task so a panic inside the pipeline surfaces as a
    // `JoinError` here instead of taking the server down (§6, §7).
    match tokio::spawn(handle(request, repository)).await {
      Ok(result) => result,
      Err(join_error) => {
        tracing::error!(error = %join_error, "PANIC in get_cluster_upgrade_summary_validation_result");
        Err(Status::internal("internal error"))
      }
    }
    .map(Response::new)
  }
}

async fn handle(request: ClusterUpgradeRequest, repository: Arc<Repository>) -> Result<ClusterUpgradeResponse, Status> {
  let cluster_config = request.cluster_config.unwrap_or_default();
  let kube_config = build_kube_config(&cluster_config).await?;
  let client =
    kube::Client::try_from(kube_config).map_err(|err| Status::internal(format!("failed to build kubernetes client: {err}")))?;

  let config = Config::bare(request.target_k8s_version);
  let outcome = crate::pipeline::cluster::run(client, &repository, &config)
    .await
    .map_err(|err| Status::internal(format!("cluster validation failed: {err}")))?;

  let results = crate::summary::bulk(&outcome.results).iter().map(Into::into).collect();
  Ok(ClusterUpgradeResponse { results })
}

async fn build_kube_config(cfg: &ClusterConfig) -> Result<kube::Config, Status> {
  if cfg.cluster_name.is_empty() {
    return kube::Config::infer()
      .await
      .map_err(|err| Status::internal(format!("failed to infer kubernetes config: {err}")));
  }

  let proxy_url = match cfg.remote_connection_config.as_ref().and_then(|r| r.connection.as_ref()) {
    Some(Connection::Ssh(_)) => {
      return Err(Status::unimplemented("ssh-tunneled cluster connections are not supported"));
    }
    Some(Connection::Proxy(proxy)) => Some(proxy.url.clone()),
    _ => None,
  };

  let kubeconfig = kube::config::Kubeconfig {
    preferences: None,
    clusters: vec![kube::config::NamedCluster {
      name: cfg.cluster_name.clone(),
      cluster: Some(kube::config::Cluster {
        server: Some(cfg.api_server_url.clone()),
        insecure_skip_tls_verify: Some(cfg.insecure_skip_tls_verify),
        certificate_authority: None,
        certificate_authority_data: non_empty_base64(&cfg.ca_data),
        proxy_url,
        disable_compression: None,
        tls_server_name: None,
        extensions: None,
      }),
    }],
    auth_infos: vec![kube::config::NamedAuthInfo {
      name: cfg.cluster_name.clone(),
      auth_info: Some(kube::config::AuthInfo {
        token: non_empty_token(&cfg.token),
        client_certificate_data: non_empty_base64(&cfg.cert_data),
        client_key_data: non_empty_secret_base64(&cfg.key_data),
        ..Default::default()
      }),
    }],
    contexts: vec![kube::config::NamedContext {
      name: cfg.cluster_name.clone(),
      context: Some(kube::config::Context {
        cluster: cfg.cluster_name.clone(),
        user: Some(cfg.cluster_name.clone()),
        namespace: None,
        extensions: None,
      }),
    }],
    current_context: Some(cfg.cluster_name.clone()),
    extensions: None,
    kind: None,
    api_version: None,
  };

  kube::Config::from_custom_kubeconfig(kubeconfig, &kube::config::KubeConfigOptions::default())
    .await
    .map_err(|err| Status::internal(format!("failed to build kubernetes config: {err}")))
}

fn non_empty_base64(bytes: &[u8]) -> Option<String> {
  if bytes.is_empty() { None } else { Some(BASE64.encode(bytes)) }
}

fn non_empty_secret_base64(bytes: &[u8]) -> Option<SecretString> {
  non_empty_base64(bytes).map(SecretString::from)
}

fn non_empty_token(token: &str) -> Option<SecretString> {
  if token.is_empty() { None } else { Some(SecretString::from(token)) }
}
