//! gRPC startup/operational contract (§6): listen on `SERVER_GRPC_PORT`
//! (default `8111`), bound message sizes from `GRPC_MAX_RECEIVE_MSG_SIZE`/
//! `GRPC_MAX_SEND_MSG_SIZE` (MiB, defaulting to 20/4), recycle connections
//! after 10 seconds, and shut down gracefully on `SIGTERM`.

use std::time::Duration;

use anyhow::{Context, Result};

use super::cluster_upgrade_read_service_server::ClusterUpgradeReadServiceServer;
use super::service::ClusterUpgradeService;

const DEFAULT_PORT: u16 = 8111;
const DEFAULT_MAX_RECEIVE_MIB: usize = 20;
const DEFAULT_MAX_SEND_MIB: usize = 4;
const MAX_CONNECTION_AGE: Duration = Duration::from_secs(10);
const MIB: usize = 1024 * 1024;

fn env_usize(name: &str, default: usize) -> usize {
  std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_port() -> u16 {
  std::env::var("SERVER_GRPC_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT)
}

/// Starts the gRPC server and runs until a `SIGTERM`/Ctrl-C is received,
/// letting in-flight RPCs finish before returning.
pub async fn serve() -> Result<()> {
  let addr = format!("0.0.0.0:{}", env_port()).parse().context("invalid SERVER_GRPC_PORT")?;
  let max_receive = env_usize("GRPC_MAX_RECEIVE_MSG_SIZE", DEFAULT_MAX_RECEIVE_MIB) * MIB;
  let max_send = env_usize("GRPC_MAX_SEND_MSG_SIZE", DEFAULT_MAX_SEND_MIB) * MIB;

  let service = ClusterUpgradeReadServiceServer::new(ClusterUpgradeService::new())
    .max_decoding_message_size(max_receive)
    .max_encoding_message_size(max_send);

  tracing::info!(%addr, max_receive, max_send, "starting kubeshift gRPC server");

  tonic::transport::Server::builder()
    .max_connection_age(MAX_CONNECTION_AGE)
    .add_service(service)
    .serve_with_shutdown(addr, shutdown_signal())
    .await
    .context("grpc server failed")?;

  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    let _ = tokio::signal::ctrl_c().await;
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(err) => tracing::warn!(error = %err, "failed to install SIGTERM handler"),
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }

  tracing::info!("shutdown signal received, waiting for in-flight requests to finish");
}
