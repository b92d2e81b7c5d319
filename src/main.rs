//! `kubeshift` validates Kubernetes resources against a target release's
//! OpenAPI schema before a cluster upgrade, either as a one-shot CLI or as
//! a long-running gRPC service (`--serve`).

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use kubeshift::Cli;
use tracing_log::AsTrace;
use tracing_subscriber::EnvFilter;

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.verbose.log_level_filter().as_trace().to_string()));
  tracing_subscriber::fmt().with_env_filter(filter).without_time().compact().init();

  if cli.serve {
    kubeshift::serve().await?;
    return Ok(ExitCode::SUCCESS);
  }

  let has_errors = kubeshift::run(cli).await?;
  Ok(if has_errors { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
