mod config;
mod error;
mod filter;
mod glob;
mod grpc;
mod output;
mod pipeline;
mod repository;
mod schema;
mod structural;
mod summary;
mod validator;
mod version;
mod visitor;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use serde::{Deserialize, Serialize};

pub use config::{Config, OutputFormat};
pub use grpc::serve;
pub use repository::Repository;

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .literal(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightCyan))),
    )
    .usage(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
}

/// Validate Kubernetes resources against a target release's OpenAPI schema
/// before a cluster upgrade.
#[derive(Parser, Debug)]
#[command(author, about, version)]
#[command(propagate_version = true)]
#[command(styles=get_styles())]
pub struct Cli {
  /// Files to validate; with no files or `--directories`, validates the
  /// cluster `--kubeconfig` points at instead (§4.11).
  pub files: Vec<PathBuf>,

  #[command(flatten)]
  pub config: CliConfig,

  /// Run the gRPC service instead of a one-shot CLI validation (§6).
  #[arg(long)]
  pub serve: bool,

  #[clap(flatten)]
  pub verbose: Verbosity,
}

#[derive(clap::Args, Debug, Serialize, Deserialize)]
pub struct CliConfig {
  /// Optional path to a `.kubeshift.yaml`-style config file.
  #[arg(short, long = "config")]
  pub config_file: Option<String>,

  #[arg(long)]
  pub target_kubernetes_version: Option<String>,
  #[arg(long)]
  pub source_kubernetes_version: Option<String>,
  #[arg(long)]
  pub target_schema_location: Option<String>,
  #[arg(long)]
  pub source_schema_location: Option<String>,
  #[arg(long, value_delimiter = ',')]
  pub additional_schema_locations: Option<Vec<String>>,
  #[arg(long)]
  pub ignore_missing_schemas: bool,
  #[arg(long)]
  pub strict: bool,
  #[arg(long)]
  pub default_namespace: Option<String>,
  #[arg(long, value_delimiter = ',')]
  pub select_namespaces: Option<Vec<String>>,
  #[arg(long, value_delimiter = ',')]
  pub ignore_namespaces: Option<Vec<String>>,
  #[arg(long, value_delimiter = ',')]
  pub select_kinds: Option<Vec<String>>,
  #[arg(long, value_delimiter = ',')]
  pub ignore_kinds: Option<Vec<String>>,
  #[arg(long = "ignore-keys-for-deprecation", value_delimiter = ',')]
  pub ignore_keys_from_deprecation: Option<Vec<String>>,
  #[arg(long = "ignore-keys-for-validation", value_delimiter = ',')]
  pub ignore_keys_from_validation: Option<Vec<String>>,
  #[arg(long)]
  pub ignore_null_errors: bool,
  #[arg(long)]
  pub insecure_skip_tls_verify: bool,
  #[arg(short, long)]
  pub quiet: bool,
  #[arg(long)]
  pub exit_on_error: bool,
  #[arg(short, long, value_enum)]
  pub output_format: Option<config::OutputFormat>,

  /// A comma-separated list of directories to recursively search for YAML
  /// documents.
  #[arg(short = 'd', long, value_delimiter = ',')]
  pub directories: Vec<String>,
  /// A comma-separated list of regular expressions specifying paths to
  /// ignore while walking `--directories`.
  #[arg(short = 'i', long, value_delimiter = ',')]
  pub ignored_path_patterns: Vec<String>,

  /// Path to a kubeconfig file, for cluster mode.
  #[arg(long)]
  pub kubeconfig: Option<String>,
  /// Context to use from the kubeconfig, for cluster mode.
  #[arg(long)]
  pub kubecontext: Option<String>,

  /// Force colored output even if stdout is not a TTY.
  #[arg(long)]
  pub force_color: bool,
  /// Disable colored output.
  #[arg(long)]
  pub no_color: bool,
}

impl CliConfig {
  /// Layers CLI flags (when present) over a loaded `Config`, following the
  /// same precedence as the original tool's `AddKubeaddFlags`: an explicit
  /// flag always wins, anything left unset keeps the loaded/default value.
  pub fn apply(&self, mut config: Config) -> Config {
    if let Some(v) = &self.target_kubernetes_version {
      config.target_kubernetes_version = v.clone();
    }
    if let Some(v) = &self.source_kubernetes_version {
      config.source_kubernetes_version = v.clone();
    }
    if let Some(v) = &self.target_schema_location {
      config.target_schema_location = v.clone();
    }
    if let Some(v) = &self.source_schema_location {
      config.source_schema_location = v.clone();
    }
    if let Some(v) = &self.additional_schema_locations {
      config.additional_schema_locations = v.clone();
    }
    if let Some(v) = &self.default_namespace {
      config.default_namespace = v.clone();
    }
    if let Some(v) = &self.select_namespaces {
      config.select_namespaces = v.clone();
    }
    if let Some(v) = &self.ignore_namespaces {
      config.ignore_namespaces = v.clone();
    }
    if let Some(v) = &self.select_kinds {
      config.select_kinds = v.clone();
    }
    if let Some(v) = &self.ignore_kinds {
      config.ignore_kinds = v.clone();
    }
    if let Some(v) = &self.ignore_keys_from_deprecation {
      config.ignore_keys_from_deprecation = v.clone();
    }
    if let Some(v) = &self.ignore_keys_from_validation {
      config.ignore_keys_from_validation = v.clone();
    }
    if let Some(v) = self.output_format {
      config.output_format = v;
    }
    config.ignore_missing_schemas |= self.ignore_missing_schemas;
    config.strict |= self.strict;
    config.ignore_null_errors |= self.ignore_null_errors;
    config.insecure_skip_tls_verify |= self.insecure_skip_tls_verify;
    config.quiet |= self.quiet;
    config.exit_on_error |= self.exit_on_error;
    config
  }
}

/// Runs the CLI end to end: loads configuration, dispatches to the file or
/// cluster pipeline, renders output, and returns whether the run found any
/// errors (§4.11 — caller maps this to a process exit code).
pub async fn run(cli: Cli) -> Result<bool> {
  let loaded = config::load(cli.config.config_file.as_deref())?;
  let config = cli.config.apply(loaded);
  let repository = Repository::new();
  let no_color = cli.config.no_color && !cli.config.force_color;

  let (label, results) = if !cli.files.is_empty() || !cli.config.directories.is_empty() {
    let args: Vec<String> = cli.files.iter().map(|p| p.to_string_lossy().to_string()).collect();
    let files = pipeline::file::aggregate_files(&args, &cli.config.directories, &cli.config.ignored_path_patterns)?;
    let outcomes = pipeline::file::run(&files, &repository, &config).await?;

    let mut results = Vec::new();
    for outcome in &outcomes {
      if let Some(err) = &outcome.file_error {
        tracing::error!(file = outcome.file_name, error = %err, "aborting: could not process file");
        if config.exit_on_error {
          anyhow::bail!("failed to process {}: {err}", outcome.file_name);
        }
      }
      results.extend(outcome.results.clone());
    }
    ("files".to_string(), results)
  } else {
    let kube_config = build_kube_config(cli.config.kubeconfig.as_deref(), cli.config.kubecontext.as_deref()).await?;
    let client = kube::Client::try_from(kube_config)?;
    let outcome = pipeline::cluster::run(client, &repository, &config).await?;
    (format!("cluster at version {}", outcome.server_version), outcome.results)
  };

  if !config.quiet {
    println!();
    println!("Results for {label}");
    println!("-------------------------------------------");
  }
  println!("{}", output::render(&results, config.output_format, no_color));

  Ok(has_errors(&results))
}

fn has_errors(results: &[validator::ValidationResult]) -> bool {
  results.iter().any(|r| r.has_errors())
}

async fn build_kube_config(kubeconfig: Option<&str>, kubecontext: Option<&str>) -> Result<kube::Config> {
  let options = kube::config::KubeConfigOptions { context: kubecontext.map(str::to_string), ..Default::default() };

  let config = match kubeconfig {
    Some(path) => {
      let kubeconfig = kube::config::Kubeconfig::read_from(path)?;
      kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?
    }
    None => kube::Config::infer().await?,
  };

  Ok(config)
}
