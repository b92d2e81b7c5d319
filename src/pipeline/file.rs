//! File pipeline (C8): YAML/JSON files and directories validated against the
//! target release, one document at a time (§4.8).

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::repository::Repository;
use crate::validator::ValidationResult;

const YAML_SEPARATOR: &str = "\n---\n";

/// Everything produced while validating one file: the results that came out
/// of it, plus the error that stopped it early, if any — either the file
/// itself could not be read, or (when `Config.ExitOnError` is set) one of
/// its documents failed to validate.
pub struct FileOutcome {
  pub file_name: String,
  pub results: Vec<ValidationResult>,
  pub file_error: Option<Error>,
}

/// Walks `directories` collecting `.yaml`/`.yml` files not matched by any
/// `ignored_path_patterns` regex, appends them to `args`, and returns the
/// combined file list.
pub fn aggregate_files(args: &[String], directories: &[String], ignored_path_patterns: &[String]) -> Result<Vec<PathBuf>> {
  let patterns = compile_patterns(ignored_path_patterns);
  let mut files: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();

  for directory in directories {
    for entry in WalkDir::new(directory).into_iter().filter_map(std::result::Result::ok) {
      let path = entry.path();
      if !entry.file_type().is_file() {
        continue;
      }
      let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
      if is_yaml && !is_ignored(path, &patterns) {
        files.push(path.to_path_buf());
      }
    }
  }

  Ok(files)
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
  patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

fn is_ignored(path: &Path, patterns: &[Regex]) -> bool {
  let path = path.to_string_lossy();
  patterns.iter().any(|re| re.is_match(&path))
}

/// Validates every file, splitting each on the YAML document separator and
/// continuing past per-document failures. A failure to read a file, or (when
/// `config.exit_on_error` is set) a single malformed document within one, is
/// recorded on its [`FileOutcome`] and stops the whole run.
pub async fn run(files: &[PathBuf], repository: &Repository, config: &Config) -> Result<Vec<FileOutcome>> {
  let mut outcomes = Vec::with_capacity(files.len());

  for path in files {
    let file_name = path.to_string_lossy().to_string();
    let outcome = match std::fs::read(path) {
      Ok(contents) => validate_file_contents(&contents, &file_name, repository, config).await,
      Err(err) => FileOutcome { file_name: file_name.clone(), results: Vec::new(), file_error: Some(err.into()) },
    };

    let failed = outcome.file_error.is_some();
    outcomes.push(outcome);
    if failed && config.exit_on_error {
      break;
    }
  }

  Ok(outcomes)
}

async fn validate_file_contents(contents: &[u8], file_name: &str, repository: &Repository, config: &Config) -> FileOutcome {
  let text = String::from_utf8_lossy(contents);
  let mut results = Vec::new();

  for document in text.split(YAML_SEPARATOR) {
    let document = document.trim();
    if document.is_empty() {
      continue;
    }
    match super::validate_one(document.as_bytes(), file_name, repository, config).await {
      Ok(result) => results.push(result),
      Err(err) => {
        tracing::error!(file = file_name, error = %err, "skipping document");
        if config.exit_on_error {
          return FileOutcome { file_name: file_name.to_string(), results, file_error: Some(err) };
        }
      }
    }
  }

  FileOutcome { file_name: file_name.to_string(), results, file_error: None }
}
