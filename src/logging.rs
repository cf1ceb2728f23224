//! File logging. The terminal belongs to the UI, so tracing output goes to
//! `p9s.log` in the data directory.

use crate::config::LogConfig;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "p9s.log";
const DEFAULT_FILTER: &str = "p9s=info";

/// Install the global subscriber. Keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init(config: &LogConfig, dir_override: Option<&Path>) -> Result<WorkerGuard> {
  let dir = match dir_override.or(config.dir.as_deref()) {
    Some(dir) => dir.to_path_buf(),
    None => default_dir()?,
  };
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env("P9S_LOG")
    .unwrap_or_else(|_| EnvFilter::new(config.level.as_deref().unwrap_or(DEFAULT_FILTER)));

  let file_layer = tracing_subscriber::fmt::layer()
    .with_writer(writer)
    .with_ansi(false);

  tracing_subscriber::registry()
    .with(filter)
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  tracing::info!(path = %dir.join(LOG_FILE).display(), "logging initialized");
  Ok(guard)
}

fn default_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("p9s"))
}
