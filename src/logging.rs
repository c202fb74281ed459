//! Logging setup.
//!
//! Output goes to a daily-rolling file so that command output on stdout
//! stays clean. `RUST_LOG` overrides the configured level.

use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Default log directory.
pub fn default_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("sitebook").join("logs"))
}

/// Filter directive for the crate at the given level.
fn default_filter(level: &str, verbose: bool) -> String {
  let level = if verbose { "debug" } else { level };
  format!("sitebook={}", level)
}

/// Initialize logging into `dir`.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the background writer.
pub fn init(config: &LogConfig, verbose: bool) -> Result<WorkerGuard> {
  let dir = match &config.dir {
    Some(dir) => dir.clone(),
    None => default_dir()?,
  };
  init_in(&dir, &config.level, verbose)
}

fn init_in(dir: &Path, level: &str, verbose: bool) -> Result<WorkerGuard> {
  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(dir, "sitebook.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_filter(level, verbose)));

  let subscriber = tracing_subscriber::registry().with(env_filter).with(
    fmt::layer()
      .with_writer(writer)
      .with_ansi(false)
      .with_target(true),
  );

  // Ignore the error if a subscriber is already set
  let _ = subscriber.try_init();

  Ok(guard)
}
