//! File logging for hosts that do not install their own subscriber

use std::path::Path;

use anyhow::Context;

use crate::config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "release_updater=info";

/// Install a global subscriber writing to `log_path`, or to
/// [`config::log_path`] when none is given.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init_logging(log_path: Option<&Path>) -> anyhow::Result<WorkerGuard> {
    let default_path = config::log_path();
    let log_path = log_path.unwrap_or(&default_path);
    let dir = log_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .with_context(|| format!("log path {:?} has no file name", log_path))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {:?}", dir))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    Ok(guard)
}
