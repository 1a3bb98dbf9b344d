//! Tracing setup for hosts embedding the runtime.
//!
//! The runtime logs under these targets:
//! - `sohl::runtime::pipeline` for recompute cycles
//! - `sohl::runtime::persistence` for document writes and deletes
//! - `sohl::runtime::dispatch` for action execution

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{Result, RuntimeError};

pub const PIPELINE_TARGET: &str = "sohl::runtime::pipeline";
pub const PERSISTENCE_TARGET: &str = "sohl::runtime::persistence";
pub const DISPATCH_TARGET: &str = "sohl::runtime::dispatch";

/// `RUST_LOG` if set, otherwise `default_directive`.
fn env_filter(default_directive: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| RuntimeError::Logging(e.to_string())),
    }
}

/// Installs a stderr subscriber.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive)?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| RuntimeError::Logging(e.to_string()))
}

/// Installs a subscriber writing to `dir/file_name`.
///
/// Logs are flushed while the returned guard is alive.
pub fn init_file_tracing(
    dir: &Path,
    file_name: &str,
    default_directive: &str,
) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir).map_err(|e| RuntimeError::Logging(e.to_string()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter(default_directive)?)
        .with(file_layer)
        .try_init()
        .map_err(|e| RuntimeError::Logging(e.to_string()))?;

    tracing::info!(target: PIPELINE_TARGET, path = %dir.join(file_name).display(), "logging initialized");
    Ok(guard)
}
