//! Tracing setup for the CLI.
use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Logs to stderr, and to `<log_dir>/<session_id>/vault.log` when a log
/// directory is given.
///
/// The returned guard flushes the file writer when dropped, so it must live
/// as long as the process logs.
pub fn setup_logging(log_dir: Option<PathBuf>, session_id: &str) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let (file_layer, guard) = match &log_dir {
        Some(dir) => {
            let session_dir = dir.join(session_id);
            std::fs::create_dir_all(&session_dir)?;

            let file_appender = tracing_appender::rolling::never(&session_dir, "vault.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking_file).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        let log_file = dir.join(session_id).join("vault.log");
        tracing::info!(session = session_id, "Log file: {}", log_file.display());
    }

    Ok(guard)
}
