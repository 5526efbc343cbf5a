//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ServerConfig;

/// File name prefix for rolling log files.
const LOG_FILE_PREFIX: &str = "videobrowser.log";

/// Filter directive for the configured level. `verbose` forces `debug`.
pub fn filter_directive(config: &ServerConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. When `log_dir` is
/// set, events are also written to a daily rolling file; the returned guard
/// must be held for the life of the process so buffered lines are flushed.
pub fn init_logging(config: &ServerConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbose)));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            registry
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}
