//! File-backed structured logging.
//!
//! The terminal belongs to the UI, so events go to a log file instead.
//! Levels are controlled with `RUST_LOG`.

use std::{fs::File, io, path::Path, sync::Mutex};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILE: &str = "sg_client.log";
pub const DEFAULT_FILTER: &str = "info,tungstenite=warn,tokio_tungstenite=warn";

/// Install the global subscriber, truncating `log_file`.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
///
/// # Example
///
/// ```no_run
/// sg_client::logging::init(sg_client::logging::DEFAULT_LOG_FILE).unwrap();
/// tracing::info!("client starting");
/// ```
pub fn init(log_file: impl AsRef<Path>) -> io::Result<()> {
    let file = File::create(log_file)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt_layer)
        .try_init();

    tracing::info!("logging initialized");
    Ok(())
}

/// `RUST_LOG` if set and valid, the default filter otherwise.
pub fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
