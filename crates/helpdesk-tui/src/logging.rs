//! Tracing subscriber setup for the dashboard binary.
//!
//! Stdout carries rendered view lines, so logs go to stderr or to the
//! configured log file.

use std::fs::OpenOptions;
use std::sync::Mutex;

use helpdesk_core::config::LoggingConfig;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Calling it again after a subscriber is set is a no-op.
pub fn init_tracing(config: &LoggingConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let writer = if config.file.is_empty() {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.file)?;
        BoxMakeWriter::new(Mutex::new(file))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);
    let _ = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
    Ok(())
}
