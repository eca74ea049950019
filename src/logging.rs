//! Logging configuration using tracing
//!
//! Structured logging to stderr, filtered via RUST_LOG.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Per-action report lines ("Copied message ...", "Tagged N messages ...")
/// are this tool's primary output, so the default level is `info` rather
/// than the usual quiet `warn`.
///
/// # Example RUST_LOG values
/// - `RUST_LOG=warn` - Warnings and errors only
/// - `RUST_LOG=debug` - Include per-query diagnostics
/// - `RUST_LOG=tagmail=trace` - Trace level for the tagmail crate
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init() -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).without_time().compact())
        .try_init()
        .map_err(|e| {
            crate::TagmailError::Config(format!("Failed to initialize tracing: {}", e))
        })?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init();
}
