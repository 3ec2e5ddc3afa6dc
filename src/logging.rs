// Logging setup (tracing + tracing-subscriber)
//
// RUST_LOG controls the filter, default `info`, for example
// `RUST_LOG=sales_metrics=debug`.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber; output goes to stderr so report JSON
/// on stdout stays machine-readable
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose logging for tests; safe to call more than once
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
