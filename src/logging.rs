use tracing_subscriber::{fmt, EnvFilter};

/// Installs a stderr subscriber so diagnostics never mix with the report.
///
/// The level comes from `RUST_LOG` and defaults to `warn`, which surfaces
/// skipped lines only.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
