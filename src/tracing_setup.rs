use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global fmt subscriber.
///
/// Logs go to stderr: the host bridge uses stdout as its protocol channel.
/// Level comes from `RUST_LOG`, defaulting to `info`. Calling this twice
/// is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
