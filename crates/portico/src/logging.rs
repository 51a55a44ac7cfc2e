//! Logging setup for binaries built on Portico.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
///
/// `verbose` raises the default from `info` to `debug`; an explicit
/// `RUST_LOG` always wins.
pub fn default_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs a `fmt` subscriber writing to stderr.
///
/// Calling this twice (e.g. from tests) is harmless: the second call
/// leaves the first subscriber in place.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
