//! Tracing subscriber setup for the `johanna` binary.
//!
//! Events go to stderr so that passthrough output on stdout stays clean.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directives read before falling back to the level passed to `init`.
pub const LOG_ENV: &str = "JOHANNA_LOG";
const RUST_LOG_ENV: &str = "RUST_LOG";


/// Install the global subscriber. Calling it twice is harmless; the second
/// call is ignored.
pub fn init(level: &str) {
    let directives = filter_directives(level, |key| std::env::var(key).ok());
    let env_filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false));
    let _ = tracing::subscriber::set_global_default(registry);
}


/// `JOHANNA_LOG`, else `RUST_LOG`, else `level`. Empty values are skipped.
fn filter_directives<F>(level: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    [LOG_ENV, RUST_LOG_ENV]
        .iter()
        .filter_map(|key| lookup(key))
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| level.to_string())
}
