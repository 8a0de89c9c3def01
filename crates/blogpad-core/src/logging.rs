//! Tracing subscriber setup for applications embedding the client.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Directive applied on top of `RUST_LOG`.
pub const DEFAULT_DIRECTIVE: &str = "blogpad_core=info";

/// Filter from `RUST_LOG` plus `default_directive`.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter, ParseError> {
    Ok(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
}

/// Install the global fmt subscriber. Later calls are no-ops.
///
/// An unparsable `default_directive` falls back to `RUST_LOG` alone and is
/// reported through the installed subscriber.
pub fn init_tracing(default_directive: &str) {
    let (filter, rejected) = match env_filter(default_directive) {
        Ok(filter) => (filter, None),
        Err(error) => (EnvFilter::from_default_env(), Some(error)),
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    if let Some(error) = rejected {
        tracing::warn!("Ignoring invalid log directive '{}': {}", default_directive, error);
    }
}
