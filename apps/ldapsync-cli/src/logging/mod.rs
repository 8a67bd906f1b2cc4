//! CLI logging
//!
//! Installs a `tracing` subscriber writing to stderr, so stdout carries only
//! command output. `RUST_LOG` wins over the verbosity flags.

pub mod level;

pub use level::LogLevel;

use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if set and valid, otherwise the level's directive.
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(level >= LogLevel::Debug)
        .try_init();
}
