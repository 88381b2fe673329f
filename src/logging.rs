//! Diagnostic logging to stderr.
//!
//! Filter resolution: `AGENTHQ_LOG`, then `RUST_LOG`, then a default of
//! `warn` (`debug` with `-d`, `trace` with `-dd`).

use tracing_subscriber::EnvFilter;

use crate::ui::OutputMode;

pub const LOG_ENV: &str = "AGENTHQ_LOG";

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "agenthq_cli=debug,warn",
        _ => "trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: u8, mode: OutputMode) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(mode == OutputMode::Text)
        .with_target(false)
        .without_time()
        .try_init();
}
