//! Diagnostic logging via `tracing`, written to stderr so stdout stays
//! clean for results and TSV output.
//!
//! Levels: `warn` for persistence problems that were skipped, `info` for
//! seeding, import and reset, `debug` for each applied operation and
//! stored key, `trace` for everything else.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level for a `-v` count: none = warn, `-v` = debug, `-vv` = trace.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Build an `EnvFilter` from the given level, respecting `RUST_LOG`.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Other crates stay at warn
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("warn,comparo={}", level))
    })
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbosity: u8) {
    let filter = build_env_filter(level_for_verbosity(verbosity));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
