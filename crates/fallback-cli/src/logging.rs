//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Environment variable that overrides every other log setting.
pub const LOG_ENV: &str = "FALLBACK_LOG";

/// Install the global subscriber, writing to stderr.
///
/// `FALLBACK_LOG` wins when set and valid; otherwise `directive` is used, and
/// an invalid directive falls back to `warn`. Calling this more than once is a
/// no-op.
pub fn init_tracing(directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(directive))
            .unwrap_or_else(|_| EnvFilter::new(fallback_settings::DEFAULT_LOG_FILTER));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}
