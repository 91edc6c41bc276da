//! Logging configuration using tracing

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "CARDVIEW_LOG";

const DEFAULT_FILTER: &str = "cardview=info,warn";

/// Initialize the logging subsystem
///
/// Logs go to stderr. The level is controlled by `CARDVIEW_LOG`.
///
/// # Examples
/// ```bash
/// CARDVIEW_LOG=debug cardview --template card.json
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::debug!("logging initialised ({}={:?})", LOG_ENV, std::env::var(LOG_ENV).ok());
}
