//! Log subscriber setup for test runs.
//!
//! Pagewright emits `tracing` events for element actions, navigation and
//! wait outcomes. Call [`init`] once at the start of a test binary to see
//! them; the filter is read from `PAGEWRIGHT_LOG` (default `info`).

use crate::result::{PagewrightError, PagewrightResult};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "PAGEWRIGHT_LOG";

/// Output format of the subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber in the given format.
///
/// Output goes through the test writer so `cargo test` captures it.
pub fn try_init_with(format: LogFormat) -> PagewrightResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_test_writer();
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| PagewrightError::Config {
        message: format!("failed to install log subscriber: {e}"),
    })
}

/// Install the global pretty subscriber
pub fn try_init() -> PagewrightResult<()> {
    try_init_with(LogFormat::Pretty)
}

/// Install the global subscriber, ignoring an already-installed one
pub fn init() {
    if let Err(err) = try_init() {
        tracing::debug!(error = %err, "log subscriber not installed");
    }
}
