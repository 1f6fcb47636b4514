//! Logging setup utilities for the Lobby chat hub.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose spans and events are enabled by the default filter.
const LOGGED_CRATES: [&str; 3] = ["lobby_server", "lobby_shared", "tower_http"];

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Every crate in [`LOGGED_CRATES`] plus the binary itself is enabled at
/// `default_log_level`. Dashes in the binary name are normalized to
/// underscores because that is how `tracing` reports module targets.
pub fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let mut targets: Vec<String> = Vec::with_capacity(LOGGED_CRATES.len() + 1);
    for target in LOGGED_CRATES.iter().copied().chain(std::iter::once(binary_name)) {
        let target = target.replace('-', "_");
        // a binary named after a logged crate shares its target
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "lobby-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use lobby_shared::logger::setup_logger;
///
/// setup_logger("lobby-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
