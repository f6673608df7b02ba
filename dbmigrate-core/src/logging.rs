//! Logging setup for dbmigrate binaries and embedders.
//!
//! Library code only emits `tracing` events; nothing is printed unless a
//! subscriber is installed. [`init`] installs one writing to stderr, so
//! stdout keeps carrying only `Migrated <name>` progress lines.
//!
//! # Environment Variables
//!
//! - `DBMIGRATE_DEBUG=true|1|yes` - Enable debug logging
//! - `DBMIGRATE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `DBMIGRATE_LOG_FORMAT=json|pretty|compact` - Output format (default: compact)

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `DBMIGRATE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("DBMIGRATE_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level.
///
/// `DBMIGRATE_LOG_LEVEL` wins; otherwise "debug" if `DBMIGRATE_DEBUG` is set,
/// else "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("DBMIGRATE_LOG_LEVEL") {
        Ok(level) => parse_level(&level).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

/// Get the configured log format from `DBMIGRATE_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("DBMIGRATE_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "json" => "json",
            "pretty" => "pretty",
            _ => "compact",
        })
        .unwrap_or("compact")
}

fn parse_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// Initialize logging from the environment.
///
/// Subsequent calls are no-ops.
pub fn init() {
    init_with_level(get_log_level());
}

/// Initialize logging at an explicit level, ignoring `DBMIGRATE_LOG_LEVEL`.
///
/// Subsequent calls are no-ops.
pub fn init_with_level(level: &str) {
    let level = parse_level(level).unwrap_or("warn");

    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "dbmigrate={level},dbmigrate_core={level},dbmigrate_postgres={level},dbmigrate_scylladb={level},dbmigrate_cli={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let layer = fmt::layer().with_writer(std::io::stderr);
            // Another subscriber may already be installed by the host program.
            let _ = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.json())
                    .try_init(),
                "pretty" => tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.pretty())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.compact())
                    .try_init(),
            };

            tracing::debug!(log_level = level, format = get_log_format(), "Logging initialized");
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = level;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some("debug"));
        assert_eq!(parse_level("warn"), Some("warn"));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_log_level_default() {
        // SAFETY: no other test in this crate reads these variables.
        unsafe {
            env::remove_var("DBMIGRATE_DEBUG");
            env::remove_var("DBMIGRATE_LOG_LEVEL");
        }
        assert!(!is_debug_enabled());
        assert_eq!(get_log_level(), "warn");
    }
}
