//! Structured logging
//!
//! One rolling log file (JSON or plain text) plus a colored stdout mirror in
//! text mode. `RUST_LOG` overrides the configured level.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// `hourly` / `daily`; anything else never rotates
fn rotation(name: &str) -> Rotation {
    match name.to_ascii_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Default filter: the configured level, with sqlx statement logs held at warn
fn default_directive(level: &str) -> String {
    format!("{},sqlx=warn", level)
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    let json_file = config.use_json.then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer.clone())
            .with_ansi(false)
    });
    let text_file = (!config.use_json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(writer)
            .with_ansi(false)
    });
    let stdout = (!config.use_json).then(|| fmt::layer().with_target(false).with_ansi(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_file)
        .with(text_file)
        .with(stdout)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_names() {
        assert_eq!(rotation("hourly"), Rotation::HOURLY);
        assert_eq!(rotation("Daily"), Rotation::DAILY);
        assert_eq!(rotation("never"), Rotation::NEVER);
        assert_eq!(rotation("weekly"), Rotation::NEVER);
    }

    #[test]
    fn test_default_directive_parses() {
        let directive = default_directive("debug");
        assert_eq!(directive, "debug,sqlx=warn");
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}
