//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! `RUST_LOG` wins when set; otherwise the level comes from the command line.
//!
//! # Log Levels
//!
//! - `warn`: detector hiccups, missing MIDI ports
//! - `info`: game start/win, invalid moves, tracking loss
//! - `debug`: every pickup and placement
//! - `trace`: suppressed actions (cooldown, empty tower)

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// Single-line terse format.
    Compact,
    /// JSON objects for machine parsing.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level:           Level,
    pub format:          LogFormat,
    pub with_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: Level::INFO, format: LogFormat::Pretty, with_timestamps: false }
    }
}

impl LogConfig {
    /// 0 → info, 1 → debug, 2+ → trace.
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        LogConfig { level, ..LogConfig::default() }
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,hanoi_puzzle={lvl},pinch_control={lvl},pinch_hanoi={lvl}",
            lvl = level.to_string().to_ascii_lowercase(),
        ))
    })
}

/// Install the global subscriber.  Call once, from `main`.
pub fn init_logging(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = build_env_filter(config.level);
    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, config.with_timestamps) {
        (LogFormat::Json, _) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Compact, true) => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Compact, false) => registry
            .with(fmt::layer().compact().without_time().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Pretty, true) => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Pretty, false) => registry
            .with(fmt::layer().without_time().with_writer(std::io::stderr))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(LogConfig::from_verbosity(0).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(1).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(5).level, Level::TRACE);
    }
}
