//! pinch_hanoi — entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};

use pinch_hanoi::app::run;
use pinch_hanoi::config::{AppConfig, SourceKind, ThemeName};
use pinch_hanoi::logging::{init_logging, LogConfig, LogFormat};

/// Tower of Hanoi played with a pinch gesture.
#[derive(Parser, Debug)]
#[command(name = "pinch_hanoi", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of discs (2–5)
    #[arg(short = 'n', long, value_name = "N")]
    disks: Option<usize>,

    #[arg(long, value_enum)]
    theme: Option<ThemeName>,

    /// Hand source: mouse simulation or an external detector
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Ticks per second
    #[arg(long, value_name = "HZ")]
    tick_rate: Option<u32>,

    /// Do not flip the camera image
    #[arg(long)]
    no_mirror: bool,

    /// Mute sound cues
    #[arg(long)]
    no_sound: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Prefix log lines with timestamps
    #[arg(long)]
    log_timestamps: bool,
}

impl Cli {
    /// File (or defaults) with command-line flags on top.
    fn config(&self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => AppConfig::default(),
        };

        if let Some(n) = self.disks      { cfg.num_disks   = n; }
        if let Some(t) = self.theme      { cfg.theme       = t; }
        if let Some(s) = self.source     { cfg.source.kind = s; }
        if let Some(r) = self.tick_rate  { cfg.tick_rate   = r; }
        if self.no_mirror { cfg.source.mirror  = false; }
        if self.no_sound  { cfg.sound.enabled  = false; }

        cfg.validate().context("invalid command-line options")
    }

    fn log_config(&self) -> LogConfig {
        LogConfig {
            format:          self.log_format,
            with_timestamps: self.log_timestamps,
            ..LogConfig::from_verbosity(self.verbose)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_config()).context("installing log subscriber")?;
    let cfg = cli.config()?;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Pinch Hanoi — Tower of Hanoi by hand gesture        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match cfg.source.kind {
        SourceKind::Sim     => println!("  Mode: mouse simulation  (hold left button to pinch)"),
        SourceKind::Process => println!("  Mode: camera  ({})", cfg.source.command.join(" ")),
    }
    println!("  Discs: {}   Theme: {:?}", cfg.num_disks, cfg.theme);
    println!();

    run(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "pinch_hanoi", "-n", "4", "--theme", "classic", "--source", "process",
            "--no-sound", "--no-mirror", "--tick-rate", "60",
        ]).unwrap();
        let cfg = cli.config().unwrap();
        assert_eq!(cfg.num_disks, 4);
        assert_eq!(cfg.theme, ThemeName::Classic);
        assert_eq!(cfg.source.kind, SourceKind::Process);
        assert_eq!(cfg.tick_rate, 60);
        assert!(!cfg.sound.enabled);
        assert!(!cfg.source.mirror);
    }

    #[test]
    fn disk_flag_is_clamped() {
        let cli = Cli::try_parse_from(["pinch_hanoi", "--disks", "12"]).unwrap();
        assert_eq!(cli.config().unwrap().num_disks, 5);
    }

    #[test]
    fn bad_tick_rate_rejected() {
        let cli = Cli::try_parse_from(["pinch_hanoi", "--tick-rate", "0"]).unwrap();
        assert!(cli.config().is_err());
    }

    #[test]
    fn verbosity_flags() {
        let cli = Cli::try_parse_from(["pinch_hanoi", "-vv", "--log-format", "json"]).unwrap();
        let log = cli.log_config();
        assert_eq!(log.level, tracing::Level::TRACE);
        assert_eq!(log.format, LogFormat::Json);
    }

    #[test]
    fn missing_config_file_reports_path() {
        let cli = Cli::try_parse_from(["pinch_hanoi", "-c", "/nonexistent/pinch.toml"]).unwrap();
        let err = format!("{:#}", cli.config().unwrap_err());
        assert!(err.contains("/nonexistent/pinch.toml"));
    }
}
