//! Application configuration: TOML file with defaults for every field,
//! overridden by command-line flags in `main`.
//!
//! ```toml
//! num_disks = 4
//! theme     = "midnight"
//! tick_rate = 60
//!
//! [interaction]
//! pinch_threshold      = 45.0
//! action_cooldown_secs = 0.25
//!
//! [source]
//! kind    = "process"
//! command = ["python3", "hand_detect.py", "--camera", "0"]
//! ```

use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use hanoi_puzzle::{clamp_disks, DEFAULT_DISKS};
use pinch_control::InteractionConfig;
use serde::Deserialize;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Enumerated choices
// ════════════════════════════════════════════════════════════════════════════

/// Color scheme for the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Off-white background with jewel-toned discs.
    #[default]
    Crystal,
    /// Dark navy background.
    Midnight,
    /// Wooden base and pastel discs.
    Classic,
}

/// Where hand landmarks come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Mouse position and left button.
    #[default]
    Sim,
    /// External detector process streaming JSON lines.
    Process,
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width:  usize,
    pub height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 1280, height: 720 }
    }
}

/// File form of [`InteractionConfig`]; durations are in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionSettings {
    pub pinch_threshold:          f32,
    pub action_cooldown_secs:     f64,
    pub message_duration_secs:    f64,
    pub hold_feedback_delay_secs: f64,
    pub quick_move_secs:          f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        let d = InteractionConfig::default();
        InteractionSettings {
            pinch_threshold:          d.pinch_threshold,
            action_cooldown_secs:     d.action_cooldown.as_secs_f64(),
            message_duration_secs:    d.message_duration.as_secs_f64(),
            hold_feedback_delay_secs: d.hold_feedback_delay.as_secs_f64(),
            quick_move_secs:          d.quick_move_window.as_secs_f64(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub kind:           SourceKind,
    /// Detector program and its arguments (`process` source only).
    pub command:        Vec<String>,
    /// Flip the camera horizontally so the screen acts like a mirror.
    pub mirror:         bool,
    /// Hands scored below this are ignored.
    pub min_confidence: f32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            kind:           SourceKind::Sim,
            command:        vec!["python3".into(), "hand_detect.py".into()],
            mirror:         true,
            min_confidence: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundConfig {
    pub enabled:  bool,
    /// General MIDI program for the cues.
    pub program:  u8,
    pub velocity: u8,
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig { enabled: true, program: 11, velocity: 100 } // vibraphone
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub num_disks:   usize,
    pub theme:       ThemeName,
    /// Target ticks per second.
    pub tick_rate:   u32,
    pub window:      WindowConfig,
    pub interaction: InteractionSettings,
    pub source:      SourceConfig,
    pub sound:       SoundConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            num_disks:   DEFAULT_DISKS,
            theme:       ThemeName::default(),
            tick_rate:   30,
            window:      WindowConfig::default(),
            interaction: InteractionSettings::default(),
            source:      SourceConfig::default(),
            sound:       SoundConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(text)?;
        cfg.validate()
    }

    /// Reject unusable values and clamp the disk count.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.num_disks = clamp_disks(self.num_disks);

        let i = &self.interaction;
        if !(i.pinch_threshold.is_finite() && i.pinch_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pinch_threshold must be positive, got {}", i.pinch_threshold
            )));
        }
        for (name, secs) in [
            ("action_cooldown_secs",     i.action_cooldown_secs),
            ("message_duration_secs",    i.message_duration_secs),
            ("hold_feedback_delay_secs", i.hold_feedback_delay_secs),
            ("quick_move_secs",          i.quick_move_secs),
        ] {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number of seconds, got {}", name, secs
                )));
            }
        }
        if !(1..=240).contains(&self.tick_rate) {
            return Err(ConfigError::Invalid(format!(
                "tick_rate must be within 1–240, got {}", self.tick_rate
            )));
        }
        if self.window.width < 320 || self.window.height < 240 {
            return Err(ConfigError::Invalid(format!(
                "window must be at least 320×240, got {}×{}",
                self.window.width, self.window.height
            )));
        }
        if self.source.kind == SourceKind::Process && self.source.command.is_empty() {
            return Err(ConfigError::Invalid(
                "source.command is empty but source.kind = \"process\"".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.source.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "source.min_confidence must be within 0–1, got {}", self.source.min_confidence
            )));
        }
        self.sound.program  = self.sound.program.min(127);
        self.sound.velocity = self.sound.velocity.min(127);
        Ok(self)
    }

    /// The controller's view of the interaction settings.
    pub fn interaction_config(&self) -> InteractionConfig {
        let i = &self.interaction;
        InteractionConfig {
            pinch_threshold:     i.pinch_threshold,
            action_cooldown:     secs(i.action_cooldown_secs),
            message_duration:    secs(i.message_duration_secs),
            hold_feedback_delay: secs(i.hold_feedback_delay_secs),
            quick_move_window:   secs(i.quick_move_secs),
        }
    }
}

/// Seconds to a `Duration`, rounded to the microsecond.
fn secs(s: f64) -> Duration {
    Duration::from_micros((s * 1e6).round() as u64)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
