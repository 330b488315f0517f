//! What the controller tells the outside world each tick: a discrete event,
//! an indicator state, and a transient message.

use std::time::{Duration, Instant};

use crate::geometry::Point;

// ════════════════════════════════════════════════════════════════════════════
// InteractionEvent
// ════════════════════════════════════════════════════════════════════════════

/// A discrete state change, reported at most once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionEvent {
    /// A disk was lifted into hand.
    Pickup,
    /// The held disk landed on a legal tower.
    DropValid,
    /// The held disk went back to its source (illegal target or lost hand).
    DropInvalid,
    /// The puzzle was restacked.
    Reset,
}

// ════════════════════════════════════════════════════════════════════════════
// Indicator
// ════════════════════════════════════════════════════════════════════════════

/// Visual state of the pinch ring drawn around the hand.
///
/// Colors are a presentation concern; this only says which state to show.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Indicator {
    Idle,
    /// Pinch just closed.
    Active,
    /// Pinch held past the feedback delay with nothing in hand.
    Holding,
    /// Pinch held past the feedback delay while carrying a disk.
    /// `pulse` cycles through 0.0–1.0.
    Carrying { pulse: f32 },
    /// Last action failed (illegal drop or tracking lost).
    Error,
}

/// Periodic 0.0–1.0 pulse for the carrying indicator.
///
/// A pure function of time: `t` is seconds since the controller's epoch.
pub fn pulse(t: f32) -> f32 {
    ((t * 5.0).sin() + 1.0) / 2.0
}

// ════════════════════════════════════════════════════════════════════════════
// Message
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub text:     String,
    pub shown_at: Instant,
}

impl Message {
    pub fn new(text: impl Into<String>, shown_at: Instant) -> Self {
        Message { text: text.into(), shown_at }
    }

    /// Display time left, or `None` once expired.
    pub fn remaining(&self, now: Instant, duration: Duration) -> Option<Duration> {
        let age = now.saturating_duration_since(self.shown_at);
        duration.checked_sub(age).filter(|d| !d.is_zero())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Feedback — read-only view for the presentation layer
// ════════════════════════════════════════════════════════════════════════════

/// Continuous feedback signal for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback<'a> {
    /// Hand centroid in presentation space; `None` while tracking is lost.
    pub hand_position: Option<Point>,
    /// Zone under the hand, if any.
    pub zone:          Option<usize>,
    pub indicator:     Indicator,
    pub pinching:      bool,
    /// Current message and how long it still shows.
    pub message:       Option<(&'a str, Duration)>,
}
