//! Tuning knobs for the interaction state machine.

use std::time::Duration;

/// Thresholds and timings for [`crate::InteractionController`].
///
/// `pinch_threshold` is in presentation-space units, the same space in which
/// samples are handed to `update`.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionConfig {
    /// Index-to-thumb distance below which the hand counts as pinching.
    pub pinch_threshold:     f32,
    /// Minimum gap between two pickups/placements.
    pub action_cooldown:     Duration,
    /// How long a feedback message stays visible.
    pub message_duration:    Duration,
    /// Pinch hold time before the indicator starts its hold animation.
    pub hold_feedback_delay: Duration,
    /// Pickup-to-place times under this earn the "Quick move!" message.
    pub quick_move_window:   Duration,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        InteractionConfig {
            pinch_threshold:     50.0,
            action_cooldown:     Duration::from_millis(300),
            message_duration:    Duration::from_secs(2),
            hold_feedback_delay: Duration::from_millis(500),
            quick_move_window:   Duration::from_millis(1500),
        }
    }
}
