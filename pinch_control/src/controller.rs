//! The pinch / pick / place state machine.
//!
//! `InteractionController` owns only interaction state.  The puzzle is
//! passed in by the caller on every call, so the tick loop stays the single
//! owner of both.

use std::time::{Duration, Instant};

use hanoi_puzzle::{Placement, PuzzleState};
use tracing::{debug, info, trace, warn};

use crate::config::InteractionConfig;
use crate::feedback::{pulse, Feedback, Indicator, InteractionEvent, Message};
use crate::geometry::{HandSample, Point, Surface};

pub const MSG_TRACKING_LOST: &str = "Disc returned (hand tracking lost)";
pub const MSG_INVALID_MOVE:  &str = "Invalid move! Larger disc cannot go on smaller disc";

// ════════════════════════════════════════════════════════════════════════════
// InteractionController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct InteractionController {
    config: InteractionConfig,
    /// Origin for the indicator pulse.
    epoch:  Instant,

    // ── pinch tracking ────────────────────────────────────────────────────
    pinching:         bool,
    pinch_started_at: Option<Instant>,
    last_action_at:   Option<Instant>,
    picked_up_at:     Option<Instant>,

    // ── feedback ──────────────────────────────────────────────────────────
    hand_position: Option<Point>,
    zone:          Option<usize>,
    indicator:     Indicator,
    last_event:    Option<InteractionEvent>,
    message:       Option<Message>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig, epoch: Instant) -> Self {
        InteractionController {
            config,
            epoch,
            pinching:         false,
            pinch_started_at: None,
            last_action_at:   None,
            picked_up_at:     None,
            hand_position:    None,
            zone:             None,
            indicator:        Indicator::Idle,
            last_event:       None,
            message:          None,
        }
    }

    // ── per-tick update ──────────────────────────────────────────────────

    /// Run one tick of the state machine.
    ///
    /// `sample` must already be in `surface` coordinates; `None` means no
    /// hand was detected this tick.  Returns the tick's event, which is also
    /// kept in [`Self::last_event`] until the next call.
    pub fn update(
        &mut self,
        puzzle:  &mut PuzzleState,
        sample:  Option<HandSample>,
        surface: Surface,
        now:     Instant,
    ) -> Option<InteractionEvent> {
        self.last_event = None;

        let Some(sample) = sample else {
            self.lose_tracking(puzzle, now);
            return self.last_event;
        };

        let centroid = sample.centroid();
        let zone     = surface.zone(centroid.x);
        self.hand_position = Some(centroid);
        self.zone          = Some(zone);

        let is_pinching = sample.pinch_distance() < self.config.pinch_threshold;
        match (is_pinching, self.pinching) {
            (true,  false) => self.begin_pinch(puzzle, zone, now),
            (false, true)  => self.release_pinch(puzzle, zone, now),
            (true,  true)  => self.continue_pinch(puzzle, now),
            (false, false) => {}
        }
        self.last_event
    }

    /// Hand vanished.  A held disk goes home; nothing is ever left in the air.
    fn lose_tracking(&mut self, puzzle: &mut PuzzleState, now: Instant) {
        self.hand_position = None;
        self.zone          = None;

        if let Some(held) = puzzle.return_held() {
            info!(disk = held.disk, tower = held.source, "hand tracking lost, disc returned");
            self.pinching   = false;
            self.last_event = Some(InteractionEvent::DropInvalid);
            self.indicator  = Indicator::Error;
            self.show_message(MSG_TRACKING_LOST, now);
        }
    }

    fn begin_pinch(&mut self, puzzle: &mut PuzzleState, zone: usize, now: Instant) {
        self.pinching         = true;
        self.pinch_started_at = Some(now);
        self.indicator        = Indicator::Active;

        if puzzle.held().is_some() || puzzle.tower(zone).is_empty() {
            return;
        }
        if !self.cooldown_elapsed(now) {
            trace!(zone, "pickup suppressed by cooldown");
            return;
        }
        match puzzle.pickup(zone) {
            Ok(disk) => {
                debug!(disk, tower = zone, "picked up");
                self.last_action_at = Some(now);
                self.picked_up_at   = Some(now);
                self.last_event     = Some(InteractionEvent::Pickup);
                self.show_message(
                    format!("Picked up disc {} from tower {}", disk, zone + 1),
                    now,
                );
            }
            Err(e) => trace!(error = %e, "pickup ignored"),
        }
    }

    fn release_pinch(&mut self, puzzle: &mut PuzzleState, zone: usize, now: Instant) {
        self.pinching  = false;
        self.indicator = Indicator::Idle;

        let Some(held) = puzzle.held() else { return };
        if !self.cooldown_elapsed(now) {
            trace!(zone, "placement suppressed by cooldown");
            return;
        }
        self.last_action_at = Some(now);

        match puzzle.place(zone) {
            Ok(Placement::Valid) => {
                debug!(disk = held.disk, from = held.source, to = zone, "placed");
                self.last_event = Some(InteractionEvent::DropValid);
                let quick = self.picked_up_at
                    .map(|t| now.saturating_duration_since(t) < self.config.quick_move_window)
                    .unwrap_or(false);
                let text = if quick {
                    format!("Quick move! Disc {} placed on tower {}", held.disk, zone + 1)
                } else {
                    format!("Disc {} placed on tower {}", held.disk, zone + 1)
                };
                self.show_message(text, now);
            }
            Ok(Placement::Invalid) => {
                info!(disk = held.disk, to = zone, "invalid move, disc returned to tower {}", held.source);
                self.last_event = Some(InteractionEvent::DropInvalid);
                self.indicator  = Indicator::Error;
                self.show_message(MSG_INVALID_MOVE, now);
            }
            Err(e) => warn!(error = %e, "placement rejected by model"),
        }
        self.picked_up_at = None;
    }

    fn continue_pinch(&mut self, puzzle: &PuzzleState, now: Instant) {
        let Some(started) = self.pinch_started_at else { return };
        if now.saturating_duration_since(started) <= self.config.hold_feedback_delay {
            return;
        }
        self.indicator = if puzzle.held().is_some() {
            let t = now.saturating_duration_since(self.epoch).as_secs_f32();
            Indicator::Carrying { pulse: pulse(t) }
        } else {
            Indicator::Holding
        };
    }

    fn cooldown_elapsed(&self, now: Instant) -> bool {
        self.last_action_at
            .map_or(true, |t| now.saturating_duration_since(t) > self.config.action_cooldown)
    }

    // ── commands from outside the gesture loop ──────────────────────────

    /// Restack the puzzle with `num_disks` disks and clear interaction state.
    pub fn reset(&mut self, puzzle: &mut PuzzleState, num_disks: usize) -> InteractionEvent {
        puzzle.reset(num_disks);
        self.pinching         = false;
        self.pinch_started_at = None;
        self.last_action_at   = None;
        self.picked_up_at     = None;
        self.indicator        = Indicator::Idle;
        self.message          = None;
        self.last_event       = Some(InteractionEvent::Reset);
        debug!(num_disks, "puzzle reset");
        InteractionEvent::Reset
    }

    pub fn show_message(&mut self, text: impl Into<String>, now: Instant) {
        self.message = Some(Message::new(text, now));
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn config(&self)        -> &InteractionConfig       { &self.config }
    pub fn is_pinching(&self)   -> bool                     { self.pinching }
    pub fn hand_position(&self) -> Option<Point>            { self.hand_position }
    pub fn zone(&self)          -> Option<usize>            { self.zone }
    pub fn indicator(&self)     -> Indicator                { self.indicator }
    pub fn last_event(&self)    -> Option<InteractionEvent> { self.last_event }

    /// The current message if it has not expired yet.
    pub fn message(&self, now: Instant) -> Option<(&str, Duration)> {
        let m = self.message.as_ref()?;
        m.remaining(now, self.config.message_duration)
            .map(|left| (m.text.as_str(), left))
    }

    pub fn feedback(&self, now: Instant) -> Feedback<'_> {
        Feedback {
            hand_position: self.hand_position,
            zone:          self.zone,
            indicator:     self.indicator,
            pinching:      self.pinching,
            message:       self.message(now),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SURFACE: Surface = Surface::new(1200.0, 600.0);
    const CLOSED:  f32 = 10.0;
    const OPEN:    f32 = 90.0;

    /// Centre x of each tower zone on `SURFACE`.
    fn zone_x(z: usize) -> f32 { SURFACE.zone_center(z) }

    fn pinch(zone: usize) -> Option<HandSample> {
        Some(HandSample::pinched_at(Point::new(zone_x(zone), 300.0), CLOSED))
    }

    fn open(zone: usize) -> Option<HandSample> {
        Some(HandSample::pinched_at(Point::new(zone_x(zone), 300.0), OPEN))
    }

    /// A controller plus a clock that advances by explicit steps.
    struct Rig {
        puzzle: PuzzleState,
        ctl:    InteractionController,
        now:    Instant,
    }

    impl Rig {
        fn new(n: usize) -> Self {
            let now = Instant::now();
            Rig {
                puzzle: PuzzleState::new(n),
                ctl:    InteractionController::new(InteractionConfig::default(), now),
                now,
            }
        }

        fn with_puzzle(puzzle: PuzzleState) -> Self {
            let mut r = Rig::new(puzzle.num_disks());
            r.puzzle = puzzle;
            r
        }

        fn at(&mut self, ms: u64, sample: Option<HandSample>) -> Option<InteractionEvent> {
            self.now += Duration::from_millis(ms);
            self.ctl.update(&mut self.puzzle, sample, SURFACE, self.now)
        }

        /// Pinch at `from`, carry, release at `to`, each step 400 ms apart.
        fn move_disk(&mut self, from: usize, to: usize) -> Option<InteractionEvent> {
            self.at(400, open(from));
            assert_eq!(self.at(400, pinch(from)), Some(InteractionEvent::Pickup));
            self.at(400, pinch(to));
            self.at(400, open(to))
        }
    }

    /// `[[2], [1], []]` reached through legal moves.
    fn two_one_split() -> PuzzleState {
        let mut p = PuzzleState::new(2);
        p.pickup(0).unwrap();
        p.place(1).unwrap();
        p
    }

    #[test]
    fn pinch_start_picks_up_top_disk() {
        let mut r = Rig::new(3);
        assert_eq!(r.at(1000, pinch(0)), Some(InteractionEvent::Pickup));
        assert_eq!(r.puzzle.held().map(|h| h.disk), Some(1));
        assert_eq!(r.puzzle.tower(0), &[3, 2]);
        assert_eq!(r.ctl.indicator(), Indicator::Active);
        let (msg, _) = r.ctl.message(r.now).unwrap();
        assert_eq!(msg, "Picked up disc 1 from tower 1");
    }

    #[test]
    fn pinch_on_empty_tower_is_silent() {
        let mut r = Rig::new(3);
        assert_eq!(r.at(1000, pinch(1)), None);
        assert_eq!(r.puzzle.held(), None);
        assert!(r.ctl.is_pinching());
        assert!(r.ctl.message(r.now).is_none());
    }

    #[test]
    fn full_three_disk_solve() {
        let mut r = Rig::new(3);
        for (from, to) in hanoi_puzzle::optimal_moves(3) {
            assert_eq!(r.move_disk(from, to), Some(InteractionEvent::DropValid));
        }
        assert_eq!(r.puzzle.towers(), &[vec![], vec![], vec![3, 2, 1]]);
        assert!(r.puzzle.check_win());
        assert_eq!(r.puzzle.move_count(), 7);
    }

    #[test]
    fn illegal_move_returns_disk_and_flags_error() {
        let mut r = Rig::with_puzzle(two_one_split());
        let before = r.puzzle.towers().clone();

        r.at(400, open(0));
        assert_eq!(r.at(400, pinch(0)), Some(InteractionEvent::Pickup));
        assert_eq!(r.puzzle.held().map(|h| h.disk), Some(2));
        r.at(400, pinch(1));
        assert_eq!(r.at(400, open(1)), Some(InteractionEvent::DropInvalid));

        assert_eq!(r.puzzle.towers(), &before);
        assert_eq!(r.puzzle.held(), None);
        assert_eq!(r.ctl.last_event(), Some(InteractionEvent::DropInvalid));
        assert_eq!(r.ctl.indicator(), Indicator::Error);
        assert_eq!(r.ctl.message(r.now).unwrap().0, MSG_INVALID_MOVE);
    }

    #[test]
    fn tracking_loss_returns_held_disk() {
        let mut r = Rig::new(3);
        r.at(1000, pinch(0));
        assert_eq!(r.puzzle.tower(0), &[3, 2]);

        assert_eq!(r.at(30, None), Some(InteractionEvent::DropInvalid));
        assert_eq!(r.puzzle.tower(0), &[3, 2, 1]);
        assert_eq!(r.puzzle.held(), None);
        assert_eq!(r.puzzle.disk_total(), 3);
        assert!(r.puzzle.is_ordered());
        assert!(!r.ctl.is_pinching());
        assert_eq!(r.ctl.hand_position(), None);
        assert_eq!(r.ctl.indicator(), Indicator::Error);
        assert_eq!(r.ctl.message(r.now).unwrap().0, MSG_TRACKING_LOST);
    }

    #[test]
    fn tracking_loss_with_empty_hand_is_quiet() {
        let mut r = Rig::new(3);
        r.at(1000, open(1));
        assert!(r.ctl.hand_position().is_some());
        assert_eq!(r.at(30, None), None);
        assert_eq!(r.ctl.hand_position(), None);
        assert_eq!(r.ctl.indicator(), Indicator::Idle);
    }

    #[test]
    fn cooldown_blocks_rapid_second_pickup() {
        let mut r = Rig::new(3);
        // First move completes normally.
        assert_eq!(r.at(1000, pinch(0)), Some(InteractionEvent::Pickup));
        r.at(350, pinch(2));
        assert_eq!(r.at(350, open(2)), Some(InteractionEvent::DropValid));

        // Jittery re-pinch on tower 0 within 300 ms: no pickup.
        assert_eq!(r.at(100, pinch(0)), None);
        assert_eq!(r.puzzle.held(), None);
        assert_eq!(r.puzzle.tower(0), &[3, 2]);

        // After the cooldown a fresh pinch works.
        r.at(100, open(0));
        assert_eq!(r.at(300, pinch(0)), Some(InteractionEvent::Pickup));
    }

    #[test]
    fn cooldown_blocks_rapid_release() {
        let mut r = Rig::new(3);
        r.at(1000, pinch(0));
        // Release 100 ms after pickup: ignored, disk stays in hand.
        assert_eq!(r.at(100, open(1)), None);
        assert_eq!(r.puzzle.held().map(|h| h.disk), Some(1));
        assert!(!r.ctl.is_pinching());
        // Re-pinch and release later on tower 1 places it.
        assert_eq!(r.at(100, pinch(1)), None);
        assert_eq!(r.at(400, open(1)), Some(InteractionEvent::DropValid));
        assert_eq!(r.puzzle.tower(1), &[1]);
    }

    #[test]
    fn jitter_oscillation_yields_single_pickup() {
        let mut r = Rig::new(3);
        let mut pickups = 0;
        r.at(1000, open(0));
        for i in 0..6 {
            let s = if i % 2 == 0 { pinch(0) } else { open(0) };
            if r.at(40, s) == Some(InteractionEvent::Pickup) {
                pickups += 1;
            }
        }
        assert_eq!(pickups, 1);
        assert_eq!(r.puzzle.disk_total(), 3);
    }

    #[test]
    fn quick_and_slow_placement_messages() {
        let mut r = Rig::new(3);
        r.at(1000, pinch(0));
        r.at(400, open(1));
        assert_eq!(r.ctl.message(r.now).unwrap().0, "Quick move! Disc 1 placed on tower 2");

        r.at(400, pinch(0));
        r.at(2000, pinch(2));
        r.at(10, open(2));
        assert_eq!(r.ctl.message(r.now).unwrap().0, "Disc 2 placed on tower 3");
    }

    #[test]
    fn hold_feedback_after_delay() {
        let mut r = Rig::new(3);
        // Empty-handed hold on an empty tower.
        r.at(1000, pinch(2));
        r.at(300, pinch(2));
        assert_eq!(r.ctl.indicator(), Indicator::Active);
        r.at(300, pinch(2));
        assert_eq!(r.ctl.indicator(), Indicator::Holding);

        // Carrying hold.
        r.at(100, open(0));
        r.at(400, pinch(0));
        r.at(600, pinch(0));
        assert!(matches!(r.ctl.indicator(), Indicator::Carrying { .. }));
    }

    #[test]
    fn release_resets_indicator_to_idle() {
        let mut r = Rig::new(3);
        r.at(1000, pinch(1));
        r.at(100, open(1));
        assert_eq!(r.ctl.indicator(), Indicator::Idle);
    }

    #[test]
    fn event_cleared_every_tick() {
        let mut r = Rig::new(3);
        assert_eq!(r.at(1000, pinch(0)), Some(InteractionEvent::Pickup));
        assert_eq!(r.at(30, pinch(0)), None);
        assert_eq!(r.ctl.last_event(), None);
    }

    #[test]
    fn message_expires_after_duration() {
        let mut r = Rig::new(3);
        r.at(1000, pinch(0));
        assert!(r.ctl.message(r.now + Duration::from_millis(1999)).is_some());
        assert!(r.ctl.message(r.now + Duration::from_secs(2)).is_none());
    }

    #[test]
    fn reset_clears_state_and_reports_event() {
        let mut r = Rig::new(3);
        r.at(1000, pinch(0));
        let ev = r.ctl.reset(&mut r.puzzle, 4);
        assert_eq!(ev, InteractionEvent::Reset);
        assert_eq!(r.ctl.last_event(), Some(InteractionEvent::Reset));
        assert_eq!(r.puzzle.towers(), &[vec![4, 3, 2, 1], vec![], vec![]]);
        assert!(!r.ctl.is_pinching());
        // No cooldown carried over from before the reset.
        assert_eq!(r.at(10, pinch(0)), Some(InteractionEvent::Pickup));
    }

    #[test]
    fn threshold_measured_in_presentation_space() {
        let mut r = Rig::new(3);
        // 40 units apart in a 640-wide frame becomes 80 on a 1280 window.
        let frame  = Surface::new(640.0, 480.0);
        let window = Surface::new(1280.0, 960.0);
        let raw = HandSample::pinched_at(Point::new(100.0, 100.0), 40.0);
        let scaled = raw.to_surface(frame, window, false);
        r.now += Duration::from_secs(1);
        let ev = r.ctl.update(&mut r.puzzle, Some(scaled), window, r.now);
        assert_eq!(ev, None);
        assert!(!r.ctl.is_pinching());
    }

    // ── properties ────────────────────────────────────────────────────────

    fn sample() -> impl Strategy<Value = Option<HandSample>> {
        prop_oneof![
            1 => Just(None),
            6 => (0.0f32..1200.0, 0.0f32..600.0, 0.0f32..120.0).prop_map(|(x, y, gap)| {
                Some(HandSample::pinched_at(Point::new(x, y), gap))
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_ticks_keep_puzzle_consistent(
            n in 2usize..=5,
            ticks in proptest::collection::vec((sample(), 0u64..800), 1..300),
        ) {
            let mut r = Rig::new(n);
            for (s, dt) in ticks {
                r.at(dt, s);
                prop_assert_eq!(r.puzzle.disk_total(), n);
                prop_assert!(r.puzzle.is_ordered());
                if r.ctl.hand_position().is_none() {
                    prop_assert!(r.puzzle.held().is_none());
                }
            }
        }
    }
}
