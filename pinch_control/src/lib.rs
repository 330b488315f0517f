//! # pinch_control
//!
//! Turns one hand-landmark sample per tick into discrete Tower of Hanoi
//! actions.
//!
//! ## Gesture → Action mapping
//!
//! | Transition | Condition | Action |
//! |---|---|---|
//! | hand lost | disk in hand | disk returns to its source tower |
//! | open → pinch | hand empty, zone tower non-empty, cooldown over | pick up top disk of zone |
//! | pinch → open | disk in hand, cooldown over | place disk on zone |
//! | pinch held | held > hold delay | indicator pulses (carrying) or turns solid (empty) |
//!
//! The zone is the horizontal third of the presentation surface under the
//! midpoint of index fingertip and thumb tip.  A pinch is "closed" when the
//! two tips are nearer than the configured threshold, measured in the same
//! presentation space.
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use hanoi_puzzle::PuzzleState;
//! use pinch_control::{HandSample, InteractionConfig, InteractionController,
//!                     InteractionEvent, Point, Surface};
//!
//! let surface = Surface::new(1200.0, 600.0);
//! let t0 = Instant::now();
//! let mut puzzle = PuzzleState::new(3);
//! let mut ctl = InteractionController::new(InteractionConfig::default(), t0);
//!
//! let pinch = HandSample::pinched_at(Point::new(100.0, 300.0), 10.0);
//! let ev = ctl.update(&mut puzzle, Some(pinch), surface, t0 + Duration::from_secs(1));
//! assert_eq!(ev, Some(InteractionEvent::Pickup));
//! assert_eq!(puzzle.held().map(|h| h.disk), Some(1));
//! ```

pub mod geometry;
pub mod config;
pub mod feedback;
pub mod controller;

pub use geometry::{HandSample, Point, Surface};
pub use config::InteractionConfig;
pub use feedback::{pulse, Feedback, Indicator, InteractionEvent, Message};
pub use controller::{InteractionController, MSG_INVALID_MOVE, MSG_TRACKING_LOST};
