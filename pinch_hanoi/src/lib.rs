//! # pinch_hanoi
//!
//! Tower of Hanoi driven by a pinch gesture, with a software-rendered board,
//! a camera-landmark preview and MIDI sound cues.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Pinch (thumb + index together) over a tower | Pick up its top disc |
//! | Move while pinched | Carry the disc |
//! | Release over a tower | Place the disc (or bounce back if illegal) |
//! | Hand leaves the camera | Carried disc returns to its tower |
//!
//! The screen is split into three vertical thirds; the third under the hand
//! selects the tower.
//!
//! ## Hand sources
//!
//! * `sim` (default) — **Simulation mode**: the mouse is the hand; hold the
//!   left button to pinch.
//! * `process` — **Camera mode**: an external detector process streams one
//!   JSON landmark line per camera frame (see [`pose`]).
//!
//! ### Keyboard
//!
//! | Key | Command |
//! |---|---|
//! | `Enter` | Start game from the menu |
//! | `R` | Reset the puzzle |
//! | `+` / `-` | More / fewer discs (2–5, resets) |
//! | `Escape` | Back to menu, or quit from the menu |
//! | `Q` | Quit |

pub mod config;
pub mod logging;
pub mod pose;
pub mod presentation;
pub mod theme;
pub mod sound;
pub mod visualizer;
pub mod app;
