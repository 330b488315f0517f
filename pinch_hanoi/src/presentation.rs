//! The boundary between the game loop and whatever shows it.
//!
//! The loop builds a [`Snapshot`] each tick and hands it to a
//! [`Presentation`]; the presentation hands back an [`InputFrame`] of
//! commands and pointer state.  Nothing on this side knows about pixels.

use std::time::Duration;

use hanoi_puzzle::{Disk, TOWER_COUNT};
use pinch_control::{Indicator, InteractionEvent, Point, Surface};

use crate::pose::Detection;

// ════════════════════════════════════════════════════════════════════════════
// Screen / Cue / Command
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Menu,
    Game,
}

/// Something worth a sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Pickup,
    DropValid,
    DropInvalid,
    Win,
    Reset,
}

impl From<InteractionEvent> for Cue {
    fn from(event: InteractionEvent) -> Self {
        match event {
            InteractionEvent::Pickup      => Cue::Pickup,
            InteractionEvent::DropValid   => Cue::DropValid,
            InteractionEvent::DropInvalid => Cue::DropInvalid,
            InteractionEvent::Reset       => Cue::Reset,
        }
    }
}

/// A user request from keyboard or menu click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    StartGame,
    Reset,
    MoreDisks,
    FewerDisks,
    /// Leave the game for the menu; from the menu, quit.
    Back,
    Quit,
}

/// Everything the presentation collected since the previous tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputFrame {
    pub commands:   Vec<Command>,
    /// Pointer position in presentation space, `None` when outside.
    pub mouse:      Option<Point>,
    pub mouse_down: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Snapshot
// ════════════════════════════════════════════════════════════════════════════

/// Read-only view of one tick, borrowed from the app state.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<'a> {
    pub screen:        Screen,
    pub towers:        &'a [Vec<Disk>; TOWER_COUNT],
    /// Disk in hand, drawn at `hand_position`.
    pub held:          Option<Disk>,
    pub hand_position: Option<Point>,
    pub zone:          Option<usize>,
    pub indicator:     Indicator,
    pub message:       Option<(&'a str, Duration)>,
    pub moves:         u32,
    pub minimum_moves: u32,
    pub elapsed:       Duration,
    pub won:           bool,
    pub num_disks:     usize,
    /// Latest raw detection for the camera preview, in frame coordinates.
    pub preview:       Option<Detection>,
    /// Preview is drawn flipped when the camera is mirrored.
    pub mirror:        bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Presentation trait
// ════════════════════════════════════════════════════════════════════════════

pub trait Presentation {
    /// Collect input since the last call.  Never blocks.
    fn poll_input(&mut self) -> InputFrame;

    fn render(&mut self, snapshot: &Snapshot<'_>);

    /// Queue a sound; returns immediately.
    fn play(&mut self, cue: Cue);

    /// Current drawing area, in the coordinates of [`InputFrame::mouse`].
    fn surface(&self) -> Surface;

    fn is_open(&self) -> bool;
}

/// `MM:SS` for the HUD.
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
