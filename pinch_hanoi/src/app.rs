//! Top-level application state machine.
//!
//! `AppState` owns the puzzle, the interaction controller, and the current
//! screen.  It turns user commands and hand detections into puzzle changes
//! and sound cues, and hands a [`Snapshot`] to the presentation each tick.

use std::time::Instant;

use anyhow::{bail, Context};
use tracing::{debug, info, trace};

use hanoi_puzzle::{clamp_disks, PuzzleState};
use pinch_control::{InteractionController, Surface};

use crate::config::{AppConfig, SourceKind};
use crate::pose::{spawn_pose_source, Detection, PoseFeed, ProcessPoseSource, SimPoseSource};
use crate::presentation::{Command, Cue, InputFrame, Presentation, Screen, Snapshot};
use crate::sound::SoundPlayer;
use crate::visualizer::Visualizer;

pub const MSG_GAME_STARTED: &str = "Game started! Use pinch gestures to move disks";
pub const MSG_SOLVED:       &str = "Congratulations! You solved the puzzle!";

/// What the loop should do after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(Option<Cue>),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── game ──────────────────────────────────────────────────────────────
    puzzle:     PuzzleState,
    controller: InteractionController,
    screen:     Screen,
    won:        bool,

    // ── camera preview ───────────────────────────────────────────────────
    preview:    Option<Detection>,
    /// Flip detections horizontally before use.
    mirror:     bool,
}

impl AppState {
    pub fn new(cfg: &AppConfig, now: Instant) -> Self {
        AppState {
            puzzle:     PuzzleState::new(clamp_disks(cfg.num_disks)),
            controller: InteractionController::new(cfg.interaction_config(), now),
            screen:     Screen::Menu,
            won:        false,
            preview:    None,
            // Simulated hands are already in window coordinates.
            mirror:     cfg.source.kind == SourceKind::Process && cfg.source.mirror,
        }
    }

    // ── commands ──────────────────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: Command, now: Instant) -> Flow {
        match cmd {
            Command::Quit => Flow::Quit,
            Command::Back => match self.screen {
                Screen::Game => {
                    info!("back to menu");
                    self.screen = Screen::Menu;
                    Flow::Continue(None)
                }
                Screen::Menu => Flow::Quit,
            },
            Command::StartGame => {
                if self.screen != Screen::Menu {
                    return Flow::Continue(None);
                }
                self.screen = Screen::Game;
                let cue = self.restart(self.puzzle.num_disks(), now);
                self.controller.show_message(MSG_GAME_STARTED, now);
                info!(disks = self.puzzle.num_disks(), "game started");
                Flow::Continue(Some(cue))
            }
            Command::Reset => Flow::Continue(Some(self.restart(self.puzzle.num_disks(), now))),
            Command::MoreDisks  => self.change_disks(self.puzzle.num_disks() + 1, now),
            Command::FewerDisks => self.change_disks(self.puzzle.num_disks().saturating_sub(1), now),
        }
    }

    fn change_disks(&mut self, requested: usize, now: Instant) -> Flow {
        let n = clamp_disks(requested);
        if n == self.puzzle.num_disks() {
            return Flow::Continue(None);
        }
        info!(disks = n, "disc count changed");
        Flow::Continue(Some(self.restart(n, now)))
    }

    /// Restack with `num_disks` discs; the clock runs again if a game is on.
    fn restart(&mut self, num_disks: usize, now: Instant) -> Cue {
        let event = self.controller.reset(&mut self.puzzle, num_disks);
        self.won = false;
        if self.screen == Screen::Game {
            self.puzzle.start_timer(now);
        }
        event.into()
    }

    // ── per-tick logic ────────────────────────────────────────────────────

    /// Feed this tick's detection to the controller.
    ///
    /// `None` means the mailbox was empty: the controller is not run, so a
    /// stale sample is never replayed.  Gameplay only advances on the game
    /// screen before the puzzle is solved.
    pub fn tick(&mut self, detection: Option<Detection>, surface: Surface, now: Instant) -> Vec<Cue> {
        let mut cues = Vec::new();
        let Some(detection) = detection else { return cues };
        self.preview = Some(detection);

        if self.screen != Screen::Game || self.won {
            return cues;
        }

        let sample = detection.hand.map(|h| h.to_surface(detection.frame, surface, self.mirror));
        if let Some(event) = self.controller.update(&mut self.puzzle, sample, surface, now) {
            trace!(?event, "interaction event");
            cues.push(event.into());
        }

        if self.puzzle.check_win() {
            self.won = true;
            self.puzzle.stop_timer(now);
            self.controller.show_message(MSG_SOLVED, now);
            info!(
                moves   = self.puzzle.move_count(),
                minimum = self.puzzle.minimum_moves(),
                secs    = self.puzzle.elapsed(now).as_secs_f32(),
                "puzzle solved",
            );
            cues.push(Cue::Win);
        }
        cues
    }

    pub fn snapshot(&self, now: Instant) -> Snapshot<'_> {
        let fb = self.controller.feedback(now);
        Snapshot {
            screen:        self.screen,
            towers:        self.puzzle.towers(),
            held:          self.puzzle.held().map(|h| h.disk),
            hand_position: fb.hand_position,
            zone:          fb.zone,
            indicator:     fb.indicator,
            message:       fb.message,
            moves:         self.puzzle.move_count(),
            minimum_moves: self.puzzle.minimum_moves(),
            elapsed:       self.puzzle.elapsed(now),
            won:           self.won,
            num_disks:     self.puzzle.num_disks(),
            preview:       self.preview,
            mirror:        self.mirror,
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn screen(&self)     -> Screen                 { self.screen }
    pub fn is_won(&self)     -> bool                   { self.won }
    pub fn puzzle(&self)     -> &PuzzleState           { &self.puzzle }
    pub fn controller(&self) -> &InteractionController { &self.controller }
}

// ════════════════════════════════════════════════════════════════════════════
// HandFeed — where each tick's detection comes from
// ════════════════════════════════════════════════════════════════════════════

pub enum HandFeed {
    /// Mouse simulation, evaluated on the loop thread.
    Sim(SimPoseSource),
    /// Detector thread behind a single-slot mailbox.
    Detector(PoseFeed),
}

impl HandFeed {
    fn next(&self, input: &InputFrame, surface: Surface) -> anyhow::Result<Option<Detection>> {
        match self {
            HandFeed::Sim(sim) => Ok(Some(sim.detect(input.mouse, input.mouse_down, surface))),
            HandFeed::Detector(feed) => {
                let latest = feed.take();
                if latest.is_none() && !feed.is_alive() {
                    bail!("hand detector stopped");
                }
                Ok(latest)
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Main loop
// ════════════════════════════════════════════════════════════════════════════

/// Run ticks until the presentation closes or a quit command arrives.
///
/// `clock` is read at the start of each tick and again for rendering.
/// Pacing is left to the presentation (the window caps its frame rate).
pub fn drive<P, C>(
    app:          &mut AppState,
    presentation: &mut P,
    hands:        &HandFeed,
    mut clock:    C,
) -> anyhow::Result<()>
where
    P: Presentation,
    C: FnMut() -> Instant,
{
    while presentation.is_open() {
        let started = clock();

        // 1. Commands
        let input = presentation.poll_input();
        for &cmd in &input.commands {
            debug!(?cmd, "command");
            match app.handle_command(cmd, started) {
                Flow::Quit => return Ok(()),
                Flow::Continue(Some(cue)) => presentation.play(cue),
                Flow::Continue(None) => {}
            }
        }

        // 2. Hand
        let surface = presentation.surface();
        let detection = hands.next(&input, surface)?;
        for cue in app.tick(detection, surface, started) {
            presentation.play(cue);
        }

        // 3. Render
        presentation.render(&app.snapshot(clock()));
    }
    Ok(())
}

/// Open the window, start the hand source, and play until closed.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let hands = match cfg.source.kind {
        SourceKind::Sim => HandFeed::Sim(SimPoseSource::for_threshold(cfg.interaction.pinch_threshold)),
        SourceKind::Process => {
            let source = ProcessPoseSource::spawn(&cfg.source.command, cfg.source.min_confidence)
                .context("starting hand detector")?;
            HandFeed::Detector(spawn_pose_source(source))
        }
    };

    let sound = SoundPlayer::spawn(&cfg.sound);
    let mut vis = Visualizer::new(&cfg, sound).context("opening game window")?;
    let mut app = AppState::new(&cfg, Instant::now());
    info!(source = ?cfg.source.kind, disks = app.puzzle().num_disks(), "ready");

    drive(&mut app, &mut vis, &hands, Instant::now)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
