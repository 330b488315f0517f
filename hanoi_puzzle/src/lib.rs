//! # hanoi_puzzle
//!
//! The Tower of Hanoi as a plain data model: three towers of ranked disks,
//! one disk "in hand" at a time, and a move counter / timer.
//!
//! The model knows nothing about gestures or rendering.  It only guarantees
//! two things, whatever sequence of calls it receives:
//!
//! * **Conservation** — every disk is on exactly one tower or in hand.
//! * **Ordering** — a tower's ranks strictly decrease from bottom to top.
//!
//! An invalid placement does not fail "loudly": the held disk goes straight
//! back to the tower it came from, so a disk can never be lost.
//!
//! ## Quick start
//!
//! ```rust
//! use hanoi_puzzle::{Placement, PuzzleState};
//!
//! let mut p = PuzzleState::new(3);            // [[3, 2, 1], [], []]
//! assert_eq!(p.pickup(0).unwrap(), 1);
//! assert_eq!(p.place(2).unwrap(), Placement::Valid);
//! assert_eq!(p.towers()[2], vec![1]);
//! assert_eq!(p.move_count(), 1);
//! ```

use std::time::{Duration, Instant};

use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// A disk is identified by its size rank; 1 is the smallest.
pub type Disk = u8;

/// Number of towers (pegs).
pub const TOWER_COUNT: usize = 3;

/// The puzzle is solved when every disk sits on this tower.
pub const GOAL_TOWER: usize = 2;

pub const MIN_DISKS:     usize = 2;
pub const MAX_DISKS:     usize = 5;
pub const DEFAULT_DISKS: usize = 3;

/// Clamp a requested disk count into `MIN_DISKS..=MAX_DISKS`.
pub fn clamp_disks(n: usize) -> usize {
    n.clamp(MIN_DISKS, MAX_DISKS)
}

// ════════════════════════════════════════════════════════════════════════════
// Outcomes
// ════════════════════════════════════════════════════════════════════════════

/// Reasons a model operation did nothing.
///
/// None of these are fatal; callers treat them as "no state change".
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("tower {0} is empty")]
    EmptyTower(usize),

    #[error("disc {0} is already in hand")]
    AlreadyHolding(Disk),

    #[error("no disc is in hand")]
    NothingHeld,

    #[error("tower index {0} is out of range")]
    NoSuchTower(usize),
}

/// Result of placing the held disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The disk now sits on the target tower; the move was counted.
    Valid,
    /// The target's top disk was smaller; the disk went back to its source.
    Invalid,
}

/// The disk currently in hand and the tower it was lifted from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Held {
    pub disk:   Disk,
    pub source: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// GameTimer
// ════════════════════════════════════════════════════════════════════════════

/// Wall-clock timer for a single game; frozen once the game is won.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameTimer {
    started: Option<Instant>,
    frozen:  Option<Duration>,
}

impl GameTimer {
    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.frozen  = None;
    }

    pub fn stop(&mut self, now: Instant) {
        if self.frozen.is_none() {
            self.frozen = Some(self.elapsed(now));
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.frozen.is_none()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.frozen, self.started) {
            (Some(d), _)          => d,
            (None, Some(started)) => now.saturating_duration_since(started),
            (None, None)          => Duration::ZERO,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PuzzleState
// ════════════════════════════════════════════════════════════════════════════

/// Three towers, an optional disk in hand, and the game counters.
#[derive(Clone, Debug)]
pub struct PuzzleState {
    towers:    [Vec<Disk>; TOWER_COUNT],
    held:      Option<Held>,
    num_disks: usize,
    moves:     u32,
    timer:     GameTimer,
}

impl PuzzleState {
    /// A fresh puzzle with `num_disks` disks stacked on tower 0.
    ///
    /// Out-of-range counts are clamped (see [`clamp_disks`]).
    pub fn new(num_disks: usize) -> Self {
        let mut p = PuzzleState {
            towers:    Default::default(),
            held:      None,
            num_disks,
            moves:     0,
            timer:     GameTimer::default(),
        };
        p.reset(num_disks);
        p
    }

    /// Restack every disk on tower 0 (largest at the bottom) and clear the
    /// move counter, the timer and the hand.  `num_disks` is clamped into
    /// `MIN_DISKS..=MAX_DISKS`.
    pub fn reset(&mut self, num_disks: usize) {
        let num_disks = clamp_disks(num_disks);
        self.num_disks = num_disks;
        for t in &mut self.towers {
            t.clear();
        }
        self.towers[0].extend((1..=num_disks as Disk).rev());
        self.held  = None;
        self.moves = 0;
        self.timer = GameTimer::default();
    }

    // ── mutation ──────────────────────────────────────────────────────────

    /// Lift the top disk of `tower` into hand.
    pub fn pickup(&mut self, tower: usize) -> Result<Disk, PuzzleError> {
        check_index(tower)?;
        if let Some(h) = self.held {
            return Err(PuzzleError::AlreadyHolding(h.disk));
        }
        let disk = self.towers[tower].pop().ok_or(PuzzleError::EmptyTower(tower))?;
        self.held = Some(Held { disk, source: tower });
        Ok(disk)
    }

    /// Put the held disk on `tower`.
    ///
    /// On an illegal target the disk is pushed back onto its source tower
    /// and [`Placement::Invalid`] is returned; the hand is empty either way.
    pub fn place(&mut self, tower: usize) -> Result<Placement, PuzzleError> {
        check_index(tower)?;
        let Held { disk, source } = self.held.take().ok_or(PuzzleError::NothingHeld)?;

        let fits = self.towers[tower].last().map_or(true, |&top| disk < top);
        if fits {
            self.towers[tower].push(disk);
            self.moves += 1;
            Ok(Placement::Valid)
        } else {
            self.towers[source].push(disk);
            Ok(Placement::Invalid)
        }
    }

    /// Put the held disk back on its source tower without any rule check.
    ///
    /// The disk was that tower's top a moment ago, so ordering still holds.
    pub fn return_held(&mut self) -> Option<Held> {
        let held = self.held.take()?;
        self.towers[held.source].push(held.disk);
        Some(held)
    }

    // ── timer ─────────────────────────────────────────────────────────────

    pub fn start_timer(&mut self, now: Instant) { self.timer.start(now); }
    pub fn stop_timer(&mut self, now: Instant)  { self.timer.stop(now);  }
    pub fn elapsed(&self, now: Instant) -> Duration { self.timer.elapsed(now) }
    pub fn timer(&self) -> &GameTimer { &self.timer }

    // ── queries ───────────────────────────────────────────────────────────

    /// True iff every disk is on [`GOAL_TOWER`].
    pub fn check_win(&self) -> bool {
        self.towers[GOAL_TOWER].len() == self.num_disks
    }

    /// Would moving the top of `from` onto `to` be legal right now?
    pub fn is_valid_move(&self, from: usize, to: usize) -> bool {
        if from >= TOWER_COUNT || to >= TOWER_COUNT {
            return false;
        }
        match (self.towers[from].last(), self.towers[to].last()) {
            (None, _)               => false,
            (Some(_), None)         => true,
            (Some(&d), Some(&top))  => d < top,
        }
    }

    pub fn towers(&self)    -> &[Vec<Disk>; TOWER_COUNT] { &self.towers }
    pub fn held(&self)      -> Option<Held>              { self.held }
    pub fn num_disks(&self) -> usize                     { self.num_disks }
    pub fn move_count(&self) -> u32                      { self.moves }

    /// Disks on `tower`, bottom first.  Out-of-range indices read as empty.
    pub fn tower(&self, tower: usize) -> &[Disk] {
        self.towers.get(tower).map_or(&[], |t| t.as_slice())
    }

    /// Fewest moves that can solve this puzzle: 2ⁿ − 1.
    pub fn minimum_moves(&self) -> u32 {
        minimum_moves(self.num_disks)
    }

    /// Disks on towers plus the one in hand.
    pub fn disk_total(&self) -> usize {
        self.towers.iter().map(Vec::len).sum::<usize>() + usize::from(self.held.is_some())
    }

    /// True iff every tower is strictly decreasing bottom to top.
    pub fn is_ordered(&self) -> bool {
        self.towers.iter().all(|t| t.windows(2).all(|w| w[0] > w[1]))
    }
}

impl Default for PuzzleState {
    fn default() -> Self { PuzzleState::new(DEFAULT_DISKS) }
}

fn check_index(tower: usize) -> Result<(), PuzzleError> {
    if tower < TOWER_COUNT { Ok(()) } else { Err(PuzzleError::NoSuchTower(tower)) }
}

// ════════════════════════════════════════════════════════════════════════════
// Solutions
// ════════════════════════════════════════════════════════════════════════════

/// 2ⁿ − 1.
pub fn minimum_moves(num_disks: usize) -> u32 {
    (1u32 << num_disks.min(31)) - 1
}

/// The optimal move list `(from, to)` taking `num_disks` from tower 0 to
/// [`GOAL_TOWER`].
pub fn optimal_moves(num_disks: usize) -> Vec<(usize, usize)> {
    fn solve(n: usize, from: usize, via: usize, to: usize, out: &mut Vec<(usize, usize)>) {
        if n == 0 { return; }
        solve(n - 1, from, to, via, out);
        out.push((from, to));
        solve(n - 1, via, from, to, out);
    }
    let mut out = Vec::with_capacity(minimum_moves(num_disks) as usize);
    solve(num_disks, 0, 1, GOAL_TOWER, &mut out);
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
