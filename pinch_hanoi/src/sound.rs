//! Sound-cue playback thread.
//!
//! Each [`Cue`] maps to a short note pattern sent to a MIDI output port.
//! The game loop only ever pushes onto a channel; timing happens here.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::SoundConfig;
use crate::presentation::Cue;

const CHANNEL: u8 = 0;

// ════════════════════════════════════════════════════════════════════════════
// SoundCommand — sent to the playback thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCommand {
    Play(Cue),
    /// Terminate the thread.
    Quit,
}

/// Notes and their lengths in milliseconds.
pub fn cue_pattern(cue: Cue) -> &'static [(u8, u64)] {
    match cue {
        Cue::Pickup      => &[(72, 60)],
        Cue::DropValid   => &[(67, 60), (72, 90)],
        Cue::DropInvalid => &[(48, 120), (47, 160)],
        Cue::Win         => &[(60, 110), (64, 110), (67, 110), (72, 260)],
        Cue::Reset       => &[(72, 50), (67, 50), (60, 80)],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self,  channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

// ── null backend (no port, or sound disabled) ─────────────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)   {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8)  {}
    fn note_off(&mut self, _ch: u8, _n: u8)          {}
}

/// Open the first available MIDI output, preferring a softsynth.
/// Falls back to `NullOut` with a warning if none found.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("pinch_hanoi") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed, sound cues muted");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found, sound cues muted \
               (try `timidity -iA` or `fluidsynth` on Linux)");
        return Box::new(NullOut);
    }

    let port_idx = ports.iter()
        .position(|p| {
            midi_out.port_name(p).map(|n| {
                let n = n.to_lowercase();
                n.contains("fluid") || n.contains("timidity") ||
                n.contains("microsoft") || n.contains("synth")
            }).unwrap_or(false)
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port");

    match midi_out.connect(port, "pinch-hanoi-cues") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            warn!(error = %e, "MIDI connect failed, sound cues muted");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SoundPlayer — handle to the playback thread
// ════════════════════════════════════════════════════════════════════════════

pub struct SoundPlayer {
    cmd_tx: Option<Sender<SoundCommand>>,
}

impl SoundPlayer {
    /// Spawn the playback thread, or a silent player when sound is off.
    pub fn spawn(cfg: &SoundConfig) -> Self {
        if !cfg.enabled {
            return SoundPlayer::disabled();
        }
        let (cmd_tx, cmd_rx) = mpsc::channel::<SoundCommand>();
        let (program, velocity) = (cfg.program, cfg.velocity);
        thread::spawn(move || {
            let midi = open_midi_output();
            player_thread(midi, program, velocity, cmd_rx);
        });
        SoundPlayer { cmd_tx: Some(cmd_tx) }
    }

    pub fn disabled() -> Self {
        SoundPlayer { cmd_tx: None }
    }

    pub fn is_enabled(&self) -> bool { self.cmd_tx.is_some() }

    pub fn play(&self, cue: Cue) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(SoundCommand::Play(cue));
        }
    }
}

impl Drop for SoundPlayer {
    fn drop(&mut self) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(SoundCommand::Quit);
        }
    }
}

fn player_thread(
    mut midi:  Box<dyn MidiOut>,
    program:   u8,
    velocity:  u8,
    cmd_rx:    Receiver<SoundCommand>,
) {
    midi.program_change(CHANNEL, program);

    // A closed channel also ends the thread.
    while let Ok(SoundCommand::Play(cue)) = cmd_rx.recv() {
        // Cues queued while a pattern played are stale; keep the newest.
        let mut cue = cue;
        let mut quit = false;
        while let Ok(next) = cmd_rx.try_recv() {
            match next {
                SoundCommand::Play(c) => cue = c,
                SoundCommand::Quit    => { quit = true; break; }
            }
        }
        if quit { break; }

        debug!(?cue, "playing cue");
        play_pattern(midi.as_mut(), cue_pattern(cue), velocity);
    }
}

fn play_pattern(midi: &mut dyn MidiOut, pattern: &[(u8, u64)], velocity: u8) {
    for &(note, ms) in pattern {
        midi.note_on(CHANNEL, note, velocity);
        thread::sleep(Duration::from_millis(ms));
        midi.note_off(CHANNEL, note);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
