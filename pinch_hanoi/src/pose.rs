//! Hand landmark sources — an external detector process or mouse simulation.
//!
//! The tick loop never waits on detection.  A real detector runs on its own
//! thread and drops each result into a single-slot mailbox ([`PoseFeed`]);
//! a newer detection overwrites an unread older one, and the loop takes
//! whatever is there once per tick.
//!
//! ## Detector line protocol
//!
//! The `process` source runs a command whose stdout carries one JSON object
//! per analysed camera frame, in frame-pixel coordinates:
//!
//! ```json
//! {"width": 640, "height": 480,
//!  "hands": [{"score": 0.93, "index_tip": [312, 220],
//!             "thumb_tip": [298, 251], "wrist": [280, 400]}]}
//! ```
//!
//! An empty `hands` list means no hand.  A line may carry `"error": "…"`
//! instead, which is logged and treated as no hand.  A bare `READY` line is
//! ignored.

use std::io::{self, BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use pinch_control::{HandSample, Point, Surface};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

// ════════════════════════════════════════════════════════════════════════════
// Detection
// ════════════════════════════════════════════════════════════════════════════

/// One analysed frame: its size and at most one hand, in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub frame: Surface,
    pub hand:  Option<HandSample>,
}

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("detector command is empty")]
    EmptyCommand,

    #[error("failed to start hand detector `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source:  io::Error,
    },

    #[error("hand detector exited")]
    Exited,

    #[error("reading from hand detector: {0}")]
    Io(#[from] io::Error),

    #[error("malformed detector line: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("detector reported an unusable {0}×{1} frame")]
    BadFrame(f32, f32),
}

impl PoseError {
    /// A single bad line; the detector itself is still usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PoseError::Malformed(_) | PoseError::BadFrame(..))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandPoseSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can analyse the next camera frame.
pub trait HandPoseSource: Send + 'static {
    /// Block until the next frame has been analysed.
    fn detect(&mut self) -> Result<Detection, PoseError>;
}

// ════════════════════════════════════════════════════════════════════════════
// PoseFeed — single-slot mailbox + worker thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct Slot {
    latest: Mutex<Option<Detection>>,
}

impl Slot {
    fn post(&self, detection: Detection) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if latest.replace(detection).is_some() {
            trace!("unread detection overwritten");
        }
    }

    fn take(&self) -> Option<Detection> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// Receiving end of a detector running on its own thread.
pub struct PoseFeed {
    slot:   Arc<Slot>,
    worker: JoinHandle<()>,
}

impl PoseFeed {
    /// The newest detection since the last call, if any.  Never blocks.
    pub fn take(&self) -> Option<Detection> {
        self.slot.take()
    }

    /// False once the detector thread has stopped.
    pub fn is_alive(&self) -> bool {
        !self.worker.is_finished()
    }
}

/// Run `source` on its own thread, publishing into a fresh mailbox.
///
/// The worker exits when the source fails unrecoverably or when the
/// returned [`PoseFeed`] is dropped.
pub fn spawn_pose_source<S: HandPoseSource>(source: S) -> PoseFeed {
    let slot = Arc::new(Slot::default());
    let weak = Arc::downgrade(&slot);
    let worker = thread::spawn(move || pose_worker(source, weak));
    PoseFeed { slot, worker }
}

fn pose_worker<S: HandPoseSource>(mut source: S, slot: Weak<Slot>) {
    loop {
        let detection = match source.detect() {
            Ok(d) => d,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "skipping detector line");
                continue;
            }
            Err(e) => {
                error!(error = %e, "hand detector stopped");
                return;
            }
        };
        match slot.upgrade() {
            Some(slot) => slot.post(detection),
            None => {
                debug!("pose feed dropped, detector thread exiting");
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ProcessPoseSource — external detector over stdout
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct FrameLine {
    width:  f32,
    height: f32,
    #[serde(default)]
    hands:  Vec<HandLine>,
    #[serde(default)]
    error:  Option<String>,
}

#[derive(Deserialize, Debug)]
struct HandLine {
    #[serde(default = "full_confidence")]
    score:     f32,
    index_tip: [f32; 2],
    thumb_tip: [f32; 2],
    wrist:     [f32; 2],
}

fn full_confidence() -> f32 { 1.0 }

fn point([x, y]: [f32; 2]) -> Point { Point::new(x, y) }

/// Parse one detector line, keeping the first hand scored at least
/// `min_confidence`.
pub fn parse_detection(line: &str, min_confidence: f32) -> Result<Detection, PoseError> {
    let parsed: FrameLine = serde_json::from_str(line)?;
    if !(parsed.width > 0.0 && parsed.height > 0.0) {
        return Err(PoseError::BadFrame(parsed.width, parsed.height));
    }
    let frame = Surface::new(parsed.width, parsed.height);

    if let Some(err) = parsed.error {
        warn!(detector_error = %err, "detector reported an error");
        return Ok(Detection { frame, hand: None });
    }

    let hand = parsed.hands.iter()
        .find(|h| h.score >= min_confidence)
        .map(|h| HandSample::new(point(h.index_tip), point(h.thumb_tip), point(h.wrist)));
    Ok(Detection { frame, hand })
}

/// Hand source backed by an external detector program.
pub struct ProcessPoseSource {
    child:          Child,
    stdout:         BufReader<ChildStdout>,
    min_confidence: f32,
    line:           String,
}

impl ProcessPoseSource {
    /// Start `command[0]` with the remaining elements as arguments.
    pub fn spawn(command: &[String], min_confidence: f32) -> Result<Self, PoseError> {
        let (program, args) = command.split_first().ok_or(PoseError::EmptyCommand)?;
        info!(command = %command.join(" "), "starting hand detector");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| PoseError::Spawn { command: command.join(" "), source })?;

        let stdout = child.stdout.take().ok_or(PoseError::Exited)?;
        Ok(ProcessPoseSource {
            child,
            stdout: BufReader::new(stdout),
            min_confidence,
            line: String::new(),
        })
    }
}

impl HandPoseSource for ProcessPoseSource {
    fn detect(&mut self) -> Result<Detection, PoseError> {
        loop {
            self.line.clear();
            if self.stdout.read_line(&mut self.line)? == 0 {
                return Err(PoseError::Exited);
            }
            let line = self.line.trim();
            if line.is_empty() || line == "READY" {
                continue;
            }
            return parse_detection(line, self.min_confidence);
        }
    }
}

impl Drop for ProcessPoseSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimPoseSource — mouse simulation
// ════════════════════════════════════════════════════════════════════════════

/// Builds a synthetic hand from the mouse: the pointer is the pinch point,
/// the left button closes the fingers.
///
/// Runs on the tick thread, since the mouse is read from the window there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimPoseSource {
    pub pinch_gap: f32,
    pub open_gap:  f32,
}

impl SimPoseSource {
    /// Finger gaps placed well either side of `pinch_threshold`.
    pub fn for_threshold(pinch_threshold: f32) -> Self {
        SimPoseSource {
            pinch_gap: pinch_threshold * 0.2,
            open_gap:  pinch_threshold * 1.8,
        }
    }

    /// Detection for this tick; a pointer outside the window is "no hand".
    pub fn detect(&self, mouse: Option<Point>, pressed: bool, surface: Surface) -> Detection {
        let gap = if pressed { self.pinch_gap } else { self.open_gap };
        Detection {
            frame: surface,
            hand:  mouse.map(|at| HandSample::pinched_at(at, gap)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    const LINE: &str = r#"{"width":640,"height":480,"hands":[
        {"score":0.3,"index_tip":[1,1],"thumb_tip":[2,2],"wrist":[3,3]},
        {"score":0.9,"index_tip":[312,220],"thumb_tip":[298,251],"wrist":[280,400]}]}"#;

    #[test]
    fn parse_picks_first_confident_hand() {
        let d = parse_detection(LINE, 0.5).unwrap();
        assert_eq!(d.frame, Surface::new(640.0, 480.0));
        let h = d.hand.unwrap();
        assert_eq!(h.index_tip, Point::new(312.0, 220.0));
        assert_eq!(h.thumb_tip, Point::new(298.0, 251.0));
        assert_eq!(h.wrist,     Point::new(280.0, 400.0));
    }

    #[test]
    fn parse_low_threshold_takes_first_hand() {
        let d = parse_detection(LINE, 0.1).unwrap();
        assert_eq!(d.hand.unwrap().index_tip, Point::new(1.0, 1.0));
    }

    #[test]
    fn parse_no_hands() {
        let d = parse_detection(r#"{"width":640,"height":480,"hands":[]}"#, 0.5).unwrap();
        assert_eq!(d.hand, None);
        let d = parse_detection(r#"{"width":640,"height":480}"#, 0.5).unwrap();
        assert_eq!(d.hand, None);
    }

    #[test]
    fn parse_error_line_is_no_hand() {
        let d = parse_detection(r#"{"width":640,"height":480,"error":"camera busy"}"#, 0.5).unwrap();
        assert_eq!(d.hand, None);
    }

    #[test]
    fn parse_rejects_garbage_and_empty_frames() {
        let e = parse_detection("not json", 0.5).unwrap_err();
        assert!(matches!(e, PoseError::Malformed(_)));
        assert!(e.is_recoverable());

        let e = parse_detection(r#"{"width":0,"height":480}"#, 0.5).unwrap_err();
        assert!(matches!(e, PoseError::BadFrame(..)));
        assert!(!PoseError::Exited.is_recoverable());
    }

    #[test]
    fn slot_keeps_only_newest() {
        let slot = Slot::default();
        let frame = Surface::new(10.0, 10.0);
        assert_eq!(slot.take(), None);
        slot.post(Detection { frame, hand: None });
        let newest = Detection {
            frame,
            hand: Some(HandSample::pinched_at(Point::new(5.0, 5.0), 1.0)),
        };
        slot.post(newest);
        assert_eq!(slot.take(), Some(newest));
        // Consumed: never handed out twice.
        assert_eq!(slot.take(), None);
    }

    /// Replays a fixed list, then reports the detector as gone.
    struct Scripted(VecDeque<Result<Detection, PoseError>>);

    impl HandPoseSource for Scripted {
        fn detect(&mut self) -> Result<Detection, PoseError> {
            self.0.pop_front().unwrap_or(Err(PoseError::Exited))
        }
    }

    #[test]
    fn worker_publishes_then_stops() {
        let frame = Surface::new(640.0, 480.0);
        let last = Detection {
            frame,
            hand: Some(HandSample::pinched_at(Point::new(1.0, 2.0), 3.0)),
        };
        let script = VecDeque::from(vec![
            Ok(Detection { frame, hand: None }),
            Err(PoseError::BadFrame(0.0, 0.0)),
            Ok(last),
        ]);
        let feed = spawn_pose_source(Scripted(script));

        let deadline = Instant::now() + Duration::from_secs(5);
        while feed.is_alive() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!feed.is_alive());
        assert_eq!(feed.take(), Some(last));
        assert_eq!(feed.take(), None);
    }

    #[test]
    fn spawn_missing_program_fails() {
        let cmd = vec!["definitely-not-a-hand-detector-7f3a".to_string()];
        assert!(matches!(
            ProcessPoseSource::spawn(&cmd, 0.5),
            Err(PoseError::Spawn { .. })
        ));
        assert!(matches!(ProcessPoseSource::spawn(&[], 0.5), Err(PoseError::EmptyCommand)));
    }

    #[test]
    fn sim_source_gaps_straddle_threshold() {
        let sim = SimPoseSource::for_threshold(50.0);
        let surface = Surface::new(800.0, 600.0);
        let at = Some(Point::new(100.0, 100.0));

        let closed = sim.detect(at, true, surface).hand.unwrap();
        let open   = sim.detect(at, false, surface).hand.unwrap();
        assert!(closed.pinch_distance() < 50.0);
        assert!(open.pinch_distance() >= 50.0);
        assert_eq!(closed.centroid(), Point::new(100.0, 100.0));
        assert_eq!(sim.detect(None, true, surface).hand, None);
    }
}
