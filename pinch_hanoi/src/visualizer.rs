//! Software-rendered board using `minifb`.
//!
//! Layout (game screen):
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │ TIME 00:42                                    MOVES 5   MIN 7      │
//! │                 [ message banner, while shown ]                    │
//! │                                                                    │
//! │        ┃                     ┃                     ┃               │
//! │      ▄▄█▄▄                   ┃                  (o) ← hand ring    │
//! │    ▄▄▄▄█▄▄▄▄                 ┃                     ┃               │
//! │  ══════╩══════         ══════╩══════         ══════╩══════   ┌────┐│
//! │        1                     2                     3         │cam ││
//! └──────────────────────────────────────────────────────────────┴────┴┘
//! ```
//!
//! All geometry is derived from the current window size, scaled from a
//! 1280×720 reference, and is laid out again when the window is resized.
//! Drawing goes to a [`Canvas`] that has no window attached, so
//! the painters can be exercised headless.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use thiserror::Error;
use tracing::{debug, info, warn};

use hanoi_puzzle::{Disk, TOWER_COUNT};
use pinch_control::{Point, Surface};

use crate::config::AppConfig;
use crate::pose::Detection;
use crate::presentation::{
    format_clock, Command, Cue, InputFrame, Presentation, Screen, Snapshot,
};
use crate::sound::SoundPlayer;
use crate::theme::{blend, indicator_color, Theme};

const REF_W: f32 = 1280.0;
const REF_H: f32 = 720.0;

/// Fade-out window at the end of a message's display time.
const MESSAGE_FADE_SECS: f32 = 0.4;

#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("failed to open window: {0}")]
    Window(#[from] minifb::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// Rect
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Rect { x: cx - w / 2.0, y: cy - h / 2.0, w, h }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

fn scale_for(surface: Surface) -> f32 {
    (surface.width / REF_W).min(surface.height / REF_H)
}

// ════════════════════════════════════════════════════════════════════════════
// BoardLayout — towers and discs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardLayout {
    surface:    Surface,
    scale:      f32,
    num_disks:  usize,
    pub base_y: f32,
    pole_h:     f32,
    pole_w:     f32,
    pub disk_h: f32,
    min_disk_w: f32,
    max_disk_w: f32,
}

impl BoardLayout {
    pub fn new(surface: Surface, num_disks: usize) -> Self {
        let scale  = scale_for(surface);
        let zone_w = surface.width / TOWER_COUNT as f32;
        let pole_h = 300.0 * scale;
        BoardLayout {
            surface,
            scale,
            num_disks,
            base_y:     surface.height * 0.76,
            pole_h,
            pole_w:     (15.0 * scale).max(3.0),
            disk_h:     (40.0 * scale).min(pole_h / (num_disks as f32 + 1.0)),
            min_disk_w: zone_w * 0.30,
            max_disk_w: zone_w * 0.85,
        }
    }

    /// Width grows linearly with rank; the largest disc nearly fills its zone.
    pub fn disk_width(&self, disk: Disk) -> f32 {
        let span = self.num_disks.max(2) as f32 - 1.0;
        let t = ((disk as f32 - 1.0) / span).clamp(0.0, 1.0);
        self.min_disk_w + (self.max_disk_w - self.min_disk_w) * t
    }

    /// Disc resting at `level` (0 = bottom) on `tower`.
    pub fn disk_rect(&self, tower: usize, level: usize, disk: Disk) -> Rect {
        let cy = self.base_y - (level as f32 + 0.5) * self.disk_h;
        Rect::centered(self.surface.zone_center(tower), cy, self.disk_width(disk), self.disk_h)
    }

    /// Disc carried by the hand.
    pub fn held_rect(&self, at: Point, disk: Disk) -> Rect {
        Rect::centered(at.x, at.y, self.disk_width(disk), self.disk_h)
    }

    pub fn pole_rect(&self, tower: usize) -> Rect {
        let cx = self.surface.zone_center(tower);
        Rect { x: cx - self.pole_w / 2.0, y: self.base_y - self.pole_h, w: self.pole_w, h: self.pole_h }
    }

    pub fn base_rect(&self, tower: usize) -> Rect {
        let cx = self.surface.zone_center(tower);
        let w  = self.max_disk_w + 20.0 * self.scale;
        Rect { x: cx - w / 2.0, y: self.base_y, w, h: (15.0 * self.scale).max(3.0) }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MenuLayout — clickable regions of the menu screen
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuLayout {
    pub fewer:   Rect,
    pub more:    Rect,
    pub play:    Rect,
    pub preview: Rect,
}

impl MenuLayout {
    pub fn new(surface: Surface) -> Self {
        let s  = scale_for(surface);
        let cx = surface.width / 2.0;
        let selector_y = surface.height * 0.56;
        MenuLayout {
            fewer:   Rect::centered(cx - 170.0 * s, selector_y, 56.0 * s, 56.0 * s),
            more:    Rect::centered(cx + 170.0 * s, selector_y, 56.0 * s, 56.0 * s),
            play:    Rect::centered(cx, surface.height * 0.74, 260.0 * s, 76.0 * s),
            preview: preview_rect(surface),
        }
    }

    /// Command for a click at `p`, if it landed on a control.
    pub fn hit(&self, p: Point) -> Option<Command> {
        if self.play.contains(p) {
            Some(Command::StartGame)
        } else if self.fewer.contains(p) {
            Some(Command::FewerDisks)
        } else if self.more.contains(p) {
            Some(Command::MoreDisks)
        } else {
            None
        }
    }
}

fn preview_rect(surface: Surface) -> Rect {
    let s = scale_for(surface);
    let (w, h) = (208.0 * s, 156.0 * s);
    Rect { x: surface.width - w - 16.0 * s, y: surface.height - h - 16.0 * s, w, h }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — pixel buffer and drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf: Vec<u32>,
    width:   usize,
    height:  usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![0xFF000000; width * height], width, height }
    }

    pub fn surface(&self) -> Surface {
        Surface::new(self.width as f32, self.height as f32)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    fn span(lo: f32, hi: f32, limit: usize) -> (usize, usize) {
        let a = (lo.round().max(0.0) as usize).min(limit);
        let b = (hi.round().max(0.0) as usize).min(limit);
        (a, b.max(a))
    }

    fn fill_rect(&mut self, r: Rect, color: u32) {
        let (x0, x1) = Self::span(r.x, r.x + r.w, self.width);
        let (y0, y1) = Self::span(r.y, r.y + r.h, self.height);
        for row in y0..y1 {
            self.buf[row * self.width + x0..row * self.width + x1].fill(color);
        }
    }

    fn draw_border(&mut self, r: Rect, t: f32, color: u32) {
        self.fill_rect(Rect { h: t, ..r }, color);
        self.fill_rect(Rect { y: r.y + r.h - t, h: t, ..r }, color);
        self.fill_rect(Rect { w: t, ..r }, color);
        self.fill_rect(Rect { x: r.x + r.w - t, w: t, ..r }, color);
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    /// Annulus between `r - t` and `r`; `t >= r` fills the disc.
    fn draw_ring(&mut self, c: Point, r: f32, t: f32, color: u32) {
        let inner = (r - t).max(0.0);
        let (x0, x1) = ((c.x - r).floor() as isize, (c.x + r).ceil() as isize);
        let (y0, y1) = ((c.y - r).floor() as isize, (c.y + r).ceil() as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Point::new(x as f32, y as f32).distance(c);
                if d <= r && d >= inner {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    fn fill_circle(&mut self, c: Point, r: f32, color: u32) {
        self.draw_ring(c, r, r, color);
    }

    fn draw_line(&mut self, a: Point, b: Point, color: u32) {
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            self.set_pixel(x.round() as isize, y.round() as isize, color);
        }
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x.round() as isize;
        let y = y.round() as isize;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for dy in 0..scale {
                            for dx in 0..scale {
                                self.set_pixel(
                                    cx + (col * scale + dx) as isize,
                                    y + (row * scale + dy) as isize,
                                    color,
                                );
                            }
                        }
                    }
                }
            }
            cx += 4 * scale as isize; // 3 wide + 1 gap
        }
    }

    fn draw_text_centered(&mut self, text: &str, cx: f32, y: f32, scale: usize, color: u32) {
        let w = text_width(text, scale) as f32;
        self.draw_text(text, cx - w / 2.0, y, scale, color);
    }
}

pub fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    (n * 4).saturating_sub(1) * scale.max(1)
}

/// Integer font scale for a reference size at the current window scale.
fn font_scale(s: f32, reference: f32) -> usize {
    (reference * s).round().max(1.0) as usize
}

// ════════════════════════════════════════════════════════════════════════════
// Painters
// ════════════════════════════════════════════════════════════════════════════

/// Draw one full frame into `canvas`.
pub fn paint(canvas: &mut Canvas, theme: &Theme, snap: &Snapshot<'_>) {
    canvas.clear(theme.background);
    paint_grid(canvas, theme);
    match snap.screen {
        Screen::Menu => paint_menu(canvas, theme, snap),
        Screen::Game => paint_game(canvas, theme, snap),
    }
}

fn paint_grid(canvas: &mut Canvas, theme: &Theme) {
    let surface = canvas.surface();
    let step = (40.0 * scale_for(surface)).max(8.0);
    let mut x = step;
    while x < surface.width {
        canvas.fill_rect(Rect { x, y: 0.0, w: 1.0, h: surface.height }, theme.grid);
        x += step;
    }
    let mut y = step;
    while y < surface.height {
        canvas.fill_rect(Rect { x: 0.0, y, w: surface.width, h: 1.0 }, theme.grid);
        y += step;
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────

fn paint_menu(canvas: &mut Canvas, theme: &Theme, snap: &Snapshot<'_>) {
    let surface = canvas.surface();
    let s  = scale_for(surface);
    let cx = surface.width / 2.0;
    let layout = MenuLayout::new(surface);

    canvas.draw_text_centered("PINCH HANOI", cx, surface.height * 0.10, font_scale(s, 12.0), theme.text);

    let body = font_scale(s, 4.0);
    let lines = [
        "Move the whole stack to tower 3.",
        "Pinch thumb and index over a tower to pick up its top disc.",
        "Move while pinched, release over another tower to place it.",
        "A disc can never sit on a smaller one.",
    ];
    let mut y = surface.height * 0.27;
    for line in lines {
        canvas.draw_text_centered(line, cx, y, body, theme.text_dim);
        y += 9.0 * body as f32;
    }

    // ── disc count selector ───────────────────────────────────────────────
    for (rect, glyph) in [(layout.fewer, "<"), (layout.more, ">")] {
        canvas.fill_rect(rect, theme.panel);
        canvas.draw_border(rect, (2.0 * s).max(1.0), theme.accent);
        let gs = font_scale(s, 6.0);
        let c  = rect.center();
        canvas.draw_text_centered(glyph, c.x, c.y - 2.5 * gs as f32, gs, theme.accent);
    }
    let label = format!("{} DISCS", snap.num_disks);
    let ls = font_scale(s, 6.0);
    canvas.draw_text_centered(&label, cx, layout.fewer.center().y - 2.5 * ls as f32, ls, theme.text);

    // ── play button ───────────────────────────────────────────────────────
    canvas.fill_rect(layout.play, theme.button);
    let ps = font_scale(s, 8.0);
    let pc = layout.play.center();
    canvas.draw_text_centered("PLAY", pc.x, pc.y - 2.5 * ps as f32, ps, theme.button_text);

    canvas.draw_text(
        "ENTER=play  +/-=discs  ESC=quit",
        16.0 * s, surface.height - 24.0 * s, font_scale(s, 3.0), theme.text_dim,
    );

    paint_preview(canvas, theme, layout.preview, snap.preview, snap.mirror);
}

// ── Game ──────────────────────────────────────────────────────────────────

fn paint_game(canvas: &mut Canvas, theme: &Theme, snap: &Snapshot<'_>) {
    let surface = canvas.surface();
    let s = scale_for(surface);
    let board = BoardLayout::new(surface, snap.num_disks);

    // ── zone under the hand ───────────────────────────────────────────────
    if let Some(zone) = snap.zone {
        let zw = surface.width / TOWER_COUNT as f32;
        let tint = blend(theme.background, theme.accent, 0.08);
        canvas.fill_rect(Rect { x: zw * zone as f32, y: 0.0, w: zw, h: surface.height }, tint);
    }

    // ── towers ────────────────────────────────────────────────────────────
    let label_scale = font_scale(s, 5.0);
    for tower in 0..TOWER_COUNT {
        let pole = board.pole_rect(tower);
        canvas.fill_rect(pole, theme.tower_core);
        canvas.fill_rect(Rect { w: (pole.w / 3.0).max(1.0), ..pole }, theme.tower_glow);
        let base = board.base_rect(tower);
        canvas.fill_rect(base, theme.base);
        let label = (tower + 1).to_string();
        canvas.draw_text_centered(
            &label, surface.zone_center(tower), base.y + base.h + 12.0 * s, label_scale, theme.text_dim,
        );
    }

    // ── discs at rest ─────────────────────────────────────────────────────
    for (tower, stack) in snap.towers.iter().enumerate() {
        for (level, &disk) in stack.iter().enumerate() {
            paint_disk(canvas, theme, board.disk_rect(tower, level, disk), disk, s);
        }
    }

    // ── HUD ───────────────────────────────────────────────────────────────
    let hud = font_scale(s, 5.0);
    let margin = 20.0 * s;
    canvas.draw_text(&format!("TIME {}", format_clock(snap.elapsed)), margin, margin, hud, theme.text);
    let counter = format!("MOVES {}   MIN {}", snap.moves, snap.minimum_moves);
    let cw = text_width(&counter, hud) as f32;
    canvas.draw_text(&counter, surface.width - margin - cw, margin, hud, theme.text);

    if let Some((text, remaining)) = snap.message {
        paint_message(canvas, theme, text, remaining.as_secs_f32(), s);
    }

    // ── hand: carried disc, then the indicator ring ───────────────────────
    if let Some(at) = snap.hand_position {
        if let Some(disk) = snap.held {
            paint_disk(canvas, theme, board.held_rect(at, disk), disk, s);
        }
        canvas.draw_ring(at, 22.0 * s, (4.0 * s).max(2.0), indicator_color(snap.indicator));
    }

    paint_preview(canvas, theme, preview_rect(surface), snap.preview, snap.mirror);

    if snap.won {
        paint_win(canvas, theme, snap, s);
    }
}

fn paint_disk(canvas: &mut Canvas, theme: &Theme, r: Rect, disk: Disk, s: f32) {
    let body = theme.disk(disk);
    canvas.fill_rect(r, body);
    let band = (r.h * 0.22).max(1.0);
    canvas.fill_rect(Rect { h: band, ..r }, blend(body, 0xFFFFFFFF, 0.35));
    canvas.fill_rect(Rect { y: r.y + r.h - band, h: band, ..r }, blend(body, 0xFF000000, 0.25));
    canvas.draw_border(r, (2.0 * s).max(1.0), blend(body, 0xFF000000, 0.45));

    let fs = font_scale(s, 4.0);
    let c = r.center();
    canvas.draw_text_centered(&disk.to_string(), c.x, c.y - 2.5 * fs as f32, fs, blend(body, 0xFFFFFFFF, 0.8));
}

fn paint_message(canvas: &mut Canvas, theme: &Theme, text: &str, remaining: f32, s: f32) {
    let surface = canvas.surface();
    let fs = font_scale(s, 4.0);
    let fade = (1.0 - remaining / MESSAGE_FADE_SECS).clamp(0.0, 1.0);
    let w = text_width(text, fs) as f32 + 40.0 * s;
    let h = 5.0 * fs as f32 + 24.0 * s;
    let r = Rect::centered(surface.width / 2.0, 90.0 * s, w, h);

    canvas.fill_rect(r, blend(theme.panel, theme.background, fade));
    canvas.draw_border(r, (2.0 * s).max(1.0), blend(theme.accent, theme.background, fade));
    canvas.draw_text_centered(text, r.center().x, r.center().y - 2.5 * fs as f32, fs,
                              blend(theme.text, theme.background, fade));
}

fn paint_win(canvas: &mut Canvas, theme: &Theme, snap: &Snapshot<'_>, s: f32) {
    let surface = canvas.surface();
    let r = Rect::centered(surface.width / 2.0, surface.height * 0.40, 640.0 * s, 240.0 * s);
    canvas.fill_rect(r, theme.panel);
    canvas.draw_border(r, (4.0 * s).max(2.0), theme.win);

    let cx = r.center().x;
    canvas.draw_text_centered("SOLVED!", cx, r.y + 28.0 * s, font_scale(s, 12.0), theme.win);
    let stats = format!(
        "TIME {}   MOVES {}   MINIMUM {}",
        format_clock(snap.elapsed), snap.moves, snap.minimum_moves,
    );
    canvas.draw_text_centered(&stats, cx, r.y + 128.0 * s, font_scale(s, 4.0), theme.text);
    canvas.draw_text_centered("R=play again  ESC=menu", cx, r.y + 184.0 * s, font_scale(s, 3.0), theme.text_dim);
}

/// Camera preview: the three landmarks of the latest detection.
fn paint_preview(canvas: &mut Canvas, theme: &Theme, r: Rect, preview: Option<Detection>, mirror: bool) {
    let s = scale_for(canvas.surface());
    canvas.fill_rect(r, theme.panel);
    canvas.draw_border(r, 1.0, theme.text_dim);

    let fs = font_scale(s, 2.0);
    let note = |canvas: &mut Canvas, text: &str| {
        let c = r.center();
        canvas.draw_text_centered(text, c.x, c.y - 2.5 * fs as f32, fs, theme.text_dim);
    };
    let Some(detection) = preview else {
        note(canvas, "NO CAMERA");
        return;
    };
    let Some(hand) = detection.hand else {
        note(canvas, "NO HAND");
        return;
    };

    let local = hand.to_surface(detection.frame, Surface::new(r.w, r.h), mirror);
    let at = |p: Point| Point::new(r.x + p.x, r.y + p.y);
    let (index, thumb, wrist) = (at(local.index_tip), at(local.thumb_tip), at(local.wrist));

    canvas.draw_line(wrist, index, theme.text_dim);
    canvas.draw_line(wrist, thumb, theme.text_dim);
    canvas.draw_line(index, thumb, theme.accent);
    let dot = (3.0 * s).max(2.0);
    canvas.fill_circle(wrist, dot, theme.tower_core);
    canvas.fill_circle(index, dot, theme.accent);
    canvas.fill_circle(thumb, dot, theme.accent);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — window, input, sound
// ════════════════════════════════════════════════════════════════════════════

/// The canvas plus the menu hit regions laid out on it. Both are rebuilt
/// whenever the window changes size.
pub struct Frame {
    pub canvas: Canvas,
    pub menu:   MenuLayout,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        let canvas = Canvas::new(width.max(1), height.max(1));
        let menu   = MenuLayout::new(canvas.surface());
        Frame { canvas, menu }
    }

    /// Match a new window size. Returns `false` when nothing changed or the
    /// window is minimised to zero.
    pub fn fit(&mut self, width: usize, height: usize) -> bool {
        if width == 0 || height == 0 || (width, height) == (self.canvas.width, self.canvas.height) {
            return false;
        }
        *self = Frame::new(width, height);
        true
    }
}

pub struct Visualizer {
    window:         Window,
    frame:          Frame,
    theme:          Theme,
    sound:          SoundPlayer,
    /// Screen of the last rendered frame; clicks are only hit-tested on the menu.
    screen:         Screen,
    mouse_was_down: bool,
}

impl Visualizer {
    pub fn new(cfg: &AppConfig, sound: SoundPlayer) -> Result<Self, VisualizerError> {
        let (w, h) = (cfg.window.width, cfg.window.height);
        let mut window = Window::new(
            "Pinch Hanoi",
            w, h,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(cfg.tick_rate as usize);
        info!(width = w, height = h, theme = ?cfg.theme, "window open");

        Ok(Visualizer {
            window,
            frame: Frame::new(w, h),
            theme: Theme::from_name(cfg.theme),
            sound,
            screen: Screen::Menu,
            mouse_was_down: false,
        })
    }

    fn fit_to_window(&mut self) {
        let (w, h) = self.window.get_size();
        if self.frame.fit(w, h) {
            debug!(width = w, height = h, "window resized");
        }
    }
}

impl Presentation for Visualizer {
    fn poll_input(&mut self) -> InputFrame {
        self.fit_to_window();
        let mut commands = Vec::new();

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Enter) || one_shot(Key::NumPadEnter) {
            commands.push(Command::StartGame);
        }
        if one_shot(Key::R) {
            commands.push(Command::Reset);
        }
        if one_shot(Key::Equal) || one_shot(Key::NumPadPlus) {
            commands.push(Command::MoreDisks);
        }
        if one_shot(Key::Minus) || one_shot(Key::NumPadMinus) {
            commands.push(Command::FewerDisks);
        }
        if one_shot(Key::Escape) {
            commands.push(Command::Back);
        }
        if one_shot(Key::Q) {
            commands.push(Command::Quit);
        }

        let mouse = self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point::new(x, y));
        let mouse_down = self.window.get_mouse_down(MouseButton::Left);

        // Clicks on the menu are commands; on the game screen the button is
        // the simulated pinch.
        let clicked = mouse_down && !self.mouse_was_down;
        self.mouse_was_down = mouse_down;
        if clicked && self.screen == Screen::Menu {
            if let Some(cmd) = mouse.and_then(|p| self.frame.menu.hit(p)) {
                commands.push(cmd);
            }
        }

        InputFrame { commands, mouse, mouse_down }
    }

    fn render(&mut self, snapshot: &Snapshot<'_>) {
        self.screen = snapshot.screen;
        let canvas = &mut self.frame.canvas;
        paint(canvas, &self.theme, snapshot);
        let (w, h) = (canvas.width, canvas.height);
        if let Err(e) = self.window.update_with_buffer(&canvas.buf, w, h) {
            warn!(error = %e, "frame not presented");
        }
    }

    fn play(&mut self, cue: Cue) {
        self.sound.play(cue);
    }

    fn surface(&self) -> Surface {
        self.frame.canvas.surface()
    }

    fn is_open(&self) -> bool { self.window.is_open() }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use hanoi_puzzle::PuzzleState;
    use pinch_control::{HandSample, Indicator};

    const SURFACE: Surface = Surface::new(1280.0, 720.0);

    fn snapshot<'a>(screen: Screen, puzzle: &'a PuzzleState) -> Snapshot<'a> {
        Snapshot {
            screen,
            towers:        puzzle.towers(),
            held:          puzzle.held().map(|h| h.disk),
            hand_position: None,
            zone:          None,
            indicator:     Indicator::Idle,
            message:       None,
            moves:         puzzle.move_count(),
            minimum_moves: puzzle.minimum_moves(),
            elapsed:       Duration::ZERO,
            won:           false,
            num_disks:     puzzle.num_disks(),
            preview:       None,
            mirror:        true,
        }
    }

    fn at(canvas: &Canvas, p: Point) -> u32 {
        canvas.pixel(p.x as usize, p.y as usize).unwrap()
    }

    #[test]
    fn disk_width_grows_with_rank_and_fits_zone() {
        for n in 2..=5 {
            let board = BoardLayout::new(SURFACE, n);
            for d in 1..n as Disk {
                assert!(board.disk_width(d) < board.disk_width(d + 1));
            }
            assert!(board.disk_width(n as Disk) < SURFACE.width / 3.0);
        }
    }

    #[test]
    fn stacked_discs_do_not_overlap_and_sit_on_base() {
        let board = BoardLayout::new(SURFACE, 5);
        let bottom = board.disk_rect(0, 0, 5);
        let next   = board.disk_rect(0, 1, 4);
        assert!((bottom.y + bottom.h - board.base_y).abs() < 1e-3);
        assert!((next.y + next.h - bottom.y).abs() < 1e-3);
        // Stack of five stays below the top of the pole.
        let top = board.disk_rect(0, 4, 1);
        assert!(top.y >= board.pole_rect(0).y);
    }

    #[test]
    fn discs_centred_on_zone_centres() {
        let board = BoardLayout::new(SURFACE, 3);
        for t in 0..3 {
            let r = board.disk_rect(t, 0, 3);
            assert!((r.center().x - SURFACE.zone_center(t)).abs() < 1e-3);
            assert_eq!(SURFACE.zone(r.center().x), t);
        }
    }

    #[test]
    fn menu_hit_testing() {
        let m = MenuLayout::new(SURFACE);
        assert_eq!(m.hit(m.play.center()),  Some(Command::StartGame));
        assert_eq!(m.hit(m.fewer.center()), Some(Command::FewerDisks));
        assert_eq!(m.hit(m.more.center()),  Some(Command::MoreDisks));
        assert_eq!(m.hit(Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn menu_controls_do_not_overlap() {
        let m = MenuLayout::new(Surface::new(320.0, 240.0));
        assert!(!m.play.contains(m.fewer.center()));
        assert!(!m.fewer.contains(m.more.center()));
    }

    #[test]
    fn text_width_counts_gaps() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("A", 1), 3);
        assert_eq!(text_width("AB", 2), 14);
    }

    #[test]
    fn game_frame_draws_discs_in_theme_colors() {
        let theme  = Theme::crystal();
        let puzzle = PuzzleState::new(3);
        let mut canvas = Canvas::new(1280, 720);
        paint(&mut canvas, &theme, &snapshot(Screen::Game, &puzzle));

        let board = BoardLayout::new(SURFACE, 3);
        for (level, disk) in [(0usize, 3 as Disk), (1, 2), (2, 1)] {
            let r = board.disk_rect(0, level, disk);
            // Left of the rank label, away from the border.
            let p = Point::new(r.x + r.w * 0.2, r.center().y);
            assert_eq!(at(&canvas, p), theme.disk(disk));
        }
        // Tower 3 is still empty.
        let r = board.disk_rect(2, 0, 3);
        assert_ne!(at(&canvas, Point::new(r.x + r.w * 0.2, r.center().y)), theme.disk(3));
    }

    #[test]
    fn held_disc_follows_the_hand() {
        let theme = Theme::crystal();
        let mut puzzle = PuzzleState::new(3);
        puzzle.pickup(0).unwrap();
        let hand = Point::new(900.0, 200.0);
        let snap = Snapshot {
            hand_position: Some(hand),
            zone:          Some(2),
            indicator:     Indicator::Active,
            ..snapshot(Screen::Game, &puzzle)
        };
        let mut canvas = Canvas::new(1280, 720);
        paint(&mut canvas, &theme, &snap);

        let r = BoardLayout::new(SURFACE, 3).held_rect(hand, 1);
        assert_eq!(at(&canvas, Point::new(r.x + r.w * 0.15, r.center().y)), theme.disk(1));
        // Ring sits just inside its outer radius.
        assert_eq!(at(&canvas, Point::new(hand.x, hand.y - 20.0)), indicator_color(Indicator::Active));
    }

    #[test]
    fn menu_frame_draws_play_button() {
        let theme  = Theme::midnight();
        let puzzle = PuzzleState::new(4);
        let mut canvas = Canvas::new(1280, 720);
        paint(&mut canvas, &theme, &snapshot(Screen::Menu, &puzzle));

        let play = MenuLayout::new(SURFACE).play;
        assert_eq!(at(&canvas, Point::new(play.x + 4.0, play.y + 4.0)), theme.button);
    }

    #[test]
    fn frame_follows_window_resize() {
        let mut frame = Frame::new(1280, 720);
        let old_play = frame.menu.play;
        assert!(!frame.fit(1280, 720));
        assert!(!frame.fit(0, 0));

        assert!(frame.fit(1920, 540));
        let wide = Surface::new(1920.0, 540.0);
        assert_eq!(frame.canvas.surface(), wide);
        assert_eq!(frame.canvas.buf.len(), 1920 * 540);
        assert_eq!(frame.menu.hit(frame.menu.play.center()), Some(Command::StartGame));
        assert_ne!(frame.menu.play, old_play);

        // Towers move to the new zone centres.
        let theme  = Theme::crystal();
        let puzzle = PuzzleState::new(3);
        paint(&mut frame.canvas, &theme, &snapshot(Screen::Game, &puzzle));
        let board = BoardLayout::new(wide, 3);
        for t in 0..3 {
            let r = board.disk_rect(t, 0, 3);
            assert!((r.center().x - wide.zone_center(t)).abs() < 1e-3);
        }
        let r = board.disk_rect(0, 0, 3);
        assert_eq!(at(&frame.canvas, Point::new(r.x + r.w * 0.2, r.center().y)), theme.disk(3));
    }

    #[test]
    fn preview_draws_landmarks() {
        let theme = Theme::crystal();
        let puzzle = PuzzleState::new(3);
        let frame = Surface::new(640.0, 480.0);
        let hand  = HandSample::pinched_at(Point::new(320.0, 200.0), 40.0);
        let snap = Snapshot {
            preview: Some(Detection { frame, hand: Some(hand) }),
            mirror:  false,
            ..snapshot(Screen::Game, &puzzle)
        };
        let mut canvas = Canvas::new(1280, 720);
        paint(&mut canvas, &theme, &snap);

        let r = preview_rect(SURFACE);
        let local = hand.to_surface(frame, Surface::new(r.w, r.h), false);
        let tip = Point::new(r.x + local.index_tip.x, r.y + local.index_tip.y);
        assert_eq!(at(&canvas, tip), theme.accent);
    }

    #[test]
    fn clipping_never_panics() {
        let mut c = Canvas::new(50, 40);
        c.fill_rect(Rect { x: -30.0, y: -30.0, w: 500.0, h: 500.0 }, 1);
        c.draw_ring(Point::new(-5.0, 45.0), 20.0, 3.0, 2);
        c.draw_line(Point::new(-100.0, -100.0), Point::new(200.0, 90.0), 3);
        c.draw_text("OFF THE EDGE", 40.0, 36.0, 3, 4);
        assert_eq!(c.pixel(0, 0), Some(1));
        assert_eq!(c.pixel(50, 0), None);
    }
}
