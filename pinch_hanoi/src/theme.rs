//! Color palettes for the board, as packed `0xAARRGGBB` values.

use hanoi_puzzle::{Disk, MAX_DISKS};
use pinch_control::Indicator;

use crate::config::ThemeName;

/// Pack opaque RGB.
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

/// Convert HSV → packed ARGB (0xAARRGGBB, A=0xFF).
fn hsv_to_argb(h: f32, s: f32, v: f32) -> u32 {
    let h  = h.rem_euclid(360.0);
    let hi = (h / 60.0) as u32;
    let f  = h / 60.0 - hi as f32;
    let p  = v * (1.0 - s);
    let q  = v * (1.0 - s * f);
    let t  = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match hi {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let ri = (r * 255.0) as u32;
    let gi = (g * 255.0) as u32;
    let bi = (b * 255.0) as u32;
    0xFF000000 | (ri << 16) | (gi << 8) | bi
}

const DISK_SLOTS: usize = MAX_DISKS + 1;

// ════════════════════════════════════════════════════════════════════════════
// Theme
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub background: u32,
    pub grid:       u32,
    pub panel:      u32,
    pub text:       u32,
    pub text_dim:   u32,
    pub accent:     u32,
    pub tower_core: u32,
    pub tower_glow: u32,
    pub base:       u32,
    pub button:     u32,
    pub button_text: u32,
    pub win:        u32,
    disks:          [u32; DISK_SLOTS],
}

impl Theme {
    /// Light steel background with gemstone discs.
    pub fn crystal() -> Self {
        Theme {
            background:  rgb(245, 247, 250),
            grid:        rgb(222, 228, 235),
            panel:       rgb(255, 255, 255),
            text:        rgb( 10,  10,  20),
            text_dim:    rgb( 80,  90, 100),
            accent:      rgb(  0, 120, 255),
            tower_core:  rgb(100, 100, 100),
            tower_glow:  rgb(200, 200, 200),
            base:        rgb(160, 160, 160),
            button:      rgb(  0, 120, 255),
            button_text: rgb(255, 255, 255),
            win:         rgb( 46, 139,  87),
            disks: [
                rgb(220,  20,  60), // ruby
                rgb( 46, 139,  87), // emerald
                rgb( 65, 105, 225), // sapphire
                rgb(153,  50, 204), // amethyst
                rgb(255, 215,   0), // gold
                rgb(  0, 206, 209), // turquoise
            ],
        }
    }

    /// Dark navy with discs spread around the hue wheel.
    pub fn midnight() -> Self {
        let mut disks = [0; DISK_SLOTS];
        for (i, d) in disks.iter_mut().enumerate() {
            *d = hsv_to_argb(i as f32 * 360.0 / DISK_SLOTS as f32, 0.72, 0.95);
        }
        Theme {
            background:  0xFF1A1A2E,
            grid:        0xFF222A44,
            panel:       0xFF16213E,
            text:        0xFFEEEEEE,
            text_dim:    0xFF888888,
            accent:      0xFFFFD700,
            tower_core:  0xFF8890A8,
            tower_glow:  0xFFC8CCDA,
            base:        0xFF0F3460,
            button:      0xFF0F3460,
            button_text: 0xFFFFD700,
            win:         0xFFFFD700,
            disks,
        }
    }

    /// Wooden pegs and pastel discs.
    pub fn classic() -> Self {
        Theme {
            background:  rgb(250, 243, 224),
            grid:        rgb(238, 228, 204),
            panel:       rgb(255, 250, 238),
            text:        rgb( 60,  40,  20),
            text_dim:    rgb(130, 110,  90),
            accent:      rgb(181, 101,  29),
            tower_core:  rgb(139,  90,  43),
            tower_glow:  rgb(196, 145,  92),
            base:        rgb(110,  70,  35),
            button:      rgb(139,  90,  43),
            button_text: rgb(250, 243, 224),
            win:         rgb( 85, 139,  47),
            disks: [
                rgb(244, 143, 177),
                rgb(129, 199, 132),
                rgb(100, 181, 246),
                rgb(206, 147, 216),
                rgb(255, 213,  79),
                rgb(128, 222, 234),
            ],
        }
    }

    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Crystal  => Theme::crystal(),
            ThemeName::Midnight => Theme::midnight(),
            ThemeName::Classic  => Theme::classic(),
        }
    }

    /// Fill color for a disc; rank 1 is the smallest.
    pub fn disk(&self, disk: Disk) -> u32 {
        let idx = (disk as usize).saturating_sub(1) % DISK_SLOTS;
        self.disks[idx]
    }
}

impl Default for Theme {
    fn default() -> Self { Theme::crystal() }
}

/// Pinch ring color.  Fixed across themes so the states read the same.
pub fn indicator_color(indicator: Indicator) -> u32 {
    match indicator {
        Indicator::Idle    => rgb(100, 100, 100),
        Indicator::Active  => rgb(  0, 120, 255),
        Indicator::Holding => rgb(  0, 180,   0),
        Indicator::Carrying { pulse } => {
            let g = 120.0 + pulse.clamp(0.0, 1.0) * 60.0;
            rgb(0, g as u8, 0)
        }
        Indicator::Error   => rgb(200,  50,  50),
    }
}
