//! Strip Arcade - real-time core for handheld arcade mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (fixed-step clocks, grid, pursuit, collisions, game worlds)
//! - `input`: Input aggregation (deadzone, edges, debounce, tap vs drag)
//! - `machine`: Top-level game state machine (menu, shop, play, pause, results)
//! - `renderer`: Strip-buffered rendering into a narrow horizontal band
//! - `platform`: Host-supplied services (input source, display, clock, reboot)
//! - `persistence`: Key-value store adapters
//! - `progression`: Coins, high score and unlocked cosmetics
//! - `shop`: Cosmetic catalogue and purchase rules
//! - `games`: The maze chase, space shooter and penalty shootout wired to the console
//! - `console`: Per-frame orchestration of all of the above

pub mod console;
pub mod games;
pub mod input;
pub mod machine;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod renderer;
pub mod shop;
pub mod sim;

pub use console::{Console, Minigame};
pub use machine::{GameState, GameStateMachine};
pub use progression::{Progression, ProgressionRecord};

/// Game configuration constants
pub mod consts {
    /// Display dimensions (landscape)
    pub const SCREEN_W: i32 = 480;
    pub const SCREEN_H: i32 = 320;
    /// Height of the strip buffer; the display is painted in SCREEN_H / BAND_HEIGHT passes
    pub const BAND_HEIGHT: i32 = 32;

    /// Raw joystick reading at rest, and the deadzone around it
    pub const JOYSTICK_CENTER: i32 = 2048;
    pub const JOYSTICK_DEADZONE: i32 = 800;

    /// Pointer travel (px) below which a touch is still a tap
    pub const TAP_SLOP_PX: i32 = 10;
    /// Pointer travel (px) that turns a touch into a steering swipe
    pub const SWIPE_THRESHOLD_PX: i32 = 15;

    /// Menu cursor auto-repeat while the stick is held
    pub const NAV_REPEAT_MS: u64 = 200;
    /// Re-latch interval for a held steering direction
    pub const STEER_REPEAT_MS: u64 = 150;

    /// Debounce: idle time with no touch before the gate reopens
    pub const RELEASE_IDLE_MS: u64 = 100;
    /// Debounce: fixed cool-down before the gate reopens
    pub const COOLDOWN_MS: u64 = 1000;
    /// Confirm on the Win screen is ignored for this long after entry
    pub const WIN_LOCKOUT_MS: u64 = 1000;
}

/// Screen-space rectangle used for touch hit tests and widget layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl HitRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// Same rectangle moved vertically (scrolling lists)
    pub fn shifted(&self, dy: i32) -> Self {
        Self::new(self.x, self.y + dy, self.w, self.h)
    }

    /// Vertical extent intersects rows `[top, top + height)`
    pub fn spans_rows(&self, top: i32, height: i32) -> bool {
        self.y < top + height && self.y + self.h > top
    }
}

/// Manhattan distance between two grid coordinates
#[inline]
pub fn manhattan(a: (i32, i32), b: (i32, i32)) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Blink phase shared by every drawable in a band: true for the first half of each period
#[inline]
pub fn blink(now_ms: u64, period_ms: u64) -> bool {
    (now_ms / period_ms) % 2 == 0
}
