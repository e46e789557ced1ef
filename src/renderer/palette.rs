//! Colours: UI chrome, maze themes, skins, pitch

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// 8-bit-per-channel constructor
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

pub const UI_BACKGROUND: Rgb565 = rgb(10, 10, 30);
pub const UI_PANEL: Rgb565 = rgb(30, 30, 60);
pub const UI_TEXT: Rgb565 = Rgb565::WHITE;
pub const UI_DIM: Rgb565 = rgb(140, 140, 160);
pub const UI_ACCENT: Rgb565 = rgb(255, 210, 0);
pub const UI_BUTTON: Rgb565 = rgb(40, 70, 140);
pub const UI_DANGER: Rgb565 = rgb(200, 40, 40);
pub const UI_OK: Rgb565 = rgb(40, 170, 70);

/// Board colours of one maze theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgb565,
    pub wall: Rgb565,
    pub wall_edge: Rgb565,
    pub door: Rgb565,
}

pub const THEMES: [Theme; 4] = [
    Theme {
        background: Rgb565::BLACK,
        wall: rgb(20, 30, 140),
        wall_edge: rgb(60, 90, 255),
        door: rgb(255, 170, 200),
    },
    Theme {
        background: rgb(0, 16, 0),
        wall: rgb(20, 90, 30),
        wall_edge: rgb(80, 200, 90),
        door: rgb(230, 200, 120),
    },
    Theme {
        background: rgb(16, 0, 0),
        wall: rgb(120, 10, 20),
        wall_edge: rgb(240, 60, 60),
        door: rgb(255, 200, 120),
    },
    Theme {
        background: rgb(8, 0, 20),
        wall: rgb(90, 0, 140),
        wall_edge: rgb(0, 255, 220),
        door: rgb(255, 0, 200),
    },
];

pub fn theme(slot: usize) -> &'static Theme {
    THEMES.get(slot).unwrap_or(&THEMES[0])
}

pub const COLLECTIBLE: Rgb565 = rgb(255, 200, 170);
pub const BONUS: Rgb565 = rgb(255, 230, 120);

/// Player colour per maze skin slot
pub const MAZE_SKINS: [Rgb565; 8] = [
    rgb(255, 230, 0),
    rgb(230, 30, 60),
    rgb(60, 230, 160),
    rgb(90, 180, 255),
    rgb(170, 90, 255),
    rgb(255, 120, 20),
    rgb(200, 240, 255),
    rgb(220, 180, 40),
];

/// Chase colour per pursuer, in roster order
pub const PURSUERS: [Rgb565; 4] = [
    rgb(255, 0, 0),
    rgb(255, 184, 255),
    rgb(0, 255, 255),
    rgb(255, 184, 82),
];
pub const FLEE: Rgb565 = rgb(33, 33, 255);
pub const FLEE_FLASH: Rgb565 = Rgb565::WHITE;
pub const EYES: Rgb565 = Rgb565::WHITE;

/// Hull colour per ship skin slot
pub const SHIP_SKINS: [Rgb565; 6] = [
    rgb(0, 200, 255),
    rgb(60, 220, 60),
    rgb(255, 200, 0),
    rgb(120, 120, 140),
    rgb(255, 120, 200),
    rgb(255, 255, 255),
];

pub const SPACE: Rgb565 = Rgb565::BLACK;
pub const STAR: Rgb565 = rgb(180, 180, 200);
pub const ENEMY: Rgb565 = rgb(220, 60, 60);
pub const ENEMY_HURT: Rgb565 = rgb(255, 150, 60);
pub const BOSS: Rgb565 = rgb(160, 40, 200);
pub const PLAYER_SHOT: Rgb565 = rgb(255, 255, 120);
pub const ENEMY_SHOT: Rgb565 = rgb(255, 80, 80);
pub const HEAL: Rgb565 = rgb(60, 230, 90);
pub const RAPID: Rgb565 = rgb(80, 160, 255);
pub const EXPLOSION: Rgb565 = rgb(255, 160, 40);

/// Striker shirt per kit slot
pub const KITS: [Rgb565; 4] = [
    rgb(0, 80, 220),
    rgb(220, 30, 30),
    rgb(20, 160, 60),
    rgb(230, 190, 30),
];

pub const GRASS: Rgb565 = rgb(20, 120, 40);
pub const PITCH_LINE: Rgb565 = rgb(40, 40, 40);
pub const SKY: Rgb565 = rgb(135, 206, 235);
pub const HORIZON: Rgb565 = rgb(220, 220, 220);
pub const GOAL_SHADE: Rgb565 = rgb(24, 24, 24);
pub const NET: Rgb565 = rgb(185, 190, 190);
pub const POST: Rgb565 = Rgb565::WHITE;
pub const KEEPER: Rgb565 = rgb(220, 30, 30);
pub const SKIN_TONE: Rgb565 = rgb(255, 165, 0);
pub const BALL: Rgb565 = Rgb565::WHITE;
pub const BALL_SHADOW: Rgb565 = rgb(0, 80, 20);
pub const CROSSHAIR: Rgb565 = rgb(255, 255, 0);

/// Power bar colour by fill level
pub fn power_color(power: f32) -> Rgb565 {
    match power {
        p if p > 0.75 => rgb(255, 0, 0),
        p if p > 0.5 => rgb(255, 165, 0),
        p if p > 0.25 => rgb(255, 255, 0),
        _ => rgb(0, 255, 0),
    }
}

/// Lookup that tolerates out-of-range slots
pub fn pick(colors: &[Rgb565], slot: usize) -> Rgb565 {
    colors.get(slot).or(colors.first()).copied().unwrap_or(Rgb565::WHITE)
}
