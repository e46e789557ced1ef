//! Space shooter: free-roaming wave game
//!
//! Formations ease into position and dive at the player; a boss closes the
//! run once the score is high enough. Runs at a fixed 60 Hz.

mod state;
mod tick;

pub use state::{
    Banner, BannerText, Boss, Enemy, EnemyPhase, Explosion, Formation, Pickup, PickupKind, Projectile, ShooterState,
    Star,
};
pub use tick::{ShooterInput, difficulty, tick};

/// Fixed logic rate
pub const SIM_HZ: f32 = 60.0;
pub const SIM_DT: f32 = 1.0 / SIM_HZ;

/// Playfield (px)
pub const FIELD_W: f32 = 480.0;
pub const FIELD_H: f32 = 320.0;

pub const PLAYER_SIZE: f32 = 32.0;
pub const PLAYER_HEALTH: i32 = 100;
pub const PLAYER_START: (f32, f32) = (240.0, 270.0);
/// Joystick travel per tick at full deflection
pub const PLAYER_SPEED: f32 = 4.0;
/// Fraction of the gap to the touch point closed each tick
pub const TOUCH_FOLLOW: f32 = 0.2;

pub const BULLET_SPEED: f32 = 15.0;
pub const BULLET_W: f32 = 4.0;
pub const BULLET_H: f32 = 8.0;
/// Ticks between shots, normal and with rapid fire
pub const FIRE_INTERVAL: u32 = 3;
pub const RAPID_FIRE_INTERVAL: u32 = 2;

pub const ENEMY_SIZE: f32 = 24.0;
pub const ENEMY_BULLET_SPEED: f32 = 5.0;
/// One in this many ticks an attacking enemy fires
pub const ENEMY_FIRE_ODDS: u32 = 240;
/// Entrance easing factor per tick
pub const ENTRANCE_EASE: f32 = 0.05;
/// Distance at which an entering enemy counts as in formation
pub const ENTRANCE_SNAP: f32 = 2.0;
pub const DIVE_SPEED: f32 = 1.5;
pub const SWAY: f32 = 2.0;

pub const WAVE_DELAY_MS: u64 = 3000;
/// Centre-screen caption lifetimes
pub const WAVE_BANNER_MS: u64 = 2000;
pub const BOSS_BANNER_MS: u64 = 3000;
/// Surviving past this many waves also wins
pub const MAX_WAVES: u32 = 12;

pub const BOSS_SCORE: u32 = 2000;
pub const BOSS_SIZE: f32 = 48.0;
pub const BOSS_HEALTH: i32 = 100;
pub const BOSS_SPEED: f32 = 1.5;
/// Boss patrol keeps this far from either side
pub const BOSS_MARGIN: f32 = 50.0;
pub const BOSS_FIRE_TICKS: u32 = 120;

pub const ENEMY_BULLET_DAMAGE: i32 = 10;
pub const RAM_DAMAGE: i32 = 20;
pub const KILL_SCORE: u32 = 100;
pub const BOSS_KILL_SCORE: u32 = 1000;

/// Ticks between pickup drops, inclusive range
pub const PICKUP_TICKS: (u32, u32) = (600, 900);
pub const PICKUP_SIZE: f32 = 16.0;
pub const PICKUP_FALL: f32 = 2.0;
pub const HEAL_AMOUNT: i32 = 50;
pub const RAPID_FIRE_MS: u64 = 10_000;

pub const STAR_COUNT: usize = 50;
/// Explosion lifetime in ticks
pub const EXPLOSION_LIFE: u32 = 28;

/// Coins banked when the run ends
pub fn loss_coins(score: u32) -> u32 {
    score / 20
}

pub fn win_coins(score: u32) -> u32 {
    score / 10 + 500
}
