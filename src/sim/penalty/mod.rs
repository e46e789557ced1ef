//! Penalty shootout: five kicks against a diving keeper
//!
//! Each shot is aimed, powered and kicked; the keeper commits to a dive
//! the moment the ball leaves the spot. Runs at a fixed 60 Hz.

mod state;
mod tick;

pub use state::{Ball, Dive, PenaltyState, ShotPhase};
pub use tick::{PenaltyInput, tick};

use glam::Vec2;

use super::collision::Aabb;

pub const SIM_HZ: f32 = 60.0;
pub const SIM_DT: f32 = 1.0 / SIM_HZ;

/// Goal mouth (px): centre x, top edge, size
pub const GOAL_X: f32 = 240.0;
pub const GOAL_Y: f32 = 30.0;
pub const GOAL_W: f32 = 140.0;
pub const GOAL_H: f32 = 60.0;

pub const KICK_SPOT: Vec2 = Vec2::new(240.0, 280.0);
/// Keeper feet line
pub const KEEPER_Y: f32 = GOAL_Y + GOAL_H - 12.0;
pub const KEEPER_W: f32 = 35.0;
pub const KEEPER_H: f32 = 35.0;
/// Reach below the feet
pub const KEEPER_REACH_BELOW: f32 = 10.0;
/// Dive speed (px/s) and furthest travel from centre
pub const DIVE_SPEED: f32 = 180.0;
pub const DIVE_LIMIT: f32 = 60.0;
/// Percent chance the keeper reads the shot
pub const KEEPER_SKILL: u32 = 45;
/// Aim further than this from centre counts as a side
pub const SIDE_MARGIN: f32 = 30.0;

/// Cursor inset from the goal mouth edges
pub const AIM_INSET: f32 = 12.0;
/// Cursor travel per tick at full deflection
pub const AIM_SPEED: f32 = 6.0;
/// Power units per second
pub const POWER_RATE: f32 = 2.5;

pub const BALL_SPEED: f32 = 300.0;
pub const BALL_POWER_SPEED: f32 = 200.0;
pub const BALL_RADIUS: f32 = 12.0;
/// Smallest scale, reached at the goal line
pub const BALL_MIN_SCALE: f32 = 0.3;
/// Distance at which the ball counts as arrived
pub const ARRIVE_DIST: f32 = 5.0;

/// Ticks the Goal / Miss caption stays up
pub const RESULT_TICKS: u32 = 120;
pub const SHOTS: u32 = 5;

pub const GOAL_SCORE: u32 = 100;
pub const POWER_BONUS: f32 = 100.0;
pub const GOAL_COINS: u32 = 10;

/// Points for a goal struck at `power`
pub fn shot_score(power: f32) -> u32 {
    GOAL_SCORE + (power.clamp(0.0, 1.0) * POWER_BONUS) as u32
}

/// Inside of the goal frame
pub fn goal_mouth() -> Aabb {
    Aabb {
        min: Vec2::new(GOAL_X - GOAL_W / 2.0, GOAL_Y),
        max: Vec2::new(GOAL_X + GOAL_W / 2.0, GOAL_Y + GOAL_H),
    }
}

/// Where the aim cursor may go
pub fn aim_bounds() -> Aabb {
    let mouth = goal_mouth();
    Aabb {
        min: mouth.min + Vec2::splat(AIM_INSET),
        max: mouth.max - Vec2::splat(AIM_INSET),
    }
}
