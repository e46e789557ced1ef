//! Shootout run state

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::*;
use crate::sim::clock::TickClock;
use crate::sim::collision::Aabb;
use crate::sim::entity::Body;
use crate::sim::event::GameEvent;

/// Where the current shot is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotPhase {
    #[default]
    Aiming,
    /// Power bar running, aim locked
    Power,
    /// Ball in flight
    Shooting,
    Goal,
    Miss,
}

impl ShotPhase {
    pub fn is_result(self) -> bool {
        matches!(self, ShotPhase::Goal | ShotPhase::Miss)
    }
}

/// Keeper commitment for the current shot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dive {
    #[default]
    Stay,
    Left,
    Right,
}

impl Dive {
    fn sign(self) -> f32 {
        match self {
            Dive::Stay => 0.0,
            Dive::Left => -1.0,
            Dive::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub body: Body,
    pub target: Vec2,
    /// Perspective scale, 1 at the spot
    pub scale: f32,
}

impl Ball {
    fn on_spot() -> Self {
        Self {
            body: Body::new(KICK_SPOT, Vec2::splat(BALL_RADIUS * 2.0), 1),
            target: KICK_SPOT,
            scale: 1.0,
        }
    }

    pub fn radius(&self) -> f32 {
        BALL_RADIUS * self.scale
    }
}

#[derive(Debug, Clone)]
pub struct PenaltyState {
    pub clock: TickClock,
    pub phase: ShotPhase,
    pub aim: Vec2,
    /// In [0, 1]
    pub power: f32,
    /// +1 filling, -1 draining
    pub power_dir: f32,
    pub ball: Ball,
    /// Feet position of the keeper
    pub keeper: Body,
    pub dive: Dive,
    /// Shots completed
    pub shots: u32,
    pub goals: u32,
    pub score: u32,
    /// Points of the last goal, for the caption
    pub last_points: u32,
    /// Ticks left on the result caption
    pub result_ticks: u32,
    pub ticks: u64,
    pub finished: bool,
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
}

impl PenaltyState {
    pub fn new(seed: u64) -> Self {
        let mut state = Self {
            clock: TickClock::fixed_rate(SIM_DT),
            phase: ShotPhase::Aiming,
            aim: Vec2::ZERO,
            power: 0.0,
            power_dir: 1.0,
            ball: Ball::on_spot(),
            keeper: Body::new(Vec2::new(GOAL_X, KEEPER_Y), Vec2::new(KEEPER_W, KEEPER_H), 1),
            dive: Dive::Stay,
            shots: 0,
            goals: 0,
            score: 0,
            last_points: 0,
            result_ticks: 0,
            ticks: 0,
            finished: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.reset_shot();
        state
    }

    /// Ball back on the spot, keeper centred, cursor mid-goal
    pub fn reset_shot(&mut self) {
        self.phase = ShotPhase::Aiming;
        self.ball = Ball::on_spot();
        self.aim = Vec2::new(GOAL_X, GOAL_Y + GOAL_H / 2.0);
        self.keeper = Body::new(Vec2::new(GOAL_X, KEEPER_Y), self.keeper.size, 1);
        self.dive = Dive::Stay;
        self.power = 0.0;
        self.power_dir = 1.0;
        self.result_ticks = 0;
    }

    /// 1-based number of the shot in play
    pub fn shot_number(&self) -> u32 {
        (self.shots + 1).min(SHOTS)
    }

    /// Area the keeper covers right now
    pub fn keeper_reach(&self) -> Aabb {
        let x = self.keeper.pos.x;
        let feet = self.keeper.pos.y;
        Aabb {
            min: Vec2::new(x - KEEPER_W / 2.0, feet - KEEPER_H),
            max: Vec2::new(x + KEEPER_W / 2.0, feet + KEEPER_REACH_BELOW),
        }
    }

    pub(super) fn dive_step(&mut self) {
        let keeper = &mut self.keeper;
        keeper.begin_tick();
        keeper.pos.x = (keeper.pos.x + self.dive.sign() * DIVE_SPEED * SIM_DT)
            .clamp(GOAL_X - DIVE_LIMIT, GOAL_X + DIVE_LIMIT);
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
