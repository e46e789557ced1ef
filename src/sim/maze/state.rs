//! Maze run state
//!
//! Everything a run needs lives here, including every timer as an explicit
//! field; nothing is hidden in function-local state.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::*;
use crate::sim::clock::{TickClock, Timer};
use crate::sim::entity::{Pursuer, Walker};
use crate::sim::event::GameEvent;
use crate::sim::grid::GridWorld;
use crate::sim::pursuit::Pen;

/// Complete maze run state (deterministic given seed, inputs and timestamps)
#[derive(Debug, Clone)]
pub struct MazeState {
    pub grid: GridWorld,
    pub player: Walker,
    pub pursuers: Vec<Pursuer>,
    pub pen: Pen,
    pub player_clock: TickClock,
    pub pursuer_clock: TickClock,
    /// Running while a scare episode is active
    pub scare: Timer,
    pub score: u32,
    /// Coins banked during this run (already handed to progression)
    pub coins: u32,
    pub lives: u32,
    /// 1-based level number
    pub level: u32,
    pub mouth_open: bool,
    pub mouth_elapsed: f32,
    /// Set once the run has ended; the tick is a no-op afterwards
    pub finished: bool,
    /// Events from the latest tick, drained by the caller
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
}

impl MazeState {
    pub fn new(seed: u64) -> Self {
        let pursuers = PURSUERS
            .iter()
            .map(|&(home, dir, persona)| Pursuer::new(home, dir, persona, RESPAWN_MS))
            .collect();

        Self {
            grid: GridWorld::parse(&LEVEL),
            player: Walker::new(PLAYER_START, PLAYER_START_DIR),
            pursuers,
            pen: Pen {
                release: PEN_RELEASE.to_vec(),
                exit: PEN_EXIT,
                respawn: PEN_RESPAWN,
            },
            player_clock: TickClock::per_tile(PLAYER_TICK),
            pursuer_clock: TickClock::per_tile(PURSUER_TICK),
            scare: Timer::new(SCARE_MS),
            score: 0,
            coins: 0,
            lives: START_LIVES,
            level: 1,
            mouth_open: true,
            mouth_elapsed: 0.0,
            finished: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Put every mover back on its start cell (life lost, level start)
    pub fn reset_positions(&mut self) {
        self.player.place(PLAYER_START, PLAYER_START_DIR);
        for pursuer in &mut self.pursuers {
            pursuer.reset();
        }
        self.scare.clear();
        self.player_clock.reset();
        self.pursuer_clock.reset();
    }

    /// Reload the grid for the next level
    pub fn load_level(&mut self, level: u32) {
        self.level = level;
        self.grid = GridWorld::parse(&LEVEL);
        self.reset_positions();
    }

    pub fn is_scared(&self) -> bool {
        self.scare.is_running()
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
