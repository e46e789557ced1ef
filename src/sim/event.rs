//! Gameplay events emitted by a tick for the layers above the simulation

use serde::{Deserialize, Serialize};

/// Something the state machine, progression or log should hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Points added to the run score
    ScoreAwarded(u32),
    /// Coins banked into progression immediately
    CoinsEarned(u32),
    /// Bonus pickup started a scare episode
    Scare,
    /// A fleeing pursuer was caught (pursuer index)
    Captured(usize),
    /// Lives (or health) remaining after a hit
    LifeLost(u32),
    /// Level or wave number now starting
    LevelCleared(u32),
    /// Boss entered the field
    BossArrived,
    /// Run ended in defeat
    RunOver,
    /// Run ended in victory
    RunWon,
}
