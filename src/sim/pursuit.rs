//! Pursuer target selection and greedy steering
//!
//! Every pursuer tick:
//! 1. pick a target from the pursuer's mode (and persona while chasing)
//! 2. override it with the pen exit while standing on a release cell
//! 3. list legal directions, dropping the reversal unless it is the only way out
//! 4. take the direction whose next cell is Manhattan-closest to the target,
//!    ties going to [`Direction::CARDINALS`] order

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Persona, Pursuer, PursuerMode, Walker};
use super::grid::{Direction, GridWorld, Mover, TilePos};

/// Containment pen geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    /// Cells from which a pursuer heads straight for `exit`
    pub release: Vec<TilePos>,
    pub exit: TilePos,
    /// Where captured pursuers reappear
    pub respawn: TilePos,
}

impl Pen {
    pub fn is_release_cell(&self, pos: TilePos) -> bool {
        self.release.contains(&pos)
    }
}

/// Chase target for a persona, clamped into the grid
pub fn chase_target(persona: Persona, from: TilePos, player: &Walker, grid: &GridWorld) -> TilePos {
    let target = match persona {
        Persona::Direct => player.pos,
        Persona::Ahead(tiles) => {
            let (dx, dy) = player.dir.delta();
            TilePos::new(player.pos.x + dx * tiles, player.pos.y + dy * tiles)
        }
        Persona::Shy { radius, corner } => {
            if from.manhattan(player.pos) < radius {
                corner
            } else {
                player.pos
            }
        }
    };
    grid.clamp(target)
}

/// Target for this tick. Flee targets are drawn from `rng` only when
/// `flee_retarget_ticks` divides the pursuer's flee tick count.
pub fn select_target(
    pursuer: &Pursuer,
    player: &Walker,
    pen: &Pen,
    grid: &GridWorld,
    rng: &mut impl Rng,
    flee_retarget_ticks: u32,
) -> TilePos {
    if pen.is_release_cell(pursuer.walker.pos) {
        return pen.exit;
    }
    match pursuer.mode {
        PursuerMode::Chase => chase_target(pursuer.persona, pursuer.walker.pos, player, grid),
        PursuerMode::Flee => {
            if pursuer.flee_ticks % flee_retarget_ticks.max(1) == 0 {
                grid.random_open_cell(rng)
            } else {
                pursuer.target
            }
        }
        PursuerMode::Captured => pen.exit,
    }
}

/// Legal directions from `pos` for a pursuer heading `heading`.
///
/// The reversal is excluded unless nothing else is legal.
pub fn candidate_directions(grid: &GridWorld, pos: TilePos, heading: Direction) -> Vec<Direction> {
    let legal: Vec<Direction> = Direction::CARDINALS
        .into_iter()
        .filter(|&d| grid.is_valid_move(pos, d, Mover::Pursuer))
        .collect();

    let reverse = heading.opposite();
    let forward: Vec<Direction> = legal.iter().copied().filter(|&d| d != reverse).collect();
    if forward.is_empty() { legal } else { forward }
}

/// Greedy choice toward `target`; [`Direction::None`] when boxed in
pub fn choose_direction(grid: &GridWorld, pos: TilePos, heading: Direction, target: TilePos) -> Direction {
    let target = grid.clamp(target);
    candidate_directions(grid, pos, heading)
        .into_iter()
        .min_by_key(|&d| grid.step(pos, d).manhattan(target))
        .unwrap_or(Direction::None)
}

/// Retarget and steer one pursuer for the coming tick
pub fn steer(
    pursuer: &mut Pursuer,
    player: &Walker,
    pen: &Pen,
    grid: &GridWorld,
    rng: &mut impl Rng,
    flee_retarget_ticks: u32,
) {
    if !pursuer.is_active() {
        return;
    }
    pursuer.target = select_target(pursuer, player, pen, grid, rng, flee_retarget_ticks);
    let dir = choose_direction(grid, pursuer.walker.pos, pursuer.walker.dir, pursuer.target);
    if dir != Direction::None {
        pursuer.walker.dir = dir;
    }
    if pursuer.mode == PursuerMode::Flee {
        pursuer.flee_ticks = pursuer.flee_ticks.wrapping_add(1);
    }
}
