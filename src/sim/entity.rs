//! Movable game objects
//!
//! Two families share the same shape (position, previous position, heading or
//! velocity, size, health, animation phase):
//! - [`Walker`]: tile-based, one cell per logical tick
//! - [`Body`]: free-roaming, continuous coordinates
//!
//! `prev_pos` is written by `begin_tick` at the start of every logical tick and
//! only feeds interpolated rendering and swap-collision checks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::Timer;
use super::grid::{Direction, GridWorld, Mover, TilePos};

/// A tile-based mover with a buffered turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walker {
    pub pos: TilePos,
    pub prev_pos: TilePos,
    pub dir: Direction,
    /// Requested turn, applied at the start of a tick if it is legal there
    pub next_dir: Direction,
}

impl Walker {
    pub fn new(pos: TilePos, dir: Direction) -> Self {
        Self {
            pos,
            prev_pos: pos,
            dir,
            next_dir: Direction::None,
        }
    }

    /// Teleport (spawn, respawn); no interpolation across the jump
    pub fn place(&mut self, pos: TilePos, dir: Direction) {
        *self = Self::new(pos, dir);
    }

    pub fn begin_tick(&mut self) {
        self.prev_pos = self.pos;
    }

    /// Apply the buffered turn if it is legal from the current cell
    pub fn latch_turn(&mut self, grid: &GridWorld, mover: Mover) {
        if self.next_dir != Direction::None && grid.is_valid_move(self.pos, self.next_dir, mover) {
            self.dir = self.next_dir;
        }
    }

    /// Commit one step along `dir`; returns false when blocked
    pub fn advance(&mut self, grid: &GridWorld, mover: Mover) -> bool {
        if grid.is_valid_move(self.pos, self.dir, mover) {
            self.pos = grid.step(self.pos, self.dir);
            true
        } else {
            false
        }
    }

    /// Interpolated tile coordinate for drawing.
    ///
    /// A step that wrapped around the grid edge snaps to the new cell instead
    /// of sliding across the whole board.
    pub fn render_pos(&self, alpha: f32) -> Vec2 {
        let prev = Vec2::new(self.prev_pos.x as f32, self.prev_pos.y as f32);
        let cur = Vec2::new(self.pos.x as f32, self.pos.y as f32);
        if (self.pos.x - self.prev_pos.x).abs() > 1 || (self.pos.y - self.prev_pos.y).abs() > 1 {
            return cur;
        }
        prev.lerp(cur, alpha.clamp(0.0, 1.0))
    }
}

/// How a pursuer picks its chase target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persona {
    /// Straight at the player
    Direct,
    /// A fixed number of tiles ahead of the player's heading
    Ahead(i32),
    /// Chases from afar, retreats to `corner` once within `radius` tiles
    Shy { radius: i32, corner: TilePos },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PursuerMode {
    #[default]
    Chase,
    Flee,
    /// Out of play until the respawn timer expires
    Captured,
}

/// An autonomous enemy on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pursuer {
    pub walker: Walker,
    pub persona: Persona,
    pub mode: PursuerMode,
    pub target: TilePos,
    /// Started on capture, cleared on respawn
    pub respawn: Timer,
    /// Ticks spent fleeing in the current episode, drives flee re-targeting
    pub flee_ticks: u32,
    /// Level start placement
    pub home: TilePos,
    pub home_dir: Direction,
}

impl Pursuer {
    pub fn new(home: TilePos, home_dir: Direction, persona: Persona, respawn_ms: u64) -> Self {
        Self {
            walker: Walker::new(home, home_dir),
            persona,
            mode: PursuerMode::Chase,
            target: home,
            respawn: Timer::new(respawn_ms),
            flee_ticks: 0,
            home,
            home_dir,
        }
    }

    /// In play: collides, moves and is drawn
    pub fn is_active(&self) -> bool {
        self.mode != PursuerMode::Captured
    }

    /// Scare event: active pursuers flee and turn around on the spot.
    /// Returns whether this pursuer was affected.
    pub fn scare(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.mode = PursuerMode::Flee;
        self.flee_ticks = 0;
        self.walker.dir = self.walker.dir.opposite();
        true
    }

    /// Contact while fleeing; returns false for any other mode
    pub fn capture(&mut self, now_ms: u64) -> bool {
        if self.mode != PursuerMode::Flee {
            return false;
        }
        self.mode = PursuerMode::Captured;
        self.respawn.start(now_ms);
        true
    }

    /// Scare episode over
    pub fn calm(&mut self) {
        if self.mode == PursuerMode::Flee {
            self.mode = PursuerMode::Chase;
            self.flee_ticks = 0;
        }
    }

    /// Back into play at `cell` in Chase mode once the respawn delay has elapsed
    pub fn try_respawn(&mut self, now_ms: u64, cell: TilePos) -> bool {
        if self.mode != PursuerMode::Captured || !self.respawn.expired(now_ms) {
            return false;
        }
        self.respawn.clear();
        self.mode = PursuerMode::Chase;
        self.walker.place(cell, Direction::Up);
        self.target = cell;
        true
    }

    /// Level start or life lost
    pub fn reset(&mut self) {
        self.walker.place(self.home, self.home_dir);
        self.mode = PursuerMode::Chase;
        self.respawn.clear();
        self.flee_ticks = 0;
        self.target = self.home;
    }
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// A free-roaming body with an axis-aligned box centred on `pos`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub prev_pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub health: i32,
    /// Free-running animation counter, in ticks
    pub anim: u32,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, health: i32) -> Self {
        Self {
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            size,
            health,
            anim: 0,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn begin_tick(&mut self) {
        self.prev_pos = self.pos;
        self.anim = self.anim.wrapping_add(1);
    }

    /// Move by one tick of velocity
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Apply damage; returns true if this hit was the killing blow
    pub fn hit(&mut self, damage: i32) -> bool {
        let was_alive = !self.is_dead();
        self.health -= damage;
        was_alive && self.is_dead()
    }

    pub fn render_pos(&self, alpha: f32) -> Vec2 {
        self.prev_pos.lerp(self.pos, alpha.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> GridWorld {
        GridWorld::parse(&["#####", "     ", "#####"])
    }

    #[test]
    fn test_walker_buffered_turn_waits_for_opening() {
        let grid = GridWorld::parse(&["#####", "#   #", "### #", "#####"]);
        let mut w = Walker::new(TilePos::new(1, 1), Direction::Right);
        w.next_dir = Direction::Down;

        w.begin_tick();
        w.latch_turn(&grid, Mover::Player);
        assert_eq!(w.dir, Direction::Right);
        assert!(w.advance(&grid, Mover::Player));

        w.begin_tick();
        w.latch_turn(&grid, Mover::Player);
        w.advance(&grid, Mover::Player);
        assert_eq!(w.pos, TilePos::new(3, 1));

        w.begin_tick();
        w.latch_turn(&grid, Mover::Player);
        assert_eq!(w.dir, Direction::Down);
        assert!(w.advance(&grid, Mover::Player));
        assert_eq!(w.pos, TilePos::new(3, 2));
        assert_eq!(w.prev_pos, TilePos::new(3, 1));
    }

    #[test]
    fn test_walker_blocked_stays_put() {
        let grid = corridor();
        let mut w = Walker::new(TilePos::new(2, 1), Direction::Up);
        w.begin_tick();
        assert!(!w.advance(&grid, Mover::Player));
        assert_eq!(w.pos, TilePos::new(2, 1));
    }

    #[test]
    fn test_render_pos_interpolates_and_snaps_on_wrap() {
        let grid = corridor();
        let mut w = Walker::new(TilePos::new(1, 1), Direction::Left);
        w.begin_tick();
        w.advance(&grid, Mover::Player);
        assert_eq!(w.render_pos(0.5), Vec2::new(0.5, 1.0));

        w.begin_tick();
        w.advance(&grid, Mover::Player);
        assert_eq!(w.pos, TilePos::new(4, 1));
        assert_eq!(w.render_pos(0.25), Vec2::new(4.0, 1.0));
    }

    #[test]
    fn test_pursuer_mode_cycle() {
        let mut p = Pursuer::new(TilePos::new(1, 1), Direction::Left, Persona::Direct, 8000);
        assert!(!p.capture(0));

        assert!(p.scare());
        assert_eq!(p.mode, PursuerMode::Flee);
        assert_eq!(p.walker.dir, Direction::Right);

        assert!(p.capture(100));
        assert!(!p.is_active());
        // Captured pursuers ignore further scares
        assert!(!p.scare());
        assert_eq!(p.mode, PursuerMode::Captured);

        assert!(!p.try_respawn(8099, TilePos::new(2, 2)));
        assert!(p.try_respawn(8100, TilePos::new(2, 2)));
        assert_eq!(p.mode, PursuerMode::Chase);
        assert_eq!(p.walker.pos, TilePos::new(2, 2));
        assert!(!p.respawn.is_running());
    }

    #[test]
    fn test_calm_leaves_captured_alone() {
        let mut p = Pursuer::new(TilePos::new(1, 1), Direction::Left, Persona::Direct, 8000);
        p.scare();
        p.capture(0);
        p.calm();
        assert_eq!(p.mode, PursuerMode::Captured);
    }

    #[test]
    fn test_body_hit_reports_kill_once() {
        let mut b = Body::new(Vec2::ZERO, Vec2::splat(24.0), 2);
        assert!(!b.hit(1));
        assert!(b.hit(1));
        assert!(!b.hit(1));
    }

    #[test]
    fn test_body_integrate_and_interpolate() {
        let mut b = Body::new(Vec2::new(10.0, 10.0), Vec2::splat(4.0), 1)
            .with_velocity(Vec2::new(0.0, -15.0));
        b.begin_tick();
        b.integrate();
        assert_eq!(b.pos, Vec2::new(10.0, -5.0));
        assert_eq!(b.render_pos(0.0), Vec2::new(10.0, 10.0));
        assert_eq!(b.render_pos(2.0), b.pos);
    }
}
