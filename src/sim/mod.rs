//! Deterministic simulation
//!
//! No rendering or platform code lives here. Given the same seed, inputs and
//! timestamps, every world advances identically.

pub mod clock;
pub mod collision;
pub mod entity;
pub mod event;
pub mod grid;
pub mod maze;
pub mod penalty;
pub mod pursuit;
pub mod shooter;

pub use clock::{TickClock, Timer};
pub use collision::{Aabb, Collider};
pub use entity::{Body, Faction, Persona, Pursuer, PursuerMode, Walker};
pub use event::GameEvent;
pub use grid::{Direction, GridCell, GridWorld, Mover, TilePos};
pub use pursuit::Pen;
