//! Maze chase: tile-based pursuit game
//!
//! The player clears a walled maze of collectibles while four pursuers hunt
//! it down. A bonus collectible turns the tables for a while.

mod state;
mod tick;

pub use state::MazeState;
pub use tick::{MazeInput, tick};

use super::entity::Persona;
use super::grid::{Direction, TilePos};

/// Level layout: `#` wall, `.` collectible, `o` bonus, `=` pen, space empty.
/// Row 5 is open at both ends and wraps around.
pub const LEVEL: [&str; 13] = [
    "#################",
    "#......#.#......#",
    "#o##.#.#.#.#.##o#",
    "#....#.....#....#",
    "#.#..###.###..#.#",
    " ............... ",
    "####.##===##.####",
    "#....#.###.#....#",
    "#.##.#.....#.##.#",
    "#...#.......#...#",
    "#o##.#.#.#.#.##o#",
    "#...............#",
    "#################",
];

/// Tile size and board placement on screen (px)
pub const TILE_PX: i32 = 24;
pub const BOARD_X: i32 = 10;
pub const BOARD_Y: i32 = 4;
/// HUD column starts here
pub const HUD_X: i32 = 425;

pub const PLAYER_START: TilePos = TilePos::new(8, 9);
pub const PLAYER_START_DIR: Direction = Direction::Right;
/// Seconds per tile
pub const PLAYER_TICK: f32 = 0.20;
pub const PURSUER_TICK: f32 = 0.25;

/// Pursuer homes, headings and chase personas
pub const PURSUERS: [(TilePos, Direction, Persona); 4] = [
    (TilePos::new(8, 5), Direction::Left, Persona::Direct),
    (TilePos::new(7, 6), Direction::Up, Persona::Ahead(4)),
    (TilePos::new(8, 6), Direction::Up, Persona::Ahead(1)),
    (
        TilePos::new(9, 6),
        Direction::Up,
        Persona::Shy {
            radius: 8,
            corner: TilePos::new(0, 12),
        },
    ),
];

pub const PEN_RELEASE: [TilePos; 3] = [TilePos::new(7, 6), TilePos::new(8, 6), TilePos::new(9, 6)];
pub const PEN_EXIT: TilePos = TilePos::new(8, 4);
pub const PEN_RESPAWN: TilePos = TilePos::new(8, 6);

/// Scare episode length, measured from the bonus pickup
pub const SCARE_MS: u64 = 8000;
/// Captured pursuers stay out of play this long
pub const RESPAWN_MS: u64 = 8000;
/// Flee targets are re-rolled every this many pursuer ticks
pub const FLEE_RETARGET_TICKS: u32 = 1;

pub const COLLECTIBLE_SCORE: u32 = 10;
pub const COLLECTIBLE_COINS: u32 = 1;
pub const BONUS_SCORE: u32 = 50;
pub const BONUS_COINS: u32 = 5;
pub const CAPTURE_BONUS: u32 = 200;

pub const START_LIVES: u32 = 3;
/// Clearing this level wins the run
pub const MAX_LEVEL: u32 = 5;

/// Mouth open/close period (seconds of play)
pub const MOUTH_PERIOD: f32 = 0.4;
