//! Static tile grid for tile-based games
//!
//! A level is a rectangle of [`GridCell`]s loaded from trusted, compiled-in
//! text rows. The grid answers the two questions movement needs:
//! - where does a step in a direction land (with horizontal wrap-around)
//! - is that step allowed for a given mover

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Movement direction on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Fixed enumeration order, also used to break distance ties
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    /// Unit step in grid space (y grows downward)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    /// Direction of the dominant axis of a displacement, `None` for zero
    pub fn dominant(dx: i32, dy: i32) -> Self {
        if dx == 0 && dy == 0 {
            Direction::None
        } else if dx.abs() > dy.abs() {
            if dx > 0 { Direction::Right } else { Direction::Left }
        } else if dy > 0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

/// Integer tile coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: TilePos) -> i32 {
        crate::manhattan((self.x, self.y), (other.x, other.y))
    }
}

/// Contents of one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridCell {
    #[default]
    Empty,
    Wall,
    Collectible,
    BonusCollectible,
    /// Containment pen: walkable by pursuers inside it, never by the player
    Restricted,
}

impl GridCell {
    /// Level glyphs: `#` wall, `.` collectible, `o` bonus, `=` pen, anything else empty
    pub fn from_glyph(glyph: char) -> Self {
        match glyph {
            '#' => GridCell::Wall,
            '.' => GridCell::Collectible,
            'o' => GridCell::BonusCollectible,
            '=' => GridCell::Restricted,
            _ => GridCell::Empty,
        }
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, GridCell::Collectible | GridCell::BonusCollectible)
    }
}

/// Who is asking to move; decides access to [`GridCell::Restricted`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mover {
    Player,
    Pursuer,
}

/// Per-level tile grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridWorld {
    width: i32,
    height: i32,
    cells: Vec<GridCell>,
    /// Collectibles still on the board
    remaining: usize,
    /// Every non-wall cell, for random flee targets
    open_cells: Vec<TilePos>,
}

impl GridWorld {
    /// Build a grid from text rows. Level data is compiled in and trusted:
    /// short rows are padded with walls rather than rejected.
    pub fn parse(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;

        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in rows {
            let mut glyphs = row.chars();
            for _ in 0..width {
                cells.push(glyphs.next().map_or(GridCell::Wall, GridCell::from_glyph));
            }
        }

        let remaining = cells.iter().filter(|c| c.is_collectible()).count();
        let open_cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| TilePos::new(x, y)))
            .filter(|p| cells[(p.y * width + p.x) as usize] != GridCell::Wall)
            .collect();

        Self {
            width,
            height,
            cells,
            remaining,
            open_cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Cell at `pos`; anything outside the grid reads as a wall
    pub fn cell(&self, pos: TilePos) -> GridCell {
        if self.in_bounds(pos) {
            self.cells[(pos.y * self.width + pos.x) as usize]
        } else {
            GridCell::Wall
        }
    }

    /// Neighbouring coordinate one step away. Columns wrap around, rows do not.
    pub fn step(&self, pos: TilePos, dir: Direction) -> TilePos {
        let (dx, dy) = dir.delta();
        let x = if self.width > 0 {
            (pos.x + dx).rem_euclid(self.width)
        } else {
            pos.x + dx
        };
        TilePos::new(x, pos.y + dy)
    }

    /// Whether `mover` may step from `pos` in `dir`.
    ///
    /// Walls block everyone. Restricted cells block the player always, and
    /// block pursuers unless they are already standing in the pen.
    pub fn is_valid_move(&self, pos: TilePos, dir: Direction, mover: Mover) -> bool {
        if dir == Direction::None {
            return false;
        }
        let next = self.step(pos, dir);
        if !self.in_bounds(next) {
            return false;
        }
        match self.cell(next) {
            GridCell::Wall => false,
            GridCell::Restricted => {
                mover == Mover::Pursuer && self.cell(pos) == GridCell::Restricted
            }
            _ => true,
        }
    }

    /// Clamp an arbitrary coordinate (e.g. a look-ahead target) into the grid
    pub fn clamp(&self, pos: TilePos) -> TilePos {
        TilePos::new(
            pos.x.clamp(0, (self.width - 1).max(0)),
            pos.y.clamp(0, (self.height - 1).max(0)),
        )
    }

    /// Consume whatever collectible sits at `pos`, leaving the cell empty
    pub fn take(&mut self, pos: TilePos) -> Option<GridCell> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = (pos.y * self.width + pos.x) as usize;
        let cell = self.cells[idx];
        if cell.is_collectible() {
            self.cells[idx] = GridCell::Empty;
            self.remaining -= 1;
            Some(cell)
        } else {
            None
        }
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.remaining
    }

    /// Uniformly random non-wall cell
    pub fn random_open_cell(&self, rng: &mut impl Rng) -> TilePos {
        if self.open_cells.is_empty() {
            return TilePos::default();
        }
        self.open_cells[rng.random_range(0..self.open_cells.len())]
    }

    /// Row-major iteration over `(pos, cell)` for one row
    pub fn row(&self, y: i32) -> impl Iterator<Item = (TilePos, GridCell)> + '_ {
        (0..self.width).map(move |x| {
            let pos = TilePos::new(x, y);
            (pos, self.cell(pos))
        })
    }
}
