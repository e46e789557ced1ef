//! Maze chase drawing

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;
use glam::Vec2;

use super::palette::{self, Theme};
use super::shapes;
use super::{Band, Scene, StripBuffer};
use crate::consts::{SCREEN_H, SCREEN_W};
use crate::sim::grid::{Direction, GridCell, TilePos};
use crate::sim::maze::{BOARD_X, BOARD_Y, HUD_X, MazeState, TILE_PX};
use crate::sim::{PursuerMode, Walker};
use crate::{HitRect, blink};

/// Bonus collectibles pulse at this period
pub const BONUS_PULSE_MS: u64 = 150;
/// Fleeing pursuers flash at this period
pub const FLEE_FLASH_MS: u64 = 250;

/// On-screen pause control in the HUD column
pub const PAUSE_AREA: HitRect = HitRect::new(HUD_X, 250, SCREEN_W - HUD_X, SCREEN_H - 250);

/// Board-space rectangle of a tile
pub fn tile_rect(pos: TilePos) -> HitRect {
    HitRect::new(BOARD_X + pos.x * TILE_PX, BOARD_Y + pos.y * TILE_PX, TILE_PX, TILE_PX)
}

/// Screen centre of an interpolated tile coordinate
fn tile_center(pos: Vec2) -> Point {
    let half = TILE_PX as f32 / 2.0;
    Point::new(
        (BOARD_X as f32 + pos.x * TILE_PX as f32 + half).round() as i32,
        (BOARD_Y as f32 + pos.y * TILE_PX as f32 + half).round() as i32,
    )
}

pub struct MazeScene<'a> {
    pub state: &'a MazeState,
    pub theme: &'static Theme,
    pub skin: Rgb565,
}

impl<'a> MazeScene<'a> {
    pub fn new(state: &'a MazeState, skin: usize, theme: usize) -> Self {
        Self {
            state,
            theme: palette::theme(theme),
            skin: palette::pick(&palette::MAZE_SKINS, skin),
        }
    }

    fn draw_cell(&self, target: &mut StripBuffer, band: &Band, pos: TilePos, cell: GridCell) {
        let r = tile_rect(pos);
        let center = Point::new(r.x + r.w / 2, r.y + r.h / 2);
        match cell {
            GridCell::Wall => {
                shapes::fill_rect(target, band, r, self.theme.wall);
                shapes::stroke_rect(target, band, r, self.theme.wall_edge, 1);
            }
            GridCell::Collectible => shapes::fill_circle(target, band, center, 4, palette::COLLECTIBLE),
            GridCell::BonusCollectible => {
                let d = if blink(band.now_ms, BONUS_PULSE_MS) { 12 } else { 8 };
                shapes::fill_circle(target, band, center, d, palette::BONUS);
            }
            GridCell::Restricted => {
                let door = HitRect::new(r.x, center.y - 2, r.w, 4);
                shapes::fill_rect(target, band, door, self.theme.door);
            }
            GridCell::Empty => {}
        }
    }

    fn draw_player(&self, target: &mut StripBuffer, band: &Band, player: &Walker) {
        let center = tile_center(player.render_pos(self.state.player_clock.alpha()));
        let d = (TILE_PX - 4) as u32;
        shapes::fill_circle(target, band, center, d, self.skin);
        if !self.state.mouth_open {
            return;
        }
        let facing = if player.dir == Direction::None { Direction::Right } else { player.dir };
        let (dx, dy) = facing.delta();
        let reach = d as i32 / 2 + 1;
        let spread = reach * 2 / 3;
        let tip = center + Point::new(dx * reach, dy * reach);
        let side = Point::new(dy.abs() * spread, dx.abs() * spread);
        shapes::fill_triangle(target, band, [center, tip + side, tip - side], self.theme.background);
    }

    fn draw_pursuer(&self, target: &mut StripBuffer, band: &Band, walker: &Walker, color: Rgb565) {
        let center = tile_center(walker.render_pos(self.state.pursuer_clock.alpha()));
        let d = TILE_PX - 4;
        let body = HitRect::new(center.x - d / 2, center.y, d, d / 2);
        if !band.visible(HitRect::new(body.x, center.y - d / 2, d, d)) {
            return;
        }
        shapes::fill_circle(target, band, center, d as u32, color);
        shapes::fill_rect(target, band, body, color);
        for ex in [-4, 4] {
            shapes::fill_circle(target, band, center + Point::new(ex, -2), 5, palette::EYES);
        }
    }

    fn draw_hud(&self, target: &mut StripBuffer, band: &Band) {
        let s = self.state;
        let x = HUD_X + (SCREEN_W - HUD_X) / 2;
        shapes::text(target, band, "SCORE", Point::new(x, 10), &FONT_6X10, palette::UI_DIM, Alignment::Center);
        shapes::text(target, band, &s.score.to_string(), Point::new(x, 24), &FONT_6X10, palette::UI_TEXT, Alignment::Center);
        shapes::text(target, band, "LVL", Point::new(x, 50), &FONT_6X10, palette::UI_DIM, Alignment::Center);
        shapes::text(target, band, &s.level.to_string(), Point::new(x, 64), &FONT_10X20, palette::UI_TEXT, Alignment::Center);

        for i in 0..s.lives as i32 {
            shapes::fill_circle(target, band, Point::new(HUD_X + 12, 110 + i * 20), 12, self.skin);
        }

        let p = PAUSE_AREA;
        let button = HitRect::new(p.x + 5, p.y + 10, p.w - 10, p.h - 20);
        shapes::rounded_rect(target, band, button, 6, palette::UI_PANEL, Some(palette::UI_DIM));
        let bar_h = button.h / 2;
        let bar_y = button.y + button.h / 4;
        let mid = button.x + button.w / 2;
        shapes::fill_rect(target, band, HitRect::new(mid - 8, bar_y, 5, bar_h), palette::UI_TEXT);
        shapes::fill_rect(target, band, HitRect::new(mid + 3, bar_y, 5, bar_h), palette::UI_TEXT);
    }
}

impl Scene for MazeScene<'_> {
    fn background(&self) -> Rgb565 {
        self.theme.background
    }

    fn draw_background(&self, target: &mut StripBuffer, band: &Band) {
        let grid = &self.state.grid;
        for y in 0..grid.height() {
            let row = HitRect::new(BOARD_X, BOARD_Y + y * TILE_PX, grid.width() * TILE_PX, TILE_PX);
            if !band.visible(row) {
                continue;
            }
            for (pos, cell) in grid.row(y) {
                self.draw_cell(target, band, pos, cell);
            }
        }
    }

    fn draw_entities(&self, target: &mut StripBuffer, band: &Band) {
        for (i, pursuer) in self.state.pursuers.iter().enumerate() {
            let color = match pursuer.mode {
                PursuerMode::Captured => continue,
                PursuerMode::Flee if blink(band.now_ms, FLEE_FLASH_MS) => palette::FLEE,
                PursuerMode::Flee => palette::FLEE_FLASH,
                PursuerMode::Chase => palette::pick(&palette::PURSUERS, i),
            };
            self.draw_pursuer(target, band, &pursuer.walker, color);
        }
        self.draw_player(target, band, &self.state.player);
    }

    fn draw_overlay(&self, target: &mut StripBuffer, band: &Band) {
        self.draw_hud(target, band);
    }
}
