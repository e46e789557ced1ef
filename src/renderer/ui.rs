//! Menu, shop, pause and result screens
//!
//! [`UiScene`] wraps an optional playfield scene so Pause can draw its panel
//! over the frozen game.

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;

use super::palette;
use super::shapes;
use super::{Band, Scene, StripBuffer};
use crate::consts::{SCREEN_W, WIN_LOCKOUT_MS};
use crate::machine::{
    CONFIRM, GameState, GameStateMachine, MENU_EXIT, MENU_PLAY, MENU_SHOP, PAUSE_MENU, PAUSE_PANEL,
    PAUSE_RESUME,
};
use crate::progression::{CosmeticKind, ProgressionRecord};
use crate::shop::{self, LIST_TOP};
use crate::{HitRect, blink};

/// "Tap to continue" blink period on GameOver
pub const PROMPT_BLINK_MS: u64 = 500;

const CENTER_X: i32 = SCREEN_W / 2;

fn label(target: &mut StripBuffer, band: &Band, s: &str, x: i32, y: i32, color: Rgb565) {
    shapes::text(target, band, s, Point::new(x, y), &FONT_6X10, color, Alignment::Center);
}

fn heading(target: &mut StripBuffer, band: &Band, s: &str, y: i32, color: Rgb565) {
    shapes::text(target, band, s, Point::new(CENTER_X, y), &FONT_10X20, color, Alignment::Center);
}

fn button(target: &mut StripBuffer, band: &Band, r: HitRect, text: &str, fill: Rgb565, selected: bool) {
    if !band.visible(r) {
        return;
    }
    let outline = if selected { palette::UI_ACCENT } else { palette::UI_DIM };
    shapes::rounded_rect(target, band, r, 8, fill, Some(outline));
    shapes::text(
        target,
        band,
        text,
        Point::new(r.x + r.w / 2, r.y + r.h / 2 - 10),
        &FONT_10X20,
        palette::UI_TEXT,
        Alignment::Center,
    );
}

pub struct UiScene<'a> {
    pub machine: &'a GameStateMachine,
    pub record: &'a ProgressionRecord,
    pub title: &'static str,
    /// Skin colours for shop swatches
    pub skins: &'static [Rgb565],
    /// Drawn underneath while Playing or Paused
    pub playfield: Option<&'a dyn Scene>,
}

impl UiScene<'_> {
    fn draw_menu(&self, target: &mut StripBuffer, band: &Band) {
        heading(target, band, self.title, 50, palette::UI_ACCENT);
        label(target, band, &format!("HIGH SCORE {}", self.record.high_score), CENTER_X, 110, palette::UI_TEXT);
        label(target, band, &format!("COINS {}", self.record.coins), CENTER_X, 130, palette::UI_ACCENT);

        let cursor = self.machine.menu_cursor;
        button(target, band, MENU_PLAY, "PLAY", palette::UI_BUTTON, cursor == 0);
        button(target, band, MENU_SHOP, "SHOP", palette::UI_BUTTON, cursor == 1);
        button(target, band, MENU_EXIT, "X", palette::UI_DANGER, cursor == 2);
    }

    fn draw_shop(&self, target: &mut StripBuffer, band: &Band) {
        let m = self.machine;
        let catalogue = m.catalogue();

        for i in 0..catalogue.entries() {
            let r = shop::entry_rect(i, catalogue).shifted(-m.shop_scroll);
            if r.y + r.h <= LIST_TOP || !band.visible(r) {
                continue;
            }
            let selected = i == m.shop_cursor;
            let Some(item) = catalogue.get(i) else {
                button(target, band, r, "BACK", palette::UI_BUTTON, selected);
                continue;
            };

            let owned = self.record.owns(item.cosmetic);
            let equipped = self.record.equipped(item.cosmetic.kind) == item.cosmetic.slot;
            let outline = match (selected, equipped) {
                (true, _) => palette::UI_ACCENT,
                (false, true) => palette::UI_OK,
                _ => palette::UI_DIM,
            };
            shapes::rounded_rect(target, band, r, 6, palette::UI_PANEL, Some(outline));

            let swatch = match item.cosmetic.kind {
                CosmeticKind::Skin => palette::pick(self.skins, item.cosmetic.slot),
                CosmeticKind::Theme => palette::theme(item.cosmetic.slot).wall_edge,
            };
            shapes::fill_circle(target, band, Point::new(r.x + r.w / 2, r.y + 28), 30, swatch);

            let cx = r.x + r.w / 2;
            label(target, band, item.name, cx, r.y + 50, palette::UI_TEXT);
            let status = if equipped {
                "EQUIPPED".to_owned()
            } else if owned {
                "OWNED".to_owned()
            } else {
                format!("{} C", item.price)
            };
            let status_color = if owned || self.record.coins >= item.price { palette::UI_OK } else { palette::UI_DANGER };
            label(target, band, &status, cx, r.y + 70, status_color);
        }

        // Fixed header covers anything scrolled under it
        let header = HitRect::new(0, 0, SCREEN_W, LIST_TOP);
        if band.visible(header) {
            shapes::fill_rect(target, band, header, palette::UI_BACKGROUND);
            heading(target, band, "SHOP", 30, palette::UI_ACCENT);
            label(target, band, &format!("COINS {}", self.record.coins), CENTER_X, 70, palette::UI_TEXT);
            label(target, band, "A BUY/EQUIP  B BACK", CENTER_X, 90, palette::UI_DIM);
        }
    }

    fn draw_pause(&self, target: &mut StripBuffer, band: &Band) {
        shapes::rounded_rect(target, band, PAUSE_PANEL, 10, palette::UI_PANEL, Some(palette::UI_TEXT));
        heading(target, band, "PAUSED", PAUSE_PANEL.y + 15, palette::UI_TEXT);
        let cursor = self.machine.pause_cursor;
        button(target, band, PAUSE_RESUME, "RESUME", palette::UI_OK, cursor == 0);
        button(target, band, PAUSE_MENU, "MENU", palette::UI_DANGER, cursor == 1);
    }

    fn draw_result(&self, target: &mut StripBuffer, band: &Band, won: bool) {
        let summary = self.machine.summary;
        if won {
            heading(target, band, "YOU WIN!", 50, palette::UI_ACCENT);
        } else {
            heading(target, band, "GAME OVER", 50, palette::UI_DANGER);
        }
        label(target, band, &format!("SCORE {}", summary.score), CENTER_X, 110, palette::UI_TEXT);
        label(target, band, &format!("+{} COINS", summary.coins), CENTER_X, 130, palette::UI_ACCENT);
        if summary.new_high {
            label(target, band, "NEW HIGH SCORE!", CENTER_X, 150, palette::UI_OK);
        }
        label(target, band, &format!("HIGH SCORE {}", self.record.high_score), CENTER_X, 170, palette::UI_DIM);

        let locked = won && band.now_ms.saturating_sub(self.machine.entered_ms()) < WIN_LOCKOUT_MS;
        let fill = if locked { palette::UI_PANEL } else { palette::UI_BUTTON };
        button(target, band, CONFIRM, "CONTINUE", fill, false);
        if !won && blink(band.now_ms, PROMPT_BLINK_MS) {
            label(target, band, "TAP TO CONTINUE", CENTER_X, CONFIRM.y + CONFIRM.h + 15, palette::UI_TEXT);
        }
    }
}

impl Scene for UiScene<'_> {
    fn background(&self) -> Rgb565 {
        match self.playfield {
            Some(scene) => scene.background(),
            None => palette::UI_BACKGROUND,
        }
    }

    fn draw_background(&self, target: &mut StripBuffer, band: &Band) {
        if let Some(scene) = self.playfield {
            scene.draw_background(target, band);
        }
    }

    fn draw_entities(&self, target: &mut StripBuffer, band: &Band) {
        if let Some(scene) = self.playfield {
            scene.draw_entities(target, band);
        }
    }

    fn draw_overlay(&self, target: &mut StripBuffer, band: &Band) {
        if let Some(scene) = self.playfield {
            scene.draw_overlay(target, band);
        }
        match self.machine.state() {
            GameState::Menu => self.draw_menu(target, band),
            GameState::Shop => self.draw_shop(target, band),
            GameState::Paused => self.draw_pause(target, band),
            GameState::GameOver => self.draw_result(target, band, false),
            GameState::Win => self.draw_result(target, band, true),
            GameState::Playing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, DebounceGate, DebouncePolicy, FrameInput};
    use crate::platform::{Display, ManualClock, MemoryDisplay};
    use crate::renderer::Compositor;
    use crate::shop::MAZE_CATALOGUE;

    fn render(machine: &GameStateMachine, record: &ProgressionRecord, now_ms: u64) -> MemoryDisplay {
        let scene = UiScene {
            machine,
            record,
            title: "MAZE",
            skins: &palette::MAZE_SKINS,
            playfield: None,
        };
        let mut display = MemoryDisplay::new(480, 320);
        Compositor::new(display.size(), 32).render(&scene, &mut display, &ManualClock::new(now_ms));
        display
    }

    fn press_a(now_ms: u64) -> FrameInput {
        FrameInput {
            now_ms,
            a: Button { held: true, pressed: true },
            ..Default::default()
        }
    }

    #[test]
    fn test_menu_highlights_cursor() {
        let mut m = GameStateMachine::new(MAZE_CATALOGUE, DebouncePolicy::cooldown());
        let record = ProgressionRecord::default();
        let d = render(&m, &record, 0);
        // Outline sits on the rectangle's left edge, away from the rounded corners
        let (x, y) = (MENU_PLAY.x, MENU_PLAY.y + MENU_PLAY.h / 2);
        assert_eq!(d.pixel(x, y), Some(palette::UI_ACCENT));
        assert_eq!(d.pixel(MENU_SHOP.x, MENU_SHOP.y + MENU_SHOP.h / 2), Some(palette::UI_DIM));

        m.menu_cursor = 1;
        let d = render(&m, &record, 0);
        assert_eq!(d.pixel(x, y), Some(palette::UI_DIM));
    }

    #[test]
    fn test_result_prompt_blinks() {
        let mut m = GameStateMachine::new(MAZE_CATALOGUE, DebouncePolicy::cooldown());
        let mut gate = DebounceGate::default();
        m.handle(&press_a(0), &mut gate, false);
        m.finish_run(false, Default::default(), 100);
        let record = ProgressionRecord::default();

        let lit = |d: &MemoryDisplay| {
            let y = CONFIRM.y + CONFIRM.h + 15;
            (y..y + 10)
                .flat_map(|y| (140..340).map(move |x| (x, y)))
                .filter(|&(x, y)| d.pixel(x, y) == Some(palette::UI_TEXT))
                .count()
        };
        assert!(lit(&render(&m, &record, 0)) > 0);
        assert_eq!(lit(&render(&m, &record, PROMPT_BLINK_MS)), 0);
    }

    #[test]
    fn test_shop_header_covers_scrolled_items() {
        let mut m = GameStateMachine::new(MAZE_CATALOGUE, DebouncePolicy::cooldown());
        let mut gate = DebounceGate::default();
        m.handle(&FrameInput { now_ms: 0, nav: crate::sim::grid::Direction::Down, ..Default::default() }, &mut gate, false);
        m.handle(&press_a(0), &mut gate, false);
        assert_eq!(m.state(), GameState::Shop);
        m.shop_scroll = 60;
        let d = render(&m, &ProgressionRecord::default(), 0);
        // First box top edge now lies under the header band
        let first = shop::entry_rect(0, &MAZE_CATALOGUE).shifted(-60);
        assert!(first.y < LIST_TOP);
        assert_eq!(d.pixel(first.x + first.w / 2, LIST_TOP - 2), Some(palette::UI_BACKGROUND));
    }
}
