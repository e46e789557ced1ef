//! Space shooter drawing

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;
use glam::Vec2;

use super::palette;
use super::shapes;
use super::{Band, Scene, StripBuffer};
use crate::HitRect;
use crate::sim::Body;
use crate::sim::Faction;
use crate::sim::shooter::{BOSS_HEALTH, BannerText, EXPLOSION_LIFE, FIELD_H, FIELD_W, PLAYER_HEALTH, PickupKind, ShooterState};

/// Pickups blink at this period
pub const PICKUP_BLINK_MS: u64 = 200;

fn point(v: Vec2) -> Point {
    Point::new(v.x.round() as i32, v.y.round() as i32)
}

/// Pixel rectangle of a body centred at `center`
fn body_rect(center: Vec2, size: Vec2) -> HitRect {
    HitRect::new(
        (center.x - size.x / 2.0).round() as i32,
        (center.y - size.y / 2.0).round() as i32,
        size.x.round() as i32,
        size.y.round() as i32,
    )
}

/// Horizontal bar filled in proportion to `value / max`
fn meter(target: &mut StripBuffer, band: &Band, r: HitRect, value: i32, max: i32, color: Rgb565) {
    if !band.visible(r) {
        return;
    }
    shapes::fill_rect(target, band, r, palette::UI_PANEL);
    let filled = r.w * value.clamp(0, max) / max.max(1);
    shapes::fill_rect(target, band, HitRect::new(r.x, r.y, filled, r.h), color);
}

pub struct ShooterScene<'a> {
    pub state: &'a ShooterState,
    pub hull: Rgb565,
}

impl<'a> ShooterScene<'a> {
    pub fn new(state: &'a ShooterState, skin: usize) -> Self {
        Self {
            state,
            hull: palette::pick(&palette::SHIP_SKINS, skin),
        }
    }

    fn alpha(&self) -> f32 {
        self.state.clock.alpha()
    }

    fn draw_ship(&self, target: &mut StripBuffer, band: &Band, body: &Body) {
        let c = body.render_pos(self.alpha());
        let r = body_rect(c, body.size);
        if !band.visible(r) {
            return;
        }
        let nose = Point::new(r.x + r.w / 2, r.y);
        let left = Point::new(r.x, r.y + r.h);
        let right = Point::new(r.x + r.w, r.y + r.h);
        shapes::fill_triangle(target, band, [nose, left, right], self.hull);
        shapes::fill_circle(target, band, point(c) + Point::new(0, 4), 8, palette::RAPID);
        // Engine flicker
        if body.anim % 4 < 2 {
            let flame = HitRect::new(r.x + r.w / 2 - 3, r.y + r.h, 6, 5);
            shapes::fill_rect(target, band, flame, palette::EXPLOSION);
        }
    }

    fn draw_enemy(&self, target: &mut StripBuffer, band: &Band, body: &Body, color: Rgb565) {
        let c = body.render_pos(self.alpha());
        let r = body_rect(c, body.size);
        if !band.visible(r) {
            return;
        }
        let tail = Point::new(r.x + r.w / 2, r.y + r.h);
        shapes::fill_triangle(
            target,
            band,
            [Point::new(r.x, r.y), Point::new(r.x + r.w, r.y), tail],
            color,
        );
        shapes::fill_circle(target, band, point(c), (r.w / 3) as u32, palette::UI_TEXT);
    }

    fn draw_hud(&self, target: &mut StripBuffer, band: &Band) {
        let s = self.state;
        let top = HitRect::new(0, 0, 480, 16);
        if band.visible(top) {
            shapes::text(target, band, &format!("SCORE {}", s.score), Point::new(6, 3), &FONT_6X10, palette::UI_TEXT, Alignment::Left);
            shapes::text(target, band, &format!("WAVE {}", s.wave), Point::new(240, 3), &FONT_6X10, palette::UI_DIM, Alignment::Center);
            meter(target, band, HitRect::new(370, 4, 100, 8), s.player.health, PLAYER_HEALTH, palette::HEAL);
        }
        if s.rapid_fire.is_running() {
            shapes::text(target, band, "RAPID", Point::new(474, 18), &FONT_6X10, palette::RAPID, Alignment::Right);
        }
        if let Some(boss) = &s.boss {
            meter(target, band, HitRect::new(140, 20, 200, 6), boss.body.health, BOSS_HEALTH, palette::BOSS);
        }
    }
}

impl Scene for ShooterScene<'_> {
    fn background(&self) -> Rgb565 {
        palette::SPACE
    }

    fn draw_background(&self, target: &mut StripBuffer, band: &Band) {
        for star in &self.state.stars {
            let r = HitRect::new(star.pos.x as i32, star.pos.y as i32, 1, 1 + (star.speed > 2.0) as i32);
            shapes::fill_rect(target, band, r, palette::STAR);
        }
    }

    fn draw_entities(&self, target: &mut StripBuffer, band: &Band) {
        let s = self.state;
        let alpha = self.alpha();

        for pickup in &s.pickups {
            let color = match pickup.kind {
                PickupKind::Heal => palette::HEAL,
                PickupKind::RapidFire => palette::RAPID,
            };
            let c = pickup.body.render_pos(alpha);
            let d = if crate::blink(band.now_ms, PICKUP_BLINK_MS) { pickup.body.size.x } else { pickup.body.size.x - 4.0 };
            shapes::fill_circle(target, band, point(c), d as u32, color);
        }

        for enemy in &s.enemies {
            let color = if enemy.body.health > 1 { palette::ENEMY_HURT } else { palette::ENEMY };
            self.draw_enemy(target, band, &enemy.body, color);
        }
        if let Some(boss) = &s.boss {
            self.draw_enemy(target, band, &boss.body, palette::BOSS);
        }

        for shot in &s.projectiles {
            let color = match shot.owner {
                Faction::Player => palette::PLAYER_SHOT,
                Faction::Enemy => palette::ENEMY_SHOT,
            };
            let r = body_rect(shot.body.render_pos(alpha), shot.body.size);
            shapes::fill_rect(target, band, r, color);
        }

        if !s.player.is_dead() {
            self.draw_ship(target, band, &s.player);
        }

        for boom in &s.explosions {
            let grown = (EXPLOSION_LIFE - boom.life.min(EXPLOSION_LIFE)) as u32;
            shapes::stroke_circle(target, band, point(boom.pos), 6 + grown, palette::EXPLOSION);
        }
    }

    fn draw_overlay(&self, target: &mut StripBuffer, band: &Band) {
        self.draw_hud(target, band);
        if let Some(banner) = self.state.banner
            && banner.is_showing(band.now_ms)
        {
            let color = match banner.text {
                BannerText::Wave(_) => palette::UI_TEXT,
                BannerText::FinalBoss => palette::BOSS,
            };
            let center = Point::new((FIELD_W / 2.0) as i32, (FIELD_H / 2.0) as i32 - 10);
            shapes::text(target, band, &banner.text.to_string(), center, &FONT_10X20, color, Alignment::Center);
        }
    }
}
