//! Penalty shootout drawing

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Alignment;
use glam::Vec2;

use super::palette;
use super::shapes;
use super::{Band, Scene, StripBuffer};
use crate::HitRect;
use crate::consts::SCREEN_W;
use crate::sim::penalty::{
    Dive, GOAL_H, GOAL_W, GOAL_X, GOAL_Y, KEEPER_H, KEEPER_W, KICK_SPOT, PenaltyState, SHOTS, ShotPhase,
};

pub const HORIZON_Y: i32 = 120;
/// Field lines, closer together toward the horizon
const FIELD_LINES: [i32; 10] = [140, 165, 185, 202, 217, 230, 242, 253, 263, 272];
const BYLINE_Y: i32 = 280;
const NET_STEP: usize = 10;
const POST_W: i32 = 6;

pub const POWER_BAR: HitRect = HitRect::new((SCREEN_W - 280) / 2, 130, 280, 35);
pub const INSTRUCTIONS_Y: i32 = 105;
pub const HUD_Y: i32 = 295;
pub const CAPTION_Y: i32 = 150;
const CROSSHAIR: i32 = 18;

fn point(v: Vec2) -> Point {
    Point::new(v.x.round() as i32, v.y.round() as i32)
}

fn hline(target: &mut StripBuffer, band: &Band, y: i32, x0: i32, x1: i32, color: Rgb565) {
    shapes::line(target, band, Point::new(x0, y), Point::new(x1, y), color, 1);
}

pub struct PenaltyScene<'a> {
    pub state: &'a PenaltyState,
    pub kit: Rgb565,
}

impl<'a> PenaltyScene<'a> {
    pub fn new(state: &'a PenaltyState, kit: usize) -> Self {
        Self {
            state,
            kit: palette::pick(&palette::KITS, kit),
        }
    }

    fn alpha(&self) -> f32 {
        self.state.clock.alpha()
    }

    fn draw_goal(&self, target: &mut StripBuffer, band: &Band) {
        let left = (GOAL_X - GOAL_W / 2.0) as i32;
        let right = (GOAL_X + GOAL_W / 2.0) as i32;
        let top = GOAL_Y as i32;
        let bottom = (GOAL_Y + GOAL_H) as i32;
        let frame = HitRect::new(left - 15, top - POST_W, right - left + 30, bottom - top + 15 + POST_W);
        if !band.visible(frame) {
            return;
        }

        shapes::fill_rect(
            target,
            band,
            HitRect::new(left - 15, top, right - left + 30, bottom - top + 15),
            palette::GOAL_SHADE,
        );
        for x in (left..=right).step_by(NET_STEP) {
            shapes::line(target, band, Point::new(x, top), Point::new(x, bottom), palette::NET, 1);
        }
        for y in (top..=bottom).step_by(NET_STEP) {
            hline(target, band, y, left, right, palette::NET);
        }
        hline(target, band, top + 6, left, right, palette::GOAL_SHADE);
        hline(target, band, top + 7, left, right, palette::GOAL_SHADE);

        let h = bottom - top;
        shapes::fill_rect(target, band, HitRect::new(left - POST_W, top, POST_W, h), palette::POST);
        shapes::fill_rect(target, band, HitRect::new(right, top, POST_W, h), palette::POST);
        shapes::fill_rect(
            target,
            band,
            HitRect::new(left - POST_W, top - POST_W, right - left + 2 * POST_W, POST_W),
            palette::POST,
        );
    }

    fn draw_keeper(&self, target: &mut StripBuffer, band: &Band) {
        let feet = point(self.state.keeper.render_pos(self.alpha()));
        let (w, h) = (KEEPER_W as i32, KEEPER_H as i32);
        let body = HitRect::new(feet.x - w / 2, feet.y - h, w, h);
        if !band.visible(HitRect::new(body.x - 18, body.y - 20, w + 36, h + 20)) {
            return;
        }
        shapes::fill_rect(target, band, body, palette::KEEPER);
        shapes::fill_circle(target, band, Point::new(feet.x, feet.y - h - 8), 20, palette::SKIN_TONE);
        let arm_y = feet.y - h / 2;
        match self.state.dive {
            Dive::Left => shapes::fill_rect(target, band, HitRect::new(body.x - 18, arm_y, 18, 8), palette::KEEPER),
            Dive::Right => shapes::fill_rect(target, band, HitRect::new(body.x + w, arm_y, 18, 8), palette::KEEPER),
            Dive::Stay => {}
        }
    }

    fn draw_striker(&self, target: &mut StripBuffer, band: &Band) {
        let px = KICK_SPOT.x as i32 - 55;
        let py = KICK_SPOT.y as i32;
        if !band.visible(HitRect::new(px, py - 62, 55, 62)) {
            return;
        }
        shapes::fill_rect(target, band, HitRect::new(px, py - 38, 38, 38), self.kit);
        shapes::fill_circle(target, band, Point::new(px + 19, py - 50), 24, palette::SKIN_TONE);
        shapes::fill_rect(target, band, HitRect::new(px + 38, py - 22, 17, 10), self.kit);
    }

    fn draw_ball(&self, target: &mut StripBuffer, band: &Band) {
        let ball = &self.state.ball;
        let c = point(ball.body.render_pos(self.alpha()));
        let r = ball.radius().round() as i32;
        let d = (2 * r).max(1) as u32;
        shapes::fill_circle(target, band, c + Point::new(3, 3), d, palette::BALL_SHADOW);
        shapes::fill_circle(target, band, c, d, palette::BALL);
        shapes::stroke_circle(target, band, c, d, Rgb565::BLACK);
        if r > 6 {
            let spot = (2 * (r / 5)).max(1) as u32;
            for offset in [Point::new(-r / 3, -r / 3), Point::new(r / 3, -r / 3), Point::new(0, r / 3)] {
                shapes::fill_circle(target, band, c + offset, spot, Rgb565::BLACK);
            }
        }
    }

    fn draw_crosshair(&self, target: &mut StripBuffer, band: &Band) {
        let c = point(self.state.aim);
        let s = CROSSHAIR;
        shapes::line(target, band, c - Point::new(s, 0), c + Point::new(s, 0), palette::CROSSHAIR, 1);
        shapes::line(target, band, c - Point::new(0, s), c + Point::new(0, s), palette::CROSSHAIR, 1);
        shapes::stroke_circle(target, band, c, (2 * s) as u32, palette::CROSSHAIR);
        shapes::stroke_circle(target, band, c, (2 * (s - 3)) as u32, palette::CROSSHAIR);
        shapes::fill_circle(target, band, c, 4, palette::UI_DANGER);
    }

    fn draw_power_bar(&self, target: &mut StripBuffer, band: &Band) {
        let r = POWER_BAR;
        shapes::fill_rect(target, band, HitRect::new(r.x - 3, r.y - 3, r.w + 6, r.h + 6), Rgb565::BLACK);
        shapes::stroke_rect(target, band, r, palette::UI_TEXT, 2);
        let filled = ((r.w - 6) as f32 * self.state.power.clamp(0.0, 1.0)) as i32;
        shapes::fill_rect(
            target,
            band,
            HitRect::new(r.x + 3, r.y + 3, filled, r.h - 6),
            palette::power_color(self.state.power),
        );
        shapes::text(
            target,
            band,
            "POWER",
            Point::new(SCREEN_W / 2, r.y + r.h + 8),
            &FONT_6X10,
            palette::UI_TEXT,
            Alignment::Center,
        );
    }

    fn draw_instructions(&self, target: &mut StripBuffer, band: &Band, text: &str) {
        shapes::fill_rect(target, band, HitRect::new(0, INSTRUCTIONS_Y, SCREEN_W, 22), Rgb565::BLACK);
        shapes::text(
            target,
            band,
            text,
            Point::new(SCREEN_W / 2, INSTRUCTIONS_Y + 6),
            &FONT_6X10,
            palette::CROSSHAIR,
            Alignment::Center,
        );
    }

    fn draw_hud(&self, target: &mut StripBuffer, band: &Band) {
        let s = self.state;
        let cells = [
            (format!("SCORE {}", s.score), 10),
            (format!("SHOT {}/{SHOTS}", s.shot_number()), 190),
            (format!("GOALS {}", s.goals), 370),
        ];
        for (label, x) in &cells {
            shapes::text(target, band, label, Point::new(*x, HUD_Y), &FONT_6X10, palette::UI_TEXT, Alignment::Left);
        }
    }

    fn draw_caption(&self, target: &mut StripBuffer, band: &Band) {
        let center = SCREEN_W / 2;
        match self.state.phase {
            ShotPhase::Goal => {
                shapes::text(target, band, "GOAL!", Point::new(center, CAPTION_Y), &FONT_10X20, palette::UI_OK, Alignment::Center);
                let points = format!("+{} POINTS!", self.state.last_points);
                shapes::text(target, band, &points, Point::new(center, CAPTION_Y + 28), &FONT_6X10, palette::UI_ACCENT, Alignment::Center);
            }
            ShotPhase::Miss => {
                shapes::text(target, band, "SAVED!", Point::new(center, CAPTION_Y), &FONT_10X20, palette::UI_DANGER, Alignment::Center);
            }
            _ => {}
        }
    }
}

impl Scene for PenaltyScene<'_> {
    fn background(&self) -> Rgb565 {
        palette::GRASS
    }

    fn draw_background(&self, target: &mut StripBuffer, band: &Band) {
        shapes::fill_rect(target, band, HitRect::new(0, 0, SCREEN_W, HORIZON_Y), palette::SKY);
        hline(target, band, HORIZON_Y, 0, SCREEN_W, palette::POST);
        hline(target, band, HORIZON_Y + 1, 0, SCREEN_W, palette::HORIZON);
        for y in FIELD_LINES {
            hline(target, band, y, 0, SCREEN_W, palette::PITCH_LINE);
        }
        hline(target, band, BYLINE_Y, 0, SCREEN_W, palette::POST);

        let spot = point(KICK_SPOT);
        shapes::fill_circle(target, band, spot, 6, palette::POST);
        shapes::stroke_circle(target, band, spot, 24, palette::PITCH_LINE);
        self.draw_goal(target, band);
    }

    fn draw_entities(&self, target: &mut StripBuffer, band: &Band) {
        let phase = self.state.phase;
        if matches!(phase, ShotPhase::Aiming | ShotPhase::Power) {
            self.draw_striker(target, band);
        }
        self.draw_keeper(target, band);
        if phase == ShotPhase::Shooting {
            self.draw_ball(target, band);
        }
    }

    fn draw_overlay(&self, target: &mut StripBuffer, band: &Band) {
        match self.state.phase {
            ShotPhase::Aiming => {
                self.draw_crosshair(target, band);
                self.draw_instructions(target, band, "STICK: AIM | A: LOCK");
            }
            ShotPhase::Power => {
                self.draw_crosshair(target, band);
                self.draw_power_bar(target, band);
                self.draw_instructions(target, band, "A: SHOOT! | B: PAUSE");
            }
            _ => {}
        }
        self.draw_hud(target, band);
        self.draw_caption(target, band);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Display, ManualClock, MemoryDisplay};
    use crate::renderer::Compositor;

    fn render(state: &PenaltyState) -> MemoryDisplay {
        let mut display = MemoryDisplay::new(480, 320);
        let mut compositor = Compositor::new(display.size(), 32);
        compositor.render(&PenaltyScene::new(state, 0), &mut display, &ManualClock::new(0));
        display
    }

    fn count(d: &MemoryDisplay, area: HitRect, color: Rgb565) -> usize {
        (area.y..area.y + area.h)
            .flat_map(|y| (area.x..area.x + area.w).map(move |x| (x, y)))
            .filter(|&(x, y)| d.pixel(x, y) == Some(color))
            .count()
    }

    #[test]
    fn test_pitch_keeper_and_striker() {
        let state = PenaltyState::new(1);
        let d = render(&state);
        assert_eq!(d.pixel(5, 20), Some(palette::SKY));
        assert_eq!(d.pixel(5, 150), Some(palette::GRASS));
        assert_eq!(d.pixel(225, 76), Some(palette::KEEPER));
        // Striker shirt beside the spot while aiming
        assert_eq!(d.pixel(200, 260), Some(palette::KITS[0]));
    }

    #[test]
    fn test_ball_only_in_flight() {
        let mut state = PenaltyState::new(1);
        let at = Vec2::new(240.0, 200.0);
        state.ball.body.pos = at;
        state.ball.body.prev_pos = at;
        assert_ne!(render(&state).pixel(240, 200), Some(palette::BALL));

        state.phase = ShotPhase::Shooting;
        let d = render(&state);
        assert_eq!(d.pixel(240, 200), Some(palette::BALL));
        assert_ne!(d.pixel(200, 260), Some(palette::KITS[0]));
    }

    #[test]
    fn test_power_bar_fill_tracks_power() {
        let mut state = PenaltyState::new(1);
        state.phase = ShotPhase::Power;
        state.power = 0.5;
        let d = render(&state);
        let color = palette::power_color(0.5);
        assert_eq!(d.pixel(110, 150), Some(color));
        assert_eq!(d.pixel(300, 150), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_result_caption() {
        let mut state = PenaltyState::new(1);
        let caption = HitRect::new(180, CAPTION_Y, 120, 20);
        state.phase = ShotPhase::Goal;
        assert!(count(&render(&state), caption, palette::UI_OK) > 0);

        state.phase = ShotPhase::Miss;
        let d = render(&state);
        assert!(count(&d, caption, palette::UI_DANGER) > 0);
        assert_eq!(count(&d, caption, palette::UI_OK), 0);
    }
}
