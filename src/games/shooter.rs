//! Space shooter adapter

use embedded_graphics::pixelcolor::Rgb565;
use glam::Vec2;

use crate::console::Minigame;
use crate::input::{DebouncePolicy, FrameInput};
use crate::progression::{SHOOTER_KEYS, ProgressionRecord, StoreKeys};
use crate::renderer::Scene;
use crate::renderer::palette;
use crate::renderer::shooter::ShooterScene;
use crate::shop::{Catalogue, SHOOTER_CATALOGUE};
use crate::sim::event::GameEvent;
use crate::sim::shooter::{self, ShooterInput, ShooterState};

#[derive(Debug, Clone)]
pub struct ShooterGame {
    state: ShooterState,
}

impl Default for ShooterGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ShooterGame {
    pub fn new() -> Self {
        Self {
            state: ShooterState::new(0),
        }
    }

    pub fn state(&self) -> &ShooterState {
        &self.state
    }

    /// Stick steers, a touch drags the ship and fires, A held fires
    pub fn controls(input: &FrameInput) -> ShooterInput {
        let axis = if input.stick.active { input.stick.axis() } else { Vec2::ZERO };
        let touch = input
            .pointer
            .touched
            .then(|| Vec2::new(input.pointer.x as f32, input.pointer.y as f32));
        ShooterInput {
            axis,
            touch,
            fire: input.a.held,
        }
    }
}

impl Minigame for ShooterGame {
    fn title(&self) -> &'static str {
        "STAR SHOOTER"
    }

    fn catalogue(&self) -> Catalogue {
        SHOOTER_CATALOGUE
    }

    fn store_keys(&self) -> StoreKeys {
        SHOOTER_KEYS
    }

    fn debounce_policy(&self) -> DebouncePolicy {
        DebouncePolicy::cooldown()
    }

    fn skins(&self) -> &'static [Rgb565] {
        &palette::SHIP_SKINS
    }

    fn reset(&mut self, seed: u64) {
        self.state = ShooterState::new(seed);
        log::info!("shooter run started (seed {seed})");
    }

    /// The whole screen steers the ship; only B pauses
    fn pause_requested(&self, _input: &FrameInput) -> bool {
        false
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        shooter::tick(&mut self.state, &Self::controls(input), dt, input.now_ms);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    fn score(&self) -> u32 {
        self.state.score
    }

    fn scene<'a>(&'a self, record: &'a ProgressionRecord) -> Box<dyn Scene + 'a> {
        Box::new(ShooterScene::new(&self.state, record.skin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, PointerSample, StickSample};

    #[test]
    fn test_controls_mapping() {
        let input = FrameInput {
            stick: StickSample::from_raw(4095, 2048),
            pointer: PointerSample::at(100, 200),
            a: Button { held: true, pressed: false },
            ..Default::default()
        };
        let c = ShooterGame::controls(&input);
        assert!(c.axis.x > 0.9);
        assert_eq!(c.axis.y, 0.0);
        assert_eq!(c.touch, Some(Vec2::new(100.0, 200.0)));
        assert!(c.fire);

        let idle = ShooterGame::controls(&FrameInput::default());
        assert_eq!(idle, ShooterInput::default());
    }

    #[test]
    fn test_first_frame_spawns_wave() {
        let mut game = ShooterGame::new();
        game.reset(11);
        game.update(&FrameInput::default(), 1.0 / 60.0);
        assert_eq!(game.state().wave, 1);
        assert!(game.take_events().contains(&GameEvent::LevelCleared(1)));
    }
}
