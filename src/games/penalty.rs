//! Penalty shootout adapter

use embedded_graphics::pixelcolor::Rgb565;
use glam::Vec2;

use crate::console::Minigame;
use crate::input::{DebouncePolicy, FrameInput};
use crate::progression::{PENALTY_KEYS, ProgressionRecord, StoreKeys};
use crate::renderer::Scene;
use crate::renderer::palette;
use crate::renderer::penalty::PenaltyScene;
use crate::shop::{Catalogue, PENALTY_CATALOGUE};
use crate::sim::event::GameEvent;
use crate::sim::penalty::{self, PenaltyInput, PenaltyState};

#[derive(Debug, Clone)]
pub struct PenaltyGame {
    state: PenaltyState,
}

impl Default for PenaltyGame {
    fn default() -> Self {
        Self::new()
    }
}

impl PenaltyGame {
    pub fn new() -> Self {
        Self {
            state: PenaltyState::new(0),
        }
    }

    pub fn state(&self) -> &PenaltyState {
        &self.state
    }

    /// Stick nudges the cursor, a touch places it; A or a tap locks and kicks
    pub fn controls(input: &FrameInput) -> PenaltyInput {
        let axis = if input.stick.active { input.stick.axis() } else { Vec2::ZERO };
        let touch = input
            .pointer
            .touched
            .then(|| Vec2::new(input.pointer.x as f32, input.pointer.y as f32));
        PenaltyInput {
            axis,
            touch,
            kick: input.a.pressed || input.gesture.tap.is_some(),
        }
    }
}

impl Minigame for PenaltyGame {
    fn title(&self) -> &'static str {
        "PENALTY SHOOTOUT"
    }

    fn catalogue(&self) -> Catalogue {
        PENALTY_CATALOGUE
    }

    fn store_keys(&self) -> StoreKeys {
        PENALTY_KEYS
    }

    fn debounce_policy(&self) -> DebouncePolicy {
        DebouncePolicy::cooldown()
    }

    fn skins(&self) -> &'static [Rgb565] {
        &palette::KITS
    }

    fn reset(&mut self, seed: u64) {
        self.state = PenaltyState::new(seed);
        log::info!("shootout started (seed {seed})");
    }

    /// Taps kick, so only B pauses
    fn pause_requested(&self, _input: &FrameInput) -> bool {
        false
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        penalty::tick(&mut self.state, &Self::controls(input), dt);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    fn score(&self) -> u32 {
        self.state.score
    }

    fn scene<'a>(&'a self, record: &'a ProgressionRecord) -> Box<dyn Scene + 'a> {
        Box::new(PenaltyScene::new(&self.state, record.skin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, PointerGesture, PointerSample, StickSample};
    use crate::sim::penalty::ShotPhase;

    const DT: f32 = 1.0 / 60.0;

    fn press_a() -> FrameInput {
        FrameInput {
            a: Button { held: true, pressed: true },
            ..Default::default()
        }
    }

    #[test]
    fn test_controls_mapping() {
        let input = FrameInput {
            stick: StickSample::from_raw(0, 2048),
            pointer: PointerSample::at(200, 50),
            a: Button { held: true, pressed: false },
            ..Default::default()
        };
        let c = PenaltyGame::controls(&input);
        assert!(c.axis.x < -0.9);
        assert_eq!(c.touch, Some(Vec2::new(200.0, 50.0)));
        // Holding A does not kick again
        assert!(!c.kick);

        assert!(PenaltyGame::controls(&press_a()).kick);
        let tap = FrameInput {
            gesture: PointerGesture {
                tap: Some((240, 60)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(PenaltyGame::controls(&tap).kick);
        assert_eq!(PenaltyGame::controls(&FrameInput::default()), PenaltyInput::default());
    }

    #[test]
    fn test_a_locks_then_kicks() {
        let mut game = PenaltyGame::new();
        game.reset(4);
        game.update(&press_a(), DT);
        assert_eq!(game.state().phase, ShotPhase::Power);
        game.update(&FrameInput::default(), DT);
        game.update(&press_a(), DT);
        assert_eq!(game.state().phase, ShotPhase::Shooting);
    }

    #[test]
    fn test_full_shootout_ends() {
        let mut game = PenaltyGame::new();
        game.reset(9);
        let mut events = Vec::new();
        for _ in 0..3000 {
            let input = match game.state().phase {
                ShotPhase::Aiming | ShotPhase::Power => press_a(),
                _ => FrameInput::default(),
            };
            game.update(&input, DT);
            events.extend(game.take_events());
            if game.state().finished {
                break;
            }
        }
        let state = game.state();
        assert!(state.finished);
        assert_eq!(state.shots, 5);
        let last = events.last().copied();
        assert!(matches!(last, Some(GameEvent::RunOver | GameEvent::RunWon)));
        let awarded: u32 = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::ScoreAwarded(points) => Some(*points),
                _ => None,
            })
            .sum();
        assert_eq!(awarded, game.score());
    }
}
