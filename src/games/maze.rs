//! Maze chase adapter

use embedded_graphics::pixelcolor::Rgb565;

use crate::console::Minigame;
use crate::input::{DebouncePolicy, FrameInput};
use crate::progression::{MAZE_KEYS, ProgressionRecord, StoreKeys};
use crate::renderer::Scene;
use crate::renderer::maze::{MazeScene, PAUSE_AREA};
use crate::renderer::palette;
use crate::shop::{Catalogue, MAZE_CATALOGUE};
use crate::sim::event::GameEvent;
use crate::sim::grid::Direction;
use crate::sim::maze::{self, MazeInput, MazeState};

#[derive(Debug, Clone)]
pub struct MazeGame {
    state: MazeState,
}

impl Default for MazeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl MazeGame {
    pub fn new() -> Self {
        Self {
            state: MazeState::new(0),
        }
    }

    pub fn state(&self) -> &MazeState {
        &self.state
    }

    fn touch_in_pause_area(input: &FrameInput) -> bool {
        input.pointer.touched && PAUSE_AREA.contains(input.pointer.x, input.pointer.y)
    }
}

impl Minigame for MazeGame {
    fn title(&self) -> &'static str {
        "MAZE CHASE"
    }

    fn catalogue(&self) -> Catalogue {
        MAZE_CATALOGUE
    }

    fn store_keys(&self) -> StoreKeys {
        MAZE_KEYS
    }

    /// Touch-driven menus: reopen once the panel has been quiet briefly
    fn debounce_policy(&self) -> DebouncePolicy {
        DebouncePolicy::release_idle()
    }

    fn skins(&self) -> &'static [Rgb565] {
        &palette::MAZE_SKINS
    }

    fn reset(&mut self, seed: u64) {
        self.state = MazeState::new(seed);
        log::info!("maze run started (seed {seed})");
    }

    fn pause_requested(&self, input: &FrameInput) -> bool {
        input.gesture.down && Self::touch_in_pause_area(input)
    }

    fn update(&mut self, input: &FrameInput, dt: f32) {
        let steer = if Self::touch_in_pause_area(input) {
            Direction::None
        } else {
            input.steer
        };
        maze::tick(&mut self.state, &MazeInput { steer }, dt, input.now_ms);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    fn score(&self) -> u32 {
        self.state.score
    }

    fn scene<'a>(&'a self, record: &'a ProgressionRecord) -> Box<dyn Scene + 'a> {
        Box::new(MazeScene::new(&self.state, record.skin, record.theme))
    }
}
