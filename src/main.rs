//! Strip Arcade headless host
//!
//! Runs an attract-mode session of the maze chase without hardware: an
//! autopilot presses Play and steers toward the nearest collectible, frames
//! land in an in-memory display, and progression is saved to a JSON file.
//!
//! Environment:
//! - `RUST_LOG`: log filter (default `info`)
//! - `STRIP_ARCADE_SAVE`: save file path (default `strip-arcade-save.json`)

use std::collections::VecDeque;

use strip_arcade::consts::{SCREEN_H, SCREEN_W};
use strip_arcade::games::MazeGame;
use strip_arcade::input::{ButtonSample, PointerSample, StickSample};
use strip_arcade::persistence::{JsonFileStore, KeyValueStore};
use strip_arcade::platform::{InputSource, ManualClock, MemoryDisplay, RecordingPlatform};
use strip_arcade::sim::maze::MazeState;
use strip_arcade::sim::{Direction, Mover, PursuerMode, TilePos};
use strip_arcade::{Console, GameState};

const FRAME_MS: u64 = 16;
const FRAME_DT: f32 = FRAME_MS as f32 / 1000.0;
/// Ten simulated minutes
const MAX_FRAMES: u32 = 60 * 60 * 10;
const DEFAULT_SAVE: &str = "strip-arcade-save.json";

/// Synthetic joystick and buttons driven by the host loop
#[derive(Debug, Default)]
struct Autopilot {
    heading: Direction,
    press_a: bool,
    a_was_down: bool,
}

impl Autopilot {
    fn steer(&mut self, dir: Direction) {
        self.heading = dir;
    }

    fn tap_a(&mut self) {
        self.press_a = true;
    }
}

impl InputSource for Autopilot {
    fn pointer(&mut self, _screen_w: i32, _screen_h: i32) -> PointerSample {
        PointerSample::released()
    }

    fn directional(&mut self) -> StickSample {
        let (dx, dy) = self.heading.delta();
        StickSample::from_raw(2048 + dx * 2047, 2048 + dy * 2047)
    }

    fn buttons(&mut self) -> ButtonSample {
        let down = std::mem::take(&mut self.press_a);
        let sample = ButtonSample {
            a_pressed: down,
            a_just_pressed: down && !self.a_was_down,
            ..Default::default()
        };
        self.a_was_down = down;
        sample
    }
}

/// First step of a shortest path to the nearest collectible, keeping clear
/// of chasing pursuers when possible
fn plan(state: &MazeState) -> Direction {
    let grid = &state.grid;
    let danger: Vec<TilePos> = state
        .pursuers
        .iter()
        .filter(|p| p.mode == PursuerMode::Chase)
        .map(|p| p.walker.pos)
        .collect();

    let search = |avoid: bool| -> Option<Direction> {
        let width = grid.width();
        let index = |p: TilePos| (p.y * width + p.x) as usize;
        let mut first: Vec<Option<Direction>> = vec![None; (width * grid.height()) as usize];
        let mut seen = vec![false; first.len()];
        let start = state.player.pos;
        seen[index(start)] = true;

        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            if pos != start && grid.cell(pos).is_collectible() {
                return first[index(pos)];
            }
            for dir in Direction::CARDINALS {
                if !grid.is_valid_move(pos, dir, Mover::Player) {
                    continue;
                }
                let next = grid.step(pos, dir);
                if seen[index(next)] || (avoid && danger.iter().any(|d| d.manhattan(next) <= 1)) {
                    continue;
                }
                seen[index(next)] = true;
                first[index(next)] = if pos == start { Some(dir) } else { first[index(pos)] };
                queue.push_back(next);
            }
        }
        None
    };

    search(true).or_else(|| search(false)).unwrap_or(state.player.dir)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let save_path = std::env::var("STRIP_ARCADE_SAVE").unwrap_or_else(|_| DEFAULT_SAVE.to_owned());
    let store = JsonFileStore::open_or_default(&save_path);
    log::info!("progression store at {}", store.path().display());

    let mut console = Console::new(
        MazeGame::new(),
        Autopilot::default(),
        store,
        MemoryDisplay::new(SCREEN_W as u32, SCREEN_H as u32),
        ManualClock::new(0),
        RecordingPlatform::default(),
    );
    if console.is_degraded() {
        log::warn!("running without a strip buffer");
    }

    console.source_mut().tap_a();
    let mut last = console.machine().state();
    let mut frames = 0;
    while frames < MAX_FRAMES {
        if last == GameState::Playing {
            let dir = plan(console.game().state());
            console.source_mut().steer(dir);
        }
        let report = console.frame(FRAME_DT);
        console.clock().advance(FRAME_MS);
        frames += 1;

        if report.state != last {
            log::info!("frame {frames}: {last:?} -> {:?}", report.state);
            last = report.state;
        }
        if matches!(last, GameState::GameOver | GameState::Win) {
            break;
        }
    }

    let state = console.game().state();
    let record = console.progression().record();
    log::info!(
        "attract session done after {frames} frames: score {}, level {}, lives {}",
        state.score,
        state.level,
        state.lives
    );
    log::info!(
        "progression: {} coins, high score {} (saved {})",
        record.coins,
        record.high_score,
        console.progression().store().get_int(console.progression().keys().coins, 0) == record.coins as i32
    );
    log::info!("{} bands pushed", console.display().bands_pushed);
}
