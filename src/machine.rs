//! Top-level game state machine
//!
//! Exactly one [`GameState`] is active. Each state interprets the frame's
//! input differently; transitions and purchases go through the debounce gate
//! so one physical press yields one logical action.

use serde::{Deserialize, Serialize};

use crate::HitRect;
use crate::consts::*;
use crate::input::{DebounceGate, DebouncePolicy, FrameInput};
use crate::shop::{self, Catalogue};
use crate::sim::grid::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Menu,
    Shop,
    Playing,
    Paused,
    GameOver,
    Win,
}

impl GameState {
    /// Simulation, pursuit and collisions only run here
    pub fn simulates(self) -> bool {
        self == GameState::Playing
    }

    /// The playfield is drawn underneath
    pub fn shows_playfield(self) -> bool {
        matches!(self, GameState::Playing | GameState::Paused)
    }
}

/// Side effects the console must carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reset the mini-game and start a run
    StartRun,
    /// Hand control back to the launcher firmware
    ExitToLauncher,
    /// Activate shop entry `index`
    ShopActivate(usize),
}

/// Menu entries, top to bottom
pub const MENU_ENTRIES: [&str; 3] = ["Play", "Shop", "Exit"];
pub const MENU_PLAY: HitRect = HitRect::new(120, 200, 240, 50);
pub const MENU_SHOP: HitRect = HitRect::new(120, 260, 240, 50);
pub const MENU_EXIT: HitRect = HitRect::new(SCREEN_W - 80, 20, 60, 40);

pub const PAUSE_PANEL: HitRect = HitRect::new((SCREEN_W - 280) / 2, 90, 280, 170);
pub const PAUSE_RESUME: HitRect = HitRect::new(PAUSE_PANEL.x + 40, 150, 200, 35);
pub const PAUSE_MENU: HitRect = HitRect::new(PAUSE_PANEL.x + 40, 200, 200, 35);

/// Continue button on the GameOver and Win screens
pub const CONFIRM: HitRect = HitRect::new(120, 220, 240, 50);

/// Result of the last finished run, shown on GameOver/Win
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub coins: u32,
    pub new_high: bool,
}

#[derive(Debug, Clone)]
pub struct GameStateMachine {
    state: GameState,
    entered_ms: u64,
    policy: DebouncePolicy,
    catalogue: Catalogue,
    pub menu_cursor: usize,
    pub pause_cursor: usize,
    pub shop_cursor: usize,
    pub shop_scroll: i32,
    pub summary: RunSummary,
}

impl GameStateMachine {
    pub fn new(catalogue: Catalogue, policy: DebouncePolicy) -> Self {
        Self {
            state: GameState::Menu,
            entered_ms: 0,
            policy,
            catalogue,
            menu_cursor: 0,
            pause_cursor: 0,
            shop_cursor: 0,
            shop_scroll: 0,
            summary: RunSummary::default(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// When the current state was entered
    pub fn entered_ms(&self) -> u64 {
        self.entered_ms
    }

    fn enter(&mut self, next: GameState, now_ms: u64) {
        log::info!("state {:?} -> {:?}", self.state, next);
        self.state = next;
        self.entered_ms = now_ms;
        match next {
            GameState::Paused => self.pause_cursor = 0,
            GameState::Shop => {
                self.shop_cursor = 0;
                self.shop_scroll = 0;
            }
            _ => {}
        }
    }

    /// Claim the gate, then switch state
    fn transition(&mut self, gate: &mut DebounceGate, next: GameState, now_ms: u64) -> bool {
        if !gate.accept(now_ms, self.policy) {
            return false;
        }
        self.enter(next, now_ms);
        true
    }

    /// Interpret one frame of input. `pause_requested` is the mini-game's own
    /// on-screen pause control.
    pub fn handle(&mut self, input: &FrameInput, gate: &mut DebounceGate, pause_requested: bool) -> Option<Command> {
        let now = input.now_ms;
        match self.state {
            GameState::Menu => self.handle_menu(input, gate),
            GameState::Shop => self.handle_shop(input, gate),
            GameState::Playing => {
                if input.b.pressed || pause_requested {
                    self.transition(gate, GameState::Paused, now);
                }
                None
            }
            GameState::Paused => {
                self.handle_pause(input, gate);
                None
            }
            GameState::GameOver => {
                if confirm(input) {
                    self.transition(gate, GameState::Menu, now);
                }
                None
            }
            GameState::Win => {
                let locked = now.saturating_sub(self.entered_ms) < WIN_LOCKOUT_MS;
                if !locked && confirm(input) {
                    self.transition(gate, GameState::Menu, now);
                }
                None
            }
        }
    }

    fn handle_menu(&mut self, input: &FrameInput, gate: &mut DebounceGate) -> Option<Command> {
        match input.nav {
            Direction::Up => self.menu_cursor = self.menu_cursor.saturating_sub(1),
            Direction::Down => self.menu_cursor = (self.menu_cursor + 1).min(MENU_ENTRIES.len() - 1),
            _ => {}
        }

        let chosen = if input.a.pressed {
            Some(self.menu_cursor)
        } else {
            input.gesture.tap.and_then(|(x, y)| {
                [MENU_PLAY, MENU_SHOP, MENU_EXIT]
                    .iter()
                    .position(|r| r.contains(x, y))
            })
        }?;

        let now = input.now_ms;
        match chosen {
            0 => self
                .transition(gate, GameState::Playing, now)
                .then_some(Command::StartRun),
            1 => {
                self.transition(gate, GameState::Shop, now);
                None
            }
            _ => gate
                .accept(now, self.policy)
                .then_some(Command::ExitToLauncher),
        }
    }

    fn handle_shop(&mut self, input: &FrameInput, gate: &mut DebounceGate) -> Option<Command> {
        let now = input.now_ms;
        if input.b.pressed {
            self.transition(gate, GameState::Menu, now);
            return None;
        }

        if input.nav != Direction::None {
            self.shop_cursor = shop::move_cursor(self.shop_cursor, input.nav, &self.catalogue);
            self.shop_scroll = shop::scroll_to_show(self.shop_cursor, self.shop_scroll, &self.catalogue);
        }
        if let Some((_, dy)) = input.gesture.drag {
            self.shop_scroll = shop::clamp_scroll(self.shop_scroll - dy, &self.catalogue);
        }

        let chosen = if input.a.pressed {
            Some(self.shop_cursor)
        } else {
            input
                .gesture
                .tap
                .and_then(|(x, y)| shop::hit_test(x, y, self.shop_scroll, &self.catalogue))
        }?;

        if chosen == self.catalogue.back_index() {
            self.transition(gate, GameState::Menu, now);
            return None;
        }
        self.shop_cursor = chosen;
        gate.accept(now, self.policy)
            .then_some(Command::ShopActivate(chosen))
    }

    fn handle_pause(&mut self, input: &FrameInput, gate: &mut DebounceGate) {
        let now = input.now_ms;
        match input.nav {
            Direction::Up => self.pause_cursor = 0,
            Direction::Down => self.pause_cursor = 1,
            _ => {}
        }

        let chosen = if input.b.pressed {
            Some(0)
        } else if input.a.pressed {
            Some(self.pause_cursor)
        } else {
            input.gesture.tap.and_then(|(x, y)| {
                [PAUSE_RESUME, PAUSE_MENU].iter().position(|r| r.contains(x, y))
            })
        };

        match chosen {
            Some(0) => {
                self.transition(gate, GameState::Playing, now);
            }
            Some(_) => {
                if self.transition(gate, GameState::Menu, now) {
                    log::info!("run abandoned");
                }
            }
            None => {}
        }
    }

    /// The running mini-game ended. Not gated: the end of a run is not a
    /// user action.
    pub fn finish_run(&mut self, won: bool, summary: RunSummary, now_ms: u64) {
        if self.state != GameState::Playing {
            return;
        }
        self.summary = summary;
        self.enter(if won { GameState::Win } else { GameState::GameOver }, now_ms);
    }
}

/// A or a tap on the Continue button
fn confirm(input: &FrameInput) -> bool {
    input.a.pressed || input.gesture.tap.is_some_and(|(x, y)| CONFIRM.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, PointerGesture};
    use crate::shop::MAZE_CATALOGUE;

    fn machine() -> (GameStateMachine, DebounceGate) {
        (
            GameStateMachine::new(MAZE_CATALOGUE, DebouncePolicy::cooldown()),
            DebounceGate::default(),
        )
    }

    fn press_a(now_ms: u64) -> FrameInput {
        FrameInput {
            now_ms,
            a: Button { held: true, pressed: true },
            ..Default::default()
        }
    }

    fn press_b(now_ms: u64) -> FrameInput {
        FrameInput {
            now_ms,
            b: Button { held: true, pressed: true },
            ..Default::default()
        }
    }

    fn tap(now_ms: u64, x: i32, y: i32) -> FrameInput {
        FrameInput {
            now_ms,
            gesture: PointerGesture {
                tap: Some((x, y)),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn nav(now_ms: u64, dir: Direction) -> FrameInput {
        FrameInput {
            now_ms,
            nav: dir,
            ..Default::default()
        }
    }

    #[test]
    fn test_menu_start_and_pause_cycle() {
        let (mut m, mut gate) = machine();
        assert_eq!(m.handle(&press_a(0), &mut gate, false), Some(Command::StartRun));
        assert_eq!(m.state(), GameState::Playing);

        m.handle(&press_b(2000), &mut gate, false);
        assert_eq!(m.state(), GameState::Paused);

        m.handle(&press_b(4000), &mut gate, false);
        assert_eq!(m.state(), GameState::Playing);

        // On-screen pause control
        m.handle(&FrameInput { now_ms: 6000, ..Default::default() }, &mut gate, true);
        assert_eq!(m.state(), GameState::Paused);

        m.handle(&nav(6500, Direction::Down), &mut gate, false);
        assert_eq!(m.pause_cursor, 1);
        m.handle(&press_a(8000), &mut gate, false);
        assert_eq!(m.state(), GameState::Menu);
    }

    #[test]
    fn test_menu_touch_targets() {
        let (mut m, mut gate) = machine();
        m.handle(&tap(0, 200, 280), &mut gate, false);
        assert_eq!(m.state(), GameState::Shop);

        m.handle(&press_b(2000), &mut gate, false);
        assert_eq!(m.state(), GameState::Menu);

        assert_eq!(
            m.handle(&tap(4000, SCREEN_W - 50, 40), &mut gate, false),
            Some(Command::ExitToLauncher)
        );
        assert_eq!(m.state(), GameState::Menu);
    }

    #[test]
    fn test_menu_cursor() {
        let (mut m, mut gate) = machine();
        m.handle(&nav(0, Direction::Down), &mut gate, false);
        m.handle(&nav(10, Direction::Down), &mut gate, false);
        m.handle(&nav(20, Direction::Down), &mut gate, false);
        assert_eq!(m.menu_cursor, 2);
        m.handle(&nav(30, Direction::Up), &mut gate, false);
        assert_eq!(m.menu_cursor, 1);
        m.handle(&press_a(40), &mut gate, false);
        assert_eq!(m.state(), GameState::Shop);
    }

    #[test]
    fn test_ten_rapid_taps_one_transition() {
        let (mut m, mut gate) = machine();
        m.handle(&press_a(0), &mut gate, false);
        m.finish_run(false, RunSummary::default(), 5000);
        assert_eq!(m.state(), GameState::GameOver);

        // Confirm lands on Menu; the follow-up taps hit Play's rectangle but
        // are swallowed by the cool-down.
        let mut transitions = 0;
        let mut last = m.state();
        for i in 0..10 {
            let cmd = m.handle(&tap(6000 + i * 50, 240, 240), &mut gate, false);
            assert_eq!(cmd, None);
            if m.state() != last {
                transitions += 1;
                last = m.state();
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(m.state(), GameState::Menu);
    }

    #[test]
    fn test_win_lockout() {
        let (mut m, mut gate) = machine();
        m.handle(&press_a(0), &mut gate, false);
        m.finish_run(true, RunSummary { score: 10, coins: 1, new_high: true }, 5000);
        assert_eq!(m.state(), GameState::Win);

        m.handle(&press_a(5000 + WIN_LOCKOUT_MS - 1), &mut gate, false);
        assert_eq!(m.state(), GameState::Win);
        m.handle(&press_a(5000 + WIN_LOCKOUT_MS), &mut gate, false);
        assert_eq!(m.state(), GameState::Menu);
    }

    #[test]
    fn test_finish_run_only_while_playing() {
        let (mut m, _) = machine();
        m.finish_run(true, RunSummary::default(), 0);
        assert_eq!(m.state(), GameState::Menu);
    }

    #[test]
    fn test_shop_navigation_and_activation() {
        let (mut m, mut gate) = machine();
        m.handle(&tap(0, 200, 280), &mut gate, false);
        assert_eq!(m.state(), GameState::Shop);

        m.handle(&nav(100, Direction::Right), &mut gate, false);
        assert_eq!(m.shop_cursor, 1);
        assert_eq!(m.handle(&press_a(2000), &mut gate, false), Some(Command::ShopActivate(1)));
        // Second press inside the cool-down is ignored
        assert_eq!(m.handle(&press_a(2100), &mut gate, false), None);

        // Cursor onto Back keeps it visible, then leaves the shop
        for i in 0..4 {
            m.handle(&nav(3000 + i, Direction::Down), &mut gate, false);
        }
        assert_eq!(m.shop_cursor, MAZE_CATALOGUE.back_index());
        assert!(m.shop_scroll > 0);
        m.handle(&press_a(4000), &mut gate, false);
        assert_eq!(m.state(), GameState::Menu);
    }

    #[test]
    fn test_shop_drag_scrolls_without_activating() {
        let (mut m, mut gate) = machine();
        m.handle(&tap(0, 200, 280), &mut gate, false);
        let drag = FrameInput {
            now_ms: 2000,
            gesture: PointerGesture {
                drag: Some((0, -500)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(m.handle(&drag, &mut gate, false), None);
        assert_eq!(m.shop_scroll, shop::max_scroll(&MAZE_CATALOGUE));

        let drag_back = FrameInput {
            now_ms: 2100,
            gesture: PointerGesture {
                drag: Some((0, 500)),
                ..Default::default()
            },
            ..Default::default()
        };
        m.handle(&drag_back, &mut gate, false);
        assert_eq!(m.shop_scroll, 0);
    }
}
