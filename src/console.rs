//! Per-frame orchestration
//!
//! [`Console::frame`] runs one display frame in a fixed order: poll input,
//! let the state machine react, advance the simulation while Playing, apply
//! gameplay events to progression, flush progression once, then paint the
//! screen band by band.

use embedded_graphics::pixelcolor::Rgb565;

use crate::consts::BAND_HEIGHT;
use crate::input::{DebouncePolicy, FrameInput, InputAggregator};
use crate::machine::{Command, GameState, GameStateMachine, RunSummary};
use crate::persistence::KeyValueStore;
use crate::platform::{Display, InputSource, MonotonicClock, Platform};
use crate::progression::{Progression, ProgressionRecord, StoreKeys};
use crate::renderer::ui::UiScene;
use crate::renderer::{Compositor, Scene};
use crate::shop::{self, Catalogue};
use crate::sim::event::GameEvent;

/// One playable game as the console sees it
pub trait Minigame {
    fn title(&self) -> &'static str;

    /// Cosmetics this game sells
    fn catalogue(&self) -> Catalogue;

    /// Where this game's progression lives in the store
    fn store_keys(&self) -> StoreKeys;

    /// How the menus suppress repeated triggers
    fn debounce_policy(&self) -> DebouncePolicy;

    /// Skin colours, for shop swatches
    fn skins(&self) -> &'static [Rgb565];

    /// Fresh run
    fn reset(&mut self, seed: u64);

    /// The game's own on-screen pause control was hit
    fn pause_requested(&self, input: &FrameInput) -> bool;

    /// Advance the simulation by one display frame
    fn update(&mut self, input: &FrameInput, dt: f32);

    fn take_events(&mut self) -> Vec<GameEvent>;

    fn score(&self) -> u32;

    fn scene<'a>(&'a self, record: &'a ProgressionRecord) -> Box<dyn Scene + 'a>;
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub state: GameState,
    pub bands: usize,
    /// Store writes issued by the progression flush
    pub writes: usize,
}

pub struct Console<G, I, S, D, C, P>
where
    G: Minigame,
    I: InputSource,
    S: KeyValueStore,
    D: Display,
    C: MonotonicClock,
    P: Platform,
{
    game: G,
    source: I,
    input: InputAggregator,
    machine: GameStateMachine,
    progression: Progression<S>,
    display: D,
    clock: C,
    platform: P,
    compositor: Compositor,
    runs: u64,
    run_coins: u32,
}

impl<G, I, S, D, C, P> Console<G, I, S, D, C, P>
where
    G: Minigame,
    I: InputSource,
    S: KeyValueStore,
    D: Display,
    C: MonotonicClock,
    P: Platform,
{
    /// Boot: load progression once and allocate the strip
    pub fn new(game: G, source: I, store: S, display: D, clock: C, platform: P) -> Self {
        let catalogue = game.catalogue();
        let progression = Progression::load(store, game.store_keys(), &catalogue.slots());
        let machine = GameStateMachine::new(catalogue, game.debounce_policy());
        let compositor = Compositor::new(display.size(), BAND_HEIGHT as u32);
        log::info!("{} booted", game.title());
        Self {
            game,
            source,
            input: InputAggregator::new(),
            machine,
            progression,
            display,
            clock,
            platform,
            compositor,
            runs: 0,
            run_coins: 0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn source_mut(&mut self) -> &mut I {
        &mut self.source
    }

    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    pub fn progression(&self) -> &Progression<S> {
        &self.progression
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn is_degraded(&self) -> bool {
        self.compositor.is_degraded()
    }

    /// Run one display frame; `dt` is the measured frame time in seconds
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let now_ms = self.clock.now_ms();
        let input = self.input.poll(&mut self.source, now_ms);

        let before = self.machine.state();
        let pause = before == GameState::Playing && self.game.pause_requested(&input);
        if let Some(cmd) = self.machine.handle(&input, self.input.gate_mut(), pause) {
            self.execute(cmd, now_ms);
        }

        if self.machine.state().simulates() {
            // The press that started or resumed the run belongs to the menu
            let input = if self.machine.state() == before { input } else { input.consumed() };
            self.game.update(&input, dt);
            for event in self.game.take_events() {
                self.apply(event, now_ms);
            }
        }

        let writes = if self.progression.is_dirty() {
            self.progression.flush()
        } else {
            0
        };

        let bands = self.render();
        FrameReport {
            state: self.machine.state(),
            bands,
            writes,
        }
    }

    fn execute(&mut self, cmd: Command, now_ms: u64) {
        match cmd {
            Command::StartRun => {
                self.runs += 1;
                self.run_coins = 0;
                self.game.reset(now_ms.wrapping_add(self.runs));
            }
            Command::ExitToLauncher => self.platform.reboot_to_menu(),
            Command::ShopActivate(index) => {
                if let Some(item) = self.machine.catalogue().get(index) {
                    let outcome = shop::activate(&mut self.progression, item);
                    log::info!("shop: {} -> {:?}", item.name, outcome);
                }
            }
        }
    }

    fn apply(&mut self, event: GameEvent, now_ms: u64) {
        match event {
            GameEvent::CoinsEarned(coins) => {
                self.progression.add_coins(coins);
                self.run_coins += coins;
            }
            GameEvent::RunOver | GameEvent::RunWon => {
                let won = event == GameEvent::RunWon;
                let score = self.game.score();
                let new_high = self.progression.record_score(score);
                log::info!("run {} with score {score}", if won { "won" } else { "over" });
                self.machine.finish_run(
                    won,
                    RunSummary {
                        score,
                        coins: self.run_coins,
                        new_high,
                    },
                    now_ms,
                );
            }
            other => log::debug!("{other:?}"),
        }
    }

    fn render(&mut self) -> usize {
        let record = self.progression.record();
        let playfield = self
            .machine
            .state()
            .shows_playfield()
            .then(|| self.game.scene(record));
        let scene = UiScene {
            machine: &self.machine,
            record,
            title: self.game.title(),
            skins: self.game.skins(),
            playfield: playfield.as_deref(),
        };
        self.compositor.render(&scene, &mut self.display, &self.clock)
    }
}
