//! Maze frame update
//!
//! Order within a frame is fixed: steering latch, timers, player tick,
//! pursuer ticks, collisions, level clear. All movement for the frame is
//! committed before any contact is evaluated.

use super::*;
use crate::sim::collision::walkers_touch;
use crate::sim::entity::PursuerMode;
use crate::sim::event::GameEvent;
use crate::sim::grid::{GridCell, Mover};
use crate::sim::pursuit;

/// Steering for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MazeInput {
    /// Requested turn; buffered until it becomes legal
    pub steer: Direction,
}

/// Advance the maze by one frame of `dt` seconds at monotonic time `now_ms`
pub fn tick(state: &mut MazeState, input: &MazeInput, dt: f32, now_ms: u64) {
    if state.finished {
        return;
    }

    if input.steer != Direction::None {
        state.player.next_dir = input.steer;
    }

    expire_timers(state, now_ms);

    if state.player_clock.advance(dt) > 0 {
        step_player(state, now_ms);
    }

    state.mouth_elapsed += dt;
    if state.mouth_elapsed >= MOUTH_PERIOD {
        state.mouth_elapsed = 0.0;
        state.mouth_open = !state.mouth_open;
    }

    if state.pursuer_clock.advance(dt) > 0 {
        step_pursuers(state);
    }

    resolve_contacts(state, now_ms);

    if !state.finished && state.grid.remaining_collectibles() == 0 {
        clear_level(state);
    }
}

fn expire_timers(state: &mut MazeState, now_ms: u64) {
    if state.scare.expired(now_ms) {
        state.scare.clear();
        for pursuer in &mut state.pursuers {
            pursuer.calm();
        }
        log::debug!("scare over at {now_ms}ms");
    }

    let respawn = state.pen.respawn;
    for pursuer in &mut state.pursuers {
        if pursuer.try_respawn(now_ms, respawn) {
            log::debug!("pursuer back in play at {:?}", respawn);
        }
    }
}

fn step_player(state: &mut MazeState, now_ms: u64) {
    let player = &mut state.player;
    player.begin_tick();
    player.latch_turn(&state.grid, Mover::Player);
    player.advance(&state.grid, Mover::Player);

    match state.grid.take(state.player.pos) {
        Some(GridCell::Collectible) => {
            state.score += COLLECTIBLE_SCORE;
            state.coins += COLLECTIBLE_COINS;
            state.events.push(GameEvent::ScoreAwarded(COLLECTIBLE_SCORE));
            state.events.push(GameEvent::CoinsEarned(COLLECTIBLE_COINS));
        }
        Some(GridCell::BonusCollectible) => {
            state.score += BONUS_SCORE;
            state.coins += BONUS_COINS;
            state.events.push(GameEvent::ScoreAwarded(BONUS_SCORE));
            state.events.push(GameEvent::CoinsEarned(BONUS_COINS));
            start_scare(state, now_ms);
        }
        _ => {}
    }
}

/// Every pursuer still in play flees and turns around; the episode is
/// timed from this pickup.
fn start_scare(state: &mut MazeState, now_ms: u64) {
    state.scare.start(now_ms);
    let scared = state.pursuers.iter_mut().map(|p| p.scare()).filter(|&hit| hit).count();
    state.events.push(GameEvent::Scare);
    log::debug!("scare at {now_ms}ms, {scared} pursuers fleeing");
}

fn step_pursuers(state: &mut MazeState) {
    for pursuer in state.pursuers.iter_mut().filter(|p| p.is_active()) {
        pursuer.walker.begin_tick();
        pursuit::steer(
            pursuer,
            &state.player,
            &state.pen,
            &state.grid,
            &mut state.rng,
            FLEE_RETARGET_TICKS,
        );
        pursuer.walker.advance(&state.grid, Mover::Pursuer);
    }
}

/// Player against every active pursuer, in index order
pub(super) fn resolve_contacts(state: &mut MazeState, now_ms: u64) {
    for idx in 0..state.pursuers.len() {
        let pursuer = &mut state.pursuers[idx];
        if !pursuer.is_active() || !walkers_touch(&state.player, &pursuer.walker) {
            continue;
        }

        if pursuer.mode == PursuerMode::Flee {
            pursuer.capture(now_ms);
            state.score += CAPTURE_BONUS;
            state.events.push(GameEvent::Captured(idx));
            state.events.push(GameEvent::ScoreAwarded(CAPTURE_BONUS));
            log::debug!("pursuer {idx} captured at {now_ms}ms");
            continue;
        }

        state.lives = state.lives.saturating_sub(1);
        state.events.push(GameEvent::LifeLost(state.lives));
        if state.lives == 0 {
            state.finished = true;
            state.events.push(GameEvent::RunOver);
            log::info!("maze run over: score {}, level {}", state.score, state.level);
        } else {
            state.reset_positions();
        }
        // Positions changed: remaining contacts this frame are stale
        return;
    }
}

fn clear_level(state: &mut MazeState) {
    let next = state.level + 1;
    if next > MAX_LEVEL {
        state.finished = true;
        state.events.push(GameEvent::RunWon);
        log::info!("maze cleared all {MAX_LEVEL} levels: score {}", state.score);
        return;
    }
    state.load_level(next);
    state.events.push(GameEvent::LevelCleared(next));
    log::info!("maze level {next}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::TilePos;
    use proptest::prelude::*;

    fn frame(state: &mut MazeState, dt: f32, now_ms: u64) {
        tick(state, &MazeInput::default(), dt, now_ms);
    }

    #[test]
    fn test_level_layout() {
        let s = MazeState::new(1);
        assert_eq!(s.grid.width(), 17);
        assert_eq!(s.grid.height(), 13);
        assert_eq!(s.grid.cell(TilePos::new(1, 2)), GridCell::BonusCollectible);
        assert_eq!(s.grid.cell(TilePos::new(8, 6)), GridCell::Restricted);
        assert_ne!(s.grid.cell(PLAYER_START), GridCell::Wall);
        assert_ne!(s.grid.cell(TilePos::new(3, 4)), GridCell::Wall);
        assert_ne!(s.grid.cell(PEN_EXIT), GridCell::Wall);
    }

    #[test]
    fn test_player_moves_one_tile_per_interval() {
        let mut s = MazeState::new(1);
        frame(&mut s, 0.1, 100);
        assert_eq!(s.player.pos, PLAYER_START);
        frame(&mut s, 0.1, 200);
        assert_eq!(s.player.pos, TilePos::new(9, 9));
        assert_eq!(s.player.prev_pos, PLAYER_START);
        assert_eq!(s.score, COLLECTIBLE_SCORE);
        assert_eq!(s.take_events(), vec![
            GameEvent::ScoreAwarded(COLLECTIBLE_SCORE),
            GameEvent::CoinsEarned(COLLECTIBLE_COINS),
        ]);
    }

    #[test]
    fn test_pursuers_leave_pen() {
        let mut s = MazeState::new(3);
        let mut now = 0;
        for _ in 0..10 {
            now += 100;
            frame(&mut s, 0.1, now);
        }
        for p in s.pursuers.iter().filter(|p| p.is_active()) {
            assert_ne!(s.grid.cell(p.walker.pos), GridCell::Wall);
        }
        assert!(s.pursuers.iter().any(|p| s.grid.cell(p.walker.pos) != GridCell::Restricted));
    }

    #[test]
    fn test_bonus_capture_and_respawn_scenario() {
        let mut s = MazeState::new(42);
        s.player.place(TilePos::new(1, 3), Direction::Up);
        let headings: Vec<Direction> = s.pursuers.iter().map(|p| p.walker.dir).collect();

        frame(&mut s, 0.1, 1000);
        frame(&mut s, 0.1, 1100);
        assert_eq!(s.player.pos, TilePos::new(1, 2));
        assert!(s.is_scared());
        for (p, before) in s.pursuers.iter().zip(&headings) {
            assert_eq!(p.mode, PursuerMode::Flee);
            assert_eq!(p.walker.dir, before.opposite());
        }

        // Player and a fleeing pursuer meet at (3,4)
        let score_before = s.score;
        s.player.place(TilePos::new(3, 4), Direction::Down);
        s.pursuers[1].walker.place(TilePos::new(3, 4), Direction::Up);
        frame(&mut s, 0.0, 1300);
        assert_eq!(s.pursuers[1].mode, PursuerMode::Captured);
        assert_eq!(s.score, score_before + CAPTURE_BONUS);
        assert!(s.events.contains(&GameEvent::Captured(1)));
        assert_eq!(s.lives, START_LIVES);

        // Flee ends 8000ms after the pickup, not after the capture
        frame(&mut s, 0.0, 1100 + SCARE_MS - 1);
        assert_eq!(s.pursuers[0].mode, PursuerMode::Flee);
        frame(&mut s, 0.0, 1100 + SCARE_MS);
        assert_eq!(s.pursuers[0].mode, PursuerMode::Chase);
        assert_eq!(s.pursuers[2].mode, PursuerMode::Chase);
        assert_eq!(s.pursuers[1].mode, PursuerMode::Captured);

        frame(&mut s, 0.0, 1300 + RESPAWN_MS - 1);
        assert_eq!(s.pursuers[1].mode, PursuerMode::Captured);
        frame(&mut s, 0.0, 1300 + RESPAWN_MS);
        assert_eq!(s.pursuers[1].mode, PursuerMode::Chase);
        assert_eq!(s.pursuers[1].walker.pos, PEN_RESPAWN);
    }

    #[test]
    fn test_swap_with_chaser_costs_a_life() {
        let mut s = MazeState::new(5);
        s.player.place(TilePos::new(4, 5), Direction::Right);
        s.player.begin_tick();
        s.player.pos = TilePos::new(5, 5);
        s.pursuers[0].walker.place(TilePos::new(5, 5), Direction::Left);
        s.pursuers[0].walker.begin_tick();
        s.pursuers[0].walker.pos = TilePos::new(4, 5);

        frame(&mut s, 0.0, 10);
        assert_eq!(s.lives, START_LIVES - 1);
        assert_eq!(s.player.pos, PLAYER_START);
        assert_eq!(s.pursuers[0].walker.pos, PURSUERS[0].0);
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut s = MazeState::new(5);
        s.lives = 1;
        s.pursuers[0].walker.place(PLAYER_START, Direction::Left);
        frame(&mut s, 0.0, 10);
        assert!(s.finished);
        assert!(s.events.contains(&GameEvent::RunOver));

        // Finished runs ignore further frames
        let score = s.score;
        frame(&mut s, 0.2, 20);
        assert_eq!(s.score, score);
    }

    #[test]
    fn test_clearing_board_advances_level_then_wins() {
        let mut s = MazeState::new(9);
        let next = TilePos::new(9, 9);
        for y in 0..s.grid.height() {
            for x in 0..s.grid.width() {
                let pos = TilePos::new(x, y);
                if pos != next {
                    s.grid.take(pos);
                }
            }
        }
        assert_eq!(s.grid.remaining_collectibles(), 1);
        frame(&mut s, 0.1, 100);
        frame(&mut s, 0.1, 200);
        assert_eq!(s.level, 2);
        assert!(s.events.contains(&GameEvent::LevelCleared(2)));
        assert!(s.grid.remaining_collectibles() > 1);

        s.level = MAX_LEVEL;
        for y in 0..s.grid.height() {
            for x in 0..s.grid.width() {
                s.grid.take(TilePos::new(x, y));
            }
        }
        frame(&mut s, 0.0, 300);
        assert!(s.finished);
        assert!(s.events.contains(&GameEvent::RunWon));
    }

    #[test]
    fn test_life_lost_ends_scare() {
        let mut s = MazeState::new(2);
        s.player.place(TilePos::new(1, 3), Direction::Up);
        frame(&mut s, 0.1, 100);
        frame(&mut s, 0.1, 200);
        assert!(s.is_scared());

        // A pursuer that already calmed down is still deadly
        s.pursuers[0].calm();
        let pos = s.player.pos;
        s.pursuers[0].walker.place(pos, Direction::Left);
        frame(&mut s, 0.0, 300);
        assert_eq!(s.lives, START_LIVES - 1);
        assert!(!s.is_scared());
        assert!(s.pursuers.iter().all(|p| p.mode == PursuerMode::Chase));
    }

    proptest! {
        #[test]
        fn prop_flee_ends_within_one_frame_of_duration(
            pickup_at in 0u64..10_000,
            steps in proptest::collection::vec(1u64..60, 1..400),
        ) {
            let mut s = MazeState::new(11);
            // Keep everyone apart so no contact interferes
            s.player.place(TilePos::new(1, 11), Direction::Right);
            s.scare.start(pickup_at);
            for p in &mut s.pursuers {
                p.scare();
            }

            let mut now = pickup_at;
            let mut prev = now;
            let mut ended_at = None;
            for step in steps {
                now += step;
                frame(&mut s, 0.0, now);
                if ended_at.is_none() && s.pursuers[0].mode == PursuerMode::Chase {
                    ended_at = Some((prev, now));
                }
                prev = now;
            }

            if let Some((before, at)) = ended_at {
                prop_assert!(at - pickup_at >= SCARE_MS);
                prop_assert!(before - pickup_at < SCARE_MS);
            } else {
                prop_assert!(now - pickup_at < SCARE_MS);
            }
        }
    }
}
