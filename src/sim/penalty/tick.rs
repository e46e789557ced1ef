//! Shootout update
//!
//! The kick button is handled once per frame; everything else advances in
//! fixed 60 Hz ticks. During a shot the keeper moves before the ball, then
//! an arrived ball is judged against the keeper's reach.

use glam::Vec2;
use rand::Rng;

use super::*;
use crate::sim::event::GameEvent;

/// Controls for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PenaltyInput {
    /// Analog stick, each axis in [-1, 1]
    pub axis: Vec2,
    /// Touch point; places the aim cursor directly
    pub touch: Option<Vec2>,
    /// Lock aim, then kick
    pub kick: bool,
}

/// Advance by one frame
pub fn tick(state: &mut PenaltyState, input: &PenaltyInput, dt: f32) {
    if state.finished {
        return;
    }
    if input.kick {
        press(state);
    }
    if state.phase == ShotPhase::Aiming
        && let Some(touch) = input.touch
    {
        state.aim = clamp_aim(touch);
    }

    let steps = state.clock.advance(dt);
    for _ in 0..steps {
        step(state, input);
        if state.finished {
            break;
        }
    }
}

fn clamp_aim(p: Vec2) -> Vec2 {
    let bounds = aim_bounds();
    p.clamp(bounds.min, bounds.max)
}

fn press(state: &mut PenaltyState) {
    match state.phase {
        ShotPhase::Aiming => {
            state.phase = ShotPhase::Power;
            state.power = 0.0;
            state.power_dir = 1.0;
        }
        ShotPhase::Power => kick(state),
        _ => {}
    }
}

fn kick(state: &mut PenaltyState) {
    state.phase = ShotPhase::Shooting;
    state.ball.target = state.aim;
    state.dive = choose_dive(&mut state.rng, state.aim.x);
    log::debug!(
        "kick at ({:.0}, {:.0}) power {:.2}, keeper {:?}",
        state.aim.x,
        state.aim.y,
        state.power,
        state.dive
    );
}

/// The keeper reads the shot `KEEPER_SKILL` percent of the time; otherwise
/// it stays put or guesses the wrong side
pub fn choose_dive(rng: &mut impl Rng, aim_x: f32) -> Dive {
    if rng.random_range(0..100) < KEEPER_SKILL {
        if aim_x < GOAL_X - SIDE_MARGIN {
            Dive::Left
        } else if aim_x > GOAL_X + SIDE_MARGIN {
            Dive::Right
        } else if rng.random_bool(0.5) {
            Dive::Left
        } else {
            Dive::Right
        }
    } else if rng.random_bool(0.5) {
        Dive::Stay
    } else if aim_x < GOAL_X {
        Dive::Right
    } else {
        Dive::Left
    }
}

fn step(state: &mut PenaltyState, input: &PenaltyInput) {
    state.ticks += 1;
    match state.phase {
        ShotPhase::Aiming => {
            if input.axis != Vec2::ZERO {
                state.aim = clamp_aim(state.aim + input.axis.clamp(Vec2::splat(-1.0), Vec2::ONE) * AIM_SPEED);
            }
        }
        ShotPhase::Power => {
            state.power += state.power_dir * POWER_RATE * SIM_DT;
            if state.power >= 1.0 {
                state.power = 1.0;
                state.power_dir = -1.0;
            } else if state.power <= 0.0 {
                state.power = 0.0;
                state.power_dir = 1.0;
            }
        }
        ShotPhase::Shooting => {
            state.dive_step();
            if move_ball(state) {
                resolve(state);
            }
        }
        ShotPhase::Goal | ShotPhase::Miss => {
            state.result_ticks = state.result_ticks.saturating_sub(1);
            if state.result_ticks == 0 {
                next_shot(state);
            }
        }
    }
}

/// Returns true once the ball has reached its target
fn move_ball(state: &mut PenaltyState) -> bool {
    let speed = (BALL_SPEED + state.power * BALL_POWER_SPEED) * SIM_DT;
    let ball = &mut state.ball;
    ball.body.begin_tick();

    let to_target = ball.target - ball.body.pos;
    let dist = to_target.length();
    if dist < ARRIVE_DIST {
        ball.body.pos = ball.target;
        return true;
    }
    ball.body.pos += to_target / dist * speed.min(dist);
    let progress = ((KICK_SPOT.y - ball.body.pos.y) / (KICK_SPOT.y - GOAL_Y)).clamp(0.0, 1.0);
    ball.scale = 1.0 - progress * (1.0 - BALL_MIN_SCALE);
    false
}

/// Judge the arrived ball: wide or inside the keeper's reach is saved
fn resolve(state: &mut PenaltyState) {
    let at = state.ball.body.pos;
    let scored = goal_mouth().contains(at) && !state.keeper_reach().contains(at);
    state.result_ticks = RESULT_TICKS;
    if scored {
        state.phase = ShotPhase::Goal;
        state.goals += 1;
        state.last_points = shot_score(state.power);
        state.score += state.last_points;
        state.events.push(GameEvent::ScoreAwarded(state.last_points));
        state.events.push(GameEvent::CoinsEarned(GOAL_COINS));
    } else {
        state.phase = ShotPhase::Miss;
        state.last_points = 0;
    }
    log::debug!("shot {}: {:?}", state.shot_number(), state.phase);
}

fn next_shot(state: &mut PenaltyState) {
    state.shots += 1;
    if state.shots >= SHOTS {
        finish(state);
    } else {
        state.reset_shot();
    }
}

fn finish(state: &mut PenaltyState) {
    state.finished = true;
    let won = state.goals == SHOTS;
    state
        .events
        .push(if won { GameEvent::RunWon } else { GameEvent::RunOver });
    log::info!(
        "shootout {}: {} of {SHOTS} scored, score {}",
        if won { "perfect" } else { "over" },
        state.goals,
        state.score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run(state: &mut PenaltyState, input: &PenaltyInput, ticks: u32) {
        for _ in 0..ticks {
            step(state, input);
        }
    }

    fn kick_now() -> PenaltyInput {
        PenaltyInput {
            kick: true,
            ..Default::default()
        }
    }

    /// Take one shot at `aim` against a keeper committed to `dive`
    fn shoot(state: &mut PenaltyState, aim: Vec2, dive: Dive) {
        state.aim = aim;
        press(state);
        run(state, &PenaltyInput::default(), 12);
        press(state);
        state.dive = dive;
        let mut guard = 0;
        while state.phase == ShotPhase::Shooting && guard < 600 {
            step(state, &PenaltyInput::default());
            guard += 1;
        }
    }

    #[test]
    fn test_power_oscillates_between_bounds() {
        let mut s = PenaltyState::new(1);
        tick(&mut s, &kick_now(), 0.0);
        assert_eq!(s.phase, ShotPhase::Power);

        run(&mut s, &PenaltyInput::default(), 12);
        assert!((s.power - 0.5).abs() < 0.01);
        assert_eq!(s.power_dir, 1.0);

        run(&mut s, &PenaltyInput::default(), 18);
        assert_eq!(s.power_dir, -1.0);
        assert!(s.power > 0.7 && s.power < 1.0);

        // Drained to zero and filling again
        run(&mut s, &PenaltyInput::default(), 30);
        assert_eq!(s.power_dir, 1.0);
        assert!(s.power > 0.4 && s.power < 0.55);
    }

    #[test]
    fn test_aim_follows_stick_and_stays_in_goal() {
        let mut s = PenaltyState::new(1);
        let left = PenaltyInput {
            axis: Vec2::new(-1.0, 0.0),
            ..Default::default()
        };
        run(&mut s, &left, 2);
        assert_eq!(s.aim.x, GOAL_X - 2.0 * AIM_SPEED);
        run(&mut s, &left, 100);
        assert_eq!(s.aim.x, aim_bounds().min.x);

        tick(
            &mut s,
            &PenaltyInput {
                touch: Some(Vec2::new(400.0, 50.0)),
                ..Default::default()
            },
            0.0,
        );
        assert_eq!(s.aim, Vec2::new(aim_bounds().max.x, 50.0));
    }

    #[test]
    fn test_keeper_in_the_way_saves() {
        let mut s = PenaltyState::new(1);
        shoot(&mut s, Vec2::new(GOAL_X, 60.0), Dive::Stay);
        assert_eq!(s.phase, ShotPhase::Miss);
        assert_eq!(s.goals, 0);
        assert_eq!(s.score, 0);
        assert!(s.events.is_empty());
    }

    #[test]
    fn test_wrong_way_dive_concedes() {
        let mut s = PenaltyState::new(1);
        shoot(&mut s, Vec2::new(290.0, 50.0), Dive::Left);
        assert_eq!(s.phase, ShotPhase::Goal);
        assert_eq!(s.goals, 1);
        assert_eq!(s.score, shot_score(s.power));
        assert!(s.events.contains(&GameEvent::ScoreAwarded(s.last_points)));
        assert!(s.events.contains(&GameEvent::CoinsEarned(GOAL_COINS)));
        assert!(s.keeper.pos.x < GOAL_X);
    }

    #[test]
    fn test_ball_shrinks_in_flight() {
        let mut s = PenaltyState::new(1);
        s.aim = Vec2::new(GOAL_X, 60.0);
        press(&mut s);
        press(&mut s);
        run(&mut s, &PenaltyInput::default(), 10);
        assert_eq!(s.phase, ShotPhase::Shooting);
        assert!(s.ball.scale < 1.0 && s.ball.scale > BALL_MIN_SCALE);
        assert!(s.ball.body.pos.y < KICK_SPOT.y);
    }

    #[test]
    fn test_five_shots_end_the_run() {
        let mut s = PenaltyState::new(1);
        for n in 0..SHOTS {
            assert_eq!(s.shot_number(), n + 1);
            shoot(&mut s, Vec2::new(GOAL_X, 60.0), Dive::Stay);
            run(&mut s, &PenaltyInput::default(), RESULT_TICKS - 1);
            assert!(s.phase.is_result());
            run(&mut s, &PenaltyInput::default(), 1);
        }
        assert!(s.finished);
        assert_eq!(s.shots, SHOTS);
        assert_eq!(s.events, vec![GameEvent::RunOver]);

        // Nothing moves once the run is over
        tick(&mut s, &kick_now(), 1.0);
        assert_eq!(s.phase, ShotPhase::Miss);
    }

    #[test]
    fn test_perfect_round_wins() {
        let mut s = PenaltyState::new(1);
        for _ in 0..SHOTS {
            shoot(&mut s, Vec2::new(190.0, 50.0), Dive::Right);
            run(&mut s, &PenaltyInput::default(), RESULT_TICKS);
        }
        assert!(s.finished);
        assert_eq!(s.goals, SHOTS);
        assert_eq!(s.events.last(), Some(&GameEvent::RunWon));
    }

    #[test]
    fn test_kick_ignored_during_result() {
        let mut s = PenaltyState::new(1);
        shoot(&mut s, Vec2::new(GOAL_X, 60.0), Dive::Stay);
        tick(&mut s, &kick_now(), 0.0);
        assert_eq!(s.phase, ShotPhase::Miss);
    }

    #[test]
    fn test_determinism() {
        let mut a = PenaltyState::new(9);
        let mut b = PenaltyState::new(9);
        for i in 0..400u32 {
            let input = PenaltyInput {
                axis: Vec2::new(0.3, -0.2),
                kick: i % 37 == 0,
                touch: None,
            };
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.shots, b.shots);
        assert_eq!(a.keeper.pos, b.keeper.pos);
    }

    proptest! {
        #[test]
        fn prop_read_shot_dives_to_its_side(seed in any::<u64>(), offset in 31.0f32..58.0) {
            let read = Pcg32::seed_from_u64(seed).random_range(0..100) < KEEPER_SKILL;
            let left = choose_dive(&mut Pcg32::seed_from_u64(seed), GOAL_X - offset);
            let right = choose_dive(&mut Pcg32::seed_from_u64(seed), GOAL_X + offset);
            if read {
                prop_assert_eq!(left, Dive::Left);
                prop_assert_eq!(right, Dive::Right);
            } else {
                prop_assert_ne!(left, Dive::Left);
                prop_assert_ne!(right, Dive::Right);
            }
        }

        #[test]
        fn prop_power_stays_in_unit_range(ticks in 0u32..400) {
            let mut s = PenaltyState::new(1);
            press(&mut s);
            run(&mut s, &PenaltyInput::default(), ticks);
            prop_assert!((0.0..=1.0).contains(&s.power));
        }
    }
}
