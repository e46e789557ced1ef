//! Shooter fixed-rate update
//!
//! Each logic tick moves everything first, then resolves contacts in a fixed
//! order: player vs enemies, player vs enemy fire, enemies vs player fire,
//! player vs pickups.

use glam::Vec2;
use rand::Rng;

use super::*;
use crate::sim::collision::{overlapping, swept_overlapping};
use crate::sim::entity::{Body, Faction};
use crate::sim::event::GameEvent;

/// Controls for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShooterInput {
    /// Analog stick, each axis in [-1, 1]
    pub axis: Vec2,
    /// Touch point the ship follows; implies firing
    pub touch: Option<Vec2>,
    /// Fire button held
    pub fire: bool,
}

/// Difficulty tier from score
pub fn difficulty(score: u32) -> i32 {
    match score {
        0..500 => 1,
        500..1500 => 2,
        1500..3000 => 3,
        _ => 4,
    }
}

/// Advance by one frame; commits as many 60 Hz ticks as `dt` covers
pub fn tick(state: &mut ShooterState, input: &ShooterInput, dt: f32, now_ms: u64) {
    if state.finished {
        return;
    }
    let steps = state.clock.advance(dt);
    for _ in 0..steps {
        step(state, input, now_ms);
        if state.finished {
            break;
        }
    }
}

/// One logic tick
fn step(state: &mut ShooterState, input: &ShooterInput, now_ms: u64) {
    state.ticks += 1;

    if state.rapid_fire.expired(now_ms) {
        state.rapid_fire.clear();
    }
    if state.banner.is_some_and(|b| !b.is_showing(now_ms)) {
        state.banner = None;
    }

    move_player(state, input);
    fire_player(state, input);
    move_enemies(state);
    move_boss(state);
    for p in &mut state.projectiles {
        p.body.begin_tick();
        p.body.integrate();
    }
    for p in &mut state.pickups {
        p.body.begin_tick();
        p.body.integrate();
    }
    scroll_stars(state);
    spawn(state, now_ms);
    cull(state);

    player_vs_enemies(state);
    player_vs_enemy_fire(state);
    enemies_vs_player_fire(state);
    player_vs_pickups(state, now_ms);

    for e in &mut state.explosions {
        e.life = e.life.saturating_sub(1);
    }
    state.explosions.retain(|e| e.life > 0);

    check_outcome(state);
}

fn move_player(state: &mut ShooterState, input: &ShooterInput) {
    let player = &mut state.player;
    player.begin_tick();
    if let Some(target) = input.touch {
        player.pos += (target - player.pos) * TOUCH_FOLLOW;
    } else {
        player.pos += input.axis.clamp(Vec2::splat(-1.0), Vec2::ONE) * PLAYER_SPEED;
    }
    let half = player.size * 0.5;
    player.pos = player
        .pos
        .clamp(half, Vec2::new(FIELD_W, FIELD_H) - half);
}

fn fire_player(state: &mut ShooterState, input: &ShooterInput) {
    state.fire_cooldown = state.fire_cooldown.saturating_sub(1);
    let wants_fire = input.fire || input.touch.is_some();
    if !wants_fire || state.fire_cooldown > 0 {
        return;
    }
    let muzzle = state.player.pos - Vec2::new(0.0, state.player.size.y * 0.5);
    state.projectiles.push(Projectile {
        body: Body::new(muzzle, Vec2::new(BULLET_W, BULLET_H), 1)
            .with_velocity(Vec2::new(0.0, -BULLET_SPEED)),
        owner: Faction::Player,
    });
    state.fire_cooldown = state.fire_interval();
}

fn enemy_bullet(pos: Vec2, vel: Vec2) -> Projectile {
    Projectile {
        body: Body::new(pos, Vec2::new(BULLET_W, BULLET_H), 1).with_velocity(vel),
        owner: Faction::Enemy,
    }
}

fn move_enemies(state: &mut ShooterState) {
    // Sway phase follows logic time so replays match
    let t_ms = state.ticks as f32 * SIM_DT * 1000.0;
    for enemy in &mut state.enemies {
        let body = &mut enemy.body;
        body.begin_tick();
        match enemy.phase {
            EnemyPhase::Entering => {
                body.pos += (enemy.slot - body.pos) * ENTRANCE_EASE;
                if body.pos.distance(enemy.slot) < ENTRANCE_SNAP {
                    enemy.phase = EnemyPhase::Attacking;
                }
            }
            EnemyPhase::Attacking => {
                body.pos.y += DIVE_SPEED;
                body.pos.x += (t_ms / 200.0 + body.pos.y * 0.05).sin() * SWAY;
                if state.rng.random_ratio(1, ENEMY_FIRE_ODDS) {
                    let muzzle = body.pos + Vec2::new(0.0, body.size.y * 0.5);
                    state
                        .projectiles
                        .push(enemy_bullet(muzzle, Vec2::new(0.0, ENEMY_BULLET_SPEED)));
                }
            }
        }
    }
}

fn move_boss(state: &mut ShooterState) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let body = &mut boss.body;
    body.begin_tick();
    body.integrate();
    if body.pos.x < BOSS_MARGIN || body.pos.x > FIELD_W - BOSS_MARGIN {
        body.vel.x = -body.vel.x;
        body.pos.x = body.pos.x.clamp(BOSS_MARGIN, FIELD_W - BOSS_MARGIN);
    }

    boss.fire_cooldown = boss.fire_cooldown.saturating_sub(1);
    if boss.fire_cooldown == 0 {
        boss.fire_cooldown = BOSS_FIRE_TICKS;
        let muzzle = body.pos + Vec2::new(0.0, body.size.y * 0.5);
        for vx in [-2.0, 0.0, 2.0] {
            state
                .projectiles
                .push(enemy_bullet(muzzle, Vec2::new(vx, ENEMY_BULLET_SPEED)));
        }
    }
}

fn scroll_stars(state: &mut ShooterState) {
    for star in &mut state.stars {
        star.pos.y += star.speed;
        if star.pos.y > FIELD_H {
            star.pos.y -= FIELD_H;
            star.pos.x = state.rng.random_range(0.0..FIELD_W);
        }
    }
}

fn spawn(state: &mut ShooterState, now_ms: u64) {
    state.pickup_countdown = state.pickup_countdown.saturating_sub(1);
    if state.pickup_countdown == 0 {
        state.pickup_countdown = state.rng.random_range(PICKUP_TICKS.0..=PICKUP_TICKS.1);
        let kind = if state.rng.random_bool(0.5) {
            PickupKind::Heal
        } else {
            PickupKind::RapidFire
        };
        let x = state.rng.random_range(20.0..FIELD_W - 20.0);
        state.pickups.push(Pickup {
            body: Body::new(Vec2::new(x, -10.0), Vec2::splat(PICKUP_SIZE), 1)
                .with_velocity(Vec2::new(0.0, PICKUP_FALL)),
            kind,
        });
    }

    if !state.field_clear() {
        return;
    }
    if state.score >= BOSS_SCORE && !state.boss_spawned {
        state.spawn_boss(now_ms);
        return;
    }
    let due = !state.wave_timer.is_running() || state.wave_timer.expired(now_ms);
    if due && !state.boss_spawned {
        if state.wave >= MAX_WAVES {
            finish(state, true);
        } else {
            state.spawn_wave(now_ms);
        }
    }
}

/// Drop anything that has left the field
fn cull(state: &mut ShooterState) {
    let off_field = |b: &Body| {
        let half = b.size * 0.5;
        b.pos.y - half.y > FIELD_H || b.pos.y + half.y < -40.0 || b.pos.x + half.x < 0.0 || b.pos.x - half.x > FIELD_W
    };
    state.projectiles.retain(|p| !off_field(&p.body));
    state.pickups.retain(|p| !off_field(&p.body));
    // Entering enemies start above the top edge; only the bottom edge removes them
    state
        .enemies
        .retain(|e| e.body.pos.y - e.body.size.y * 0.5 <= FIELD_H);
}

fn damage_player(state: &mut ShooterState, amount: i32) {
    state.player.hit(amount);
    state.player.health = state.player.health.max(0);
    state.events.push(GameEvent::LifeLost(state.player.health as u32));
}

fn player_vs_enemies(state: &mut ShooterState) {
    let mut rammed = 0;
    let player = state.player;
    state.enemies.retain(|e| {
        if overlapping(&player, &e.body) {
            rammed += 1;
            false
        } else {
            true
        }
    });
    for _ in 0..rammed {
        damage_player(state, RAM_DAMAGE);
    }
    if let Some(boss) = state.boss.map(|b| b.body)
        && overlapping(&player, &boss)
    {
        // The boss survives a ram; push the player back below it
        damage_player(state, RAM_DAMAGE);
        state.player.pos.y = (boss.pos.y + (boss.size.y + player.size.y) * 0.5 + 1.0)
            .min(FIELD_H - player.size.y * 0.5);
    }
}

fn player_vs_enemy_fire(state: &mut ShooterState) {
    let player = state.player;
    let mut hits = 0;
    state.projectiles.retain(|p| {
        if p.owner == Faction::Enemy && swept_overlapping(&p.body, &player) {
            hits += 1;
            false
        } else {
            true
        }
    });
    for _ in 0..hits {
        damage_player(state, ENEMY_BULLET_DAMAGE);
    }
}

fn enemies_vs_player_fire(state: &mut ShooterState) {
    let mut spent = vec![false; state.projectiles.len()];

    for enemy in &mut state.enemies {
        for (i, p) in state.projectiles.iter().enumerate() {
            if spent[i] || p.owner != Faction::Player || enemy.body.is_dead() {
                continue;
            }
            if swept_overlapping(&p.body, &enemy.body) {
                spent[i] = true;
                if enemy.body.hit(1) {
                    state.score += KILL_SCORE;
                    state.events.push(GameEvent::ScoreAwarded(KILL_SCORE));
                    state.explosions.push(Explosion {
                        pos: enemy.body.pos,
                        life: EXPLOSION_LIFE,
                    });
                }
            }
        }
    }
    state.enemies.retain(|e| !e.body.is_dead());

    if let Some(boss) = state.boss.as_mut() {
        for (i, p) in state.projectiles.iter().enumerate() {
            if spent[i] || p.owner != Faction::Player || boss.body.is_dead() {
                continue;
            }
            if swept_overlapping(&p.body, &boss.body) {
                spent[i] = true;
                boss.body.hit(1);
            }
        }
        if boss.body.is_dead() {
            let pos = boss.body.pos;
            state.boss = None;
            state.score += BOSS_KILL_SCORE;
            state.events.push(GameEvent::ScoreAwarded(BOSS_KILL_SCORE));
            state.explosions.push(Explosion {
                pos,
                life: EXPLOSION_LIFE * 2,
            });
            log::info!("shooter boss destroyed");
            finish(state, true);
        }
    }

    let mut spent = spent.into_iter();
    state.projectiles.retain(|_| !spent.next().unwrap_or(false));
}

fn player_vs_pickups(state: &mut ShooterState, now_ms: u64) {
    let player = state.player;
    let mut taken = Vec::new();
    state.pickups.retain(|p| {
        if overlapping(&player, &p.body) {
            taken.push(p.kind);
            false
        } else {
            true
        }
    });
    for kind in taken {
        match kind {
            PickupKind::Heal => {
                state.player.health = (state.player.health + HEAL_AMOUNT).min(PLAYER_HEALTH);
            }
            PickupKind::RapidFire => state.rapid_fire.start(now_ms),
        }
        log::debug!("pickup {kind:?}");
    }
}

fn check_outcome(state: &mut ShooterState) {
    if !state.finished && state.player.is_dead() {
        finish(state, false);
    }
}

/// End the run and bank its coins
fn finish(state: &mut ShooterState, won: bool) {
    if state.finished {
        return;
    }
    state.finished = true;
    let coins = if won {
        win_coins(state.score)
    } else {
        loss_coins(state.score)
    };
    state.events.push(GameEvent::CoinsEarned(coins));
    state
        .events
        .push(if won { GameEvent::RunWon } else { GameEvent::RunOver });
    log::info!(
        "shooter run {}: score {}, wave {}, coins {coins}",
        if won { "won" } else { "lost" },
        state.score,
        state.wave
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &mut ShooterState, input: &ShooterInput, ticks: u32, now_ms: u64) {
        for _ in 0..ticks {
            step(state, input, now_ms);
        }
    }

    fn still() -> ShooterInput {
        ShooterInput::default()
    }

    #[test]
    fn test_difficulty_tiers() {
        assert_eq!(difficulty(0), 1);
        assert_eq!(difficulty(499), 1);
        assert_eq!(difficulty(500), 2);
        assert_eq!(difficulty(1500), 3);
        assert_eq!(difficulty(3000), 4);
    }

    #[test]
    fn test_first_wave_spawns_immediately() {
        let mut s = ShooterState::new(3);
        run(&mut s, &still(), 1, 0);
        assert_eq!(s.wave, 1);
        assert!(!s.enemies.is_empty());
        assert!(s.events.contains(&GameEvent::LevelCleared(1)));
    }

    #[test]
    fn test_next_wave_waits_for_delay() {
        let mut s = ShooterState::new(3);
        run(&mut s, &still(), 1, 0);
        s.enemies.clear();
        run(&mut s, &still(), 1, WAVE_DELAY_MS - 1);
        assert_eq!(s.wave, 1);
        run(&mut s, &still(), 1, WAVE_DELAY_MS);
        assert_eq!(s.wave, 2);
    }

    #[test]
    fn test_wave_banner_clears_after_its_time() {
        let mut s = ShooterState::new(3);
        run(&mut s, &still(), 1, 100);
        assert_eq!(s.banner.map(|b| b.text), Some(BannerText::Wave(1)));
        run(&mut s, &still(), 1, 100 + WAVE_BANNER_MS - 1);
        assert!(s.banner.is_some());
        run(&mut s, &still(), 1, 100 + WAVE_BANNER_MS);
        assert!(s.banner.is_none());
    }

    #[test]
    fn test_fire_rate() {
        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        let fire = ShooterInput { fire: true, ..Default::default() };
        run(&mut s, &fire, 9, 0);
        let shots = s.projectiles.iter().filter(|p| p.owner == Faction::Player).count();
        assert_eq!(shots, 3);

        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        s.rapid_fire.start(0);
        run(&mut s, &fire, 8, 0);
        let shots = s.projectiles.iter().filter(|p| p.owner == Faction::Player).count();
        assert_eq!(shots, 4);
    }

    #[test]
    fn test_player_clamped_to_field() {
        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        let left = ShooterInput { axis: Vec2::new(-1.0, 0.0), ..Default::default() };
        run(&mut s, &left, 200, 0);
        assert_eq!(s.player.pos.x, PLAYER_SIZE / 2.0);
    }

    #[test]
    fn test_fast_bullet_kills_enemy_without_tunneling() {
        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        s.enemies.push(Enemy {
            body: Body::new(Vec2::new(240.0, 200.0), Vec2::new(ENEMY_SIZE, 2.0), 1),
            slot: Vec2::new(240.0, 200.0),
            phase: EnemyPhase::Entering,
        });
        // Bullet starts just below and jumps clean over the thin target in one tick
        s.projectiles.push(Projectile {
            body: Body::new(Vec2::new(240.0, 208.0), Vec2::new(BULLET_W, BULLET_H), 1)
                .with_velocity(Vec2::new(0.0, -BULLET_SPEED)),
            owner: Faction::Player,
        });
        run(&mut s, &still(), 1, 0);
        assert!(s.enemies.is_empty());
        assert_eq!(s.score, KILL_SCORE);
        assert_eq!(s.explosions.len(), 1);
        assert!(s.projectiles.iter().all(|p| p.owner != Faction::Player));
    }

    #[test]
    fn test_ram_costs_health_and_destroys_enemy() {
        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        let pos = s.player.pos;
        s.enemies.push(Enemy {
            body: Body::new(pos, Vec2::splat(ENEMY_SIZE), 1),
            slot: pos,
            phase: EnemyPhase::Entering,
        });
        run(&mut s, &still(), 1, 0);
        assert_eq!(s.player.health, PLAYER_HEALTH - RAM_DAMAGE);
        assert!(s.enemies.is_empty());
        assert!(s.events.contains(&GameEvent::LifeLost((PLAYER_HEALTH - RAM_DAMAGE) as u32)));
    }

    #[test]
    fn test_enemy_fire_and_heal_pickup() {
        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        let pos = s.player.pos;
        s.projectiles.push(Projectile {
            body: Body::new(pos, Vec2::new(BULLET_W, BULLET_H), 1),
            owner: Faction::Enemy,
        });
        run(&mut s, &still(), 1, 0);
        assert_eq!(s.player.health, PLAYER_HEALTH - ENEMY_BULLET_DAMAGE);

        s.pickups.push(Pickup {
            body: Body::new(s.player.pos, Vec2::splat(PICKUP_SIZE), 1),
            kind: PickupKind::Heal,
        });
        run(&mut s, &still(), 1, 0);
        assert_eq!(s.player.health, PLAYER_HEALTH);
        assert!(s.pickups.is_empty());
    }

    #[test]
    fn test_rapid_fire_expires() {
        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        s.pickups.push(Pickup {
            body: Body::new(s.player.pos, Vec2::splat(PICKUP_SIZE), 1),
            kind: PickupKind::RapidFire,
        });
        run(&mut s, &still(), 1, 100);
        assert_eq!(s.fire_interval(), RAPID_FIRE_INTERVAL);
        run(&mut s, &still(), 1, 100 + RAPID_FIRE_MS);
        assert_eq!(s.fire_interval(), FIRE_INTERVAL);
    }

    #[test]
    fn test_death_ends_run_with_loss_coins() {
        let mut s = ShooterState::new(3);
        s.wave_timer.start(0);
        s.score = 400;
        s.player.health = ENEMY_BULLET_DAMAGE;
        let pos = s.player.pos;
        s.projectiles.push(Projectile {
            body: Body::new(pos, Vec2::new(BULLET_W, BULLET_H), 1),
            owner: Faction::Enemy,
        });
        run(&mut s, &still(), 1, 0);
        assert!(s.finished);
        assert!(s.events.contains(&GameEvent::CoinsEarned(loss_coins(400))));
        assert!(s.events.contains(&GameEvent::RunOver));
    }

    #[test]
    fn test_boss_arrives_and_its_death_wins() {
        let mut s = ShooterState::new(3);
        s.score = BOSS_SCORE;
        run(&mut s, &still(), 1, 0);
        assert!(s.boss.is_some());
        assert!(s.events.contains(&GameEvent::BossArrived));

        if let Some(boss) = s.boss.as_mut() {
            boss.body.health = 1;
        }
        let boss_pos = s.boss.map(|b| b.body.pos).unwrap_or_default();
        s.projectiles.push(Projectile {
            body: Body::new(boss_pos, Vec2::new(BULLET_W, BULLET_H), 1),
            owner: Faction::Player,
        });
        run(&mut s, &still(), 1, 0);
        assert!(s.boss.is_none());
        assert!(s.finished);
        assert_eq!(s.score, BOSS_SCORE + BOSS_KILL_SCORE);
        assert!(s.events.contains(&GameEvent::CoinsEarned(win_coins(BOSS_SCORE + BOSS_KILL_SCORE))));
        assert!(s.events.contains(&GameEvent::RunWon));
    }

    #[test]
    fn test_boss_spread_every_interval() {
        let mut s = ShooterState::new(3);
        s.score = BOSS_SCORE;
        s.player.pos.x = 20.0;
        run(&mut s, &still(), BOSS_FIRE_TICKS + 1, 0);
        let shots = s.projectiles.iter().filter(|p| p.owner == Faction::Enemy).count();
        assert_eq!(shots, 3);
    }

    #[test]
    fn test_frame_clock_drives_ticks() {
        let mut s = ShooterState::new(3);
        tick(&mut s, &still(), SIM_DT * 2.5, 0);
        assert_eq!(s.ticks, 2);
    }

    #[test]
    fn test_determinism() {
        let mut a = ShooterState::new(77);
        let mut b = ShooterState::new(77);
        let input = ShooterInput { fire: true, axis: Vec2::new(0.5, 0.0), touch: None };
        for i in 0..600u64 {
            tick(&mut a, &input, SIM_DT, i * 16);
            tick(&mut b, &input, SIM_DT, i * 16);
        }
        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.enemies.len(), b.enemies.len());
    }
}
