//! Shooter run state and entity kinds

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::*;
use crate::sim::clock::{TickClock, Timer};
use crate::sim::entity::{Body, Faction};
use crate::sim::event::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyPhase {
    /// Easing toward its formation slot
    Entering,
    /// Diving with a sideways sway
    Attacking,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub slot: Vec2,
    pub phase: EnemyPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub body: Body,
    /// Ticks until the next spread
    pub fire_cooldown: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    pub owner: Faction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Heal,
    RapidFire,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub body: Body,
    pub kind: PickupKind,
}

/// Short-lived visual burst left by a kill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    /// Ticks left
    pub life: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerText {
    Wave(u32),
    FinalBoss,
}

impl std::fmt::Display for BannerText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BannerText::Wave(n) => write!(f, "WAVE {n}"),
            BannerText::FinalBoss => f.write_str("FINAL BOSS"),
        }
    }
}

/// Caption shown for a while when a wave or the boss arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub text: BannerText,
    pub timer: Timer,
}

impl Banner {
    pub fn new(text: BannerText, duration_ms: u64, now_ms: u64) -> Self {
        let mut timer = Timer::new(duration_ms);
        timer.start(now_ms);
        Self { text, timer }
    }

    pub fn is_showing(&self, now_ms: u64) -> bool {
        !self.timer.expired(now_ms)
    }
}

/// Wave layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formation {
    Line,
    Vee,
    Grid,
}

impl Formation {
    pub const ALL: [Formation; 3] = [Formation::Line, Formation::Vee, Formation::Grid];

    /// Slot for enemy `i` of `count`
    pub fn slot(self, i: usize, count: usize) -> Vec2 {
        let center = (count as f32 - 1.0) / 2.0;
        let offset = i as f32 - center;
        match self {
            Formation::Line => Vec2::new(FIELD_W / (count as f32 + 1.0) * (i as f32 + 1.0), 60.0),
            Formation::Vee => Vec2::new(FIELD_W / 2.0 + offset * 40.0, 50.0 + offset.abs() * 20.0),
            Formation::Grid => {
                let col = (i % 4) as f32;
                let row = (i / 4) as f32;
                Vec2::new(FIELD_W / 2.0 + (col - 1.5) * 50.0, 40.0 + row * 40.0)
            }
        }
    }
}

/// Complete shooter run state
#[derive(Debug, Clone)]
pub struct ShooterState {
    pub clock: TickClock,
    pub player: Body,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub explosions: Vec<Explosion>,
    pub stars: Vec<Star>,
    pub score: u32,
    /// Waves spawned so far
    pub wave: u32,
    /// Started when a wave spawns; the next wave waits for it
    pub wave_timer: Timer,
    pub boss_spawned: bool,
    pub banner: Option<Banner>,
    /// Running while the rapid-fire buff is active
    pub rapid_fire: Timer,
    /// Ticks until the player may fire again
    pub fire_cooldown: u32,
    /// Ticks until the next pickup drop
    pub pickup_countdown: u32,
    /// Logic ticks since the run started
    pub ticks: u64,
    pub finished: bool,
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
}

impl ShooterState {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(rng.random_range(0.0..FIELD_W), rng.random_range(0.0..FIELD_H)),
                speed: rng.random_range(1.0..3.0),
            })
            .collect();
        let pickup_countdown = rng.random_range(PICKUP_TICKS.0..=PICKUP_TICKS.1);

        Self {
            clock: TickClock::fixed_rate(SIM_DT),
            player: Body::new(
                Vec2::new(PLAYER_START.0, PLAYER_START.1),
                Vec2::splat(PLAYER_SIZE),
                PLAYER_HEALTH,
            ),
            enemies: Vec::new(),
            boss: None,
            projectiles: Vec::new(),
            pickups: Vec::new(),
            explosions: Vec::new(),
            stars,
            score: 0,
            wave: 0,
            wave_timer: Timer::new(WAVE_DELAY_MS),
            boss_spawned: false,
            banner: None,
            rapid_fire: Timer::new(RAPID_FIRE_MS),
            fire_cooldown: 0,
            pickup_countdown,
            ticks: 0,
            finished: false,
            events: Vec::new(),
            rng,
        }
    }

    /// No enemies and no boss left
    pub fn field_clear(&self) -> bool {
        self.enemies.is_empty() && self.boss.is_none()
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn the next formation above the top edge
    pub fn spawn_wave(&mut self, now_ms: u64) {
        let level = difficulty(self.score);
        let count = (3 + level) as usize;
        let formation = Formation::ALL[self.rng.random_range(0..Formation::ALL.len())];

        self.enemies = (0..count)
            .map(|i| {
                let slot = formation.slot(i, count);
                let start = Vec2::new(slot.x, -30.0 - i as f32 * 10.0);
                Enemy {
                    body: Body::new(start, Vec2::splat(ENEMY_SIZE), level),
                    slot,
                    phase: EnemyPhase::Entering,
                }
            })
            .collect();
        self.wave += 1;
        self.wave_timer.start(now_ms);
        self.banner = Some(Banner::new(BannerText::Wave(self.wave), WAVE_BANNER_MS, now_ms));
        self.events.push(GameEvent::LevelCleared(self.wave));
        log::info!("shooter wave {} ({:?}, {} enemies)", self.wave, formation, count);
    }

    pub fn spawn_boss(&mut self, now_ms: u64) {
        let body = Body::new(Vec2::new(FIELD_W / 2.0, 60.0), Vec2::splat(BOSS_SIZE), BOSS_HEALTH)
            .with_velocity(Vec2::new(BOSS_SPEED, 0.0));
        self.boss = Some(Boss {
            body,
            fire_cooldown: BOSS_FIRE_TICKS,
        });
        self.boss_spawned = true;
        self.banner = Some(Banner::new(BannerText::FinalBoss, BOSS_BANNER_MS, now_ms));
        self.events.push(GameEvent::BossArrived);
        log::info!("shooter boss at score {}", self.score);
    }

    pub fn fire_interval(&self) -> u32 {
        if self.rapid_fire.is_running() {
            RAPID_FIRE_INTERVAL
        } else {
            FIRE_INTERVAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let s = ShooterState::new(1);
        assert_eq!(s.stars.len(), STAR_COUNT);
        assert_eq!(s.player.health, PLAYER_HEALTH);
        assert!(s.field_clear());
        assert!((PICKUP_TICKS.0..=PICKUP_TICKS.1).contains(&s.pickup_countdown));
    }

    #[test]
    fn test_wave_size_tracks_difficulty() {
        let mut s = ShooterState::new(1);
        s.spawn_wave(0);
        assert_eq!(s.enemies.len(), 4);
        assert!(s.enemies.iter().all(|e| e.body.health == 1 && e.body.pos.y < 0.0));

        s.score = 1600;
        s.spawn_wave(0);
        assert_eq!(s.enemies.len(), 6);
        assert!(s.enemies.iter().all(|e| e.body.health == 3));
        assert_eq!(s.wave, 2);
    }

    #[test]
    fn test_arrivals_raise_banner() {
        let mut s = ShooterState::new(1);
        assert!(s.banner.is_none());
        s.spawn_wave(500);
        let banner = s.banner.unwrap_or_else(|| panic!("wave banner"));
        assert_eq!(banner.text.to_string(), "WAVE 1");
        assert!(banner.is_showing(500 + WAVE_BANNER_MS - 1));
        assert!(!banner.is_showing(500 + WAVE_BANNER_MS));

        s.spawn_boss(9000);
        let banner = s.banner.unwrap_or_else(|| panic!("boss banner"));
        assert_eq!(banner.text.to_string(), "FINAL BOSS");
        assert!(banner.is_showing(9000 + BOSS_BANNER_MS - 1));
    }

    #[test]
    fn test_formation_slots_on_screen() {
        for formation in Formation::ALL {
            for count in 4..=7 {
                for i in 0..count {
                    let slot = formation.slot(i, count);
                    assert!(slot.x > 0.0 && slot.x < FIELD_W, "{formation:?} {i}/{count}");
                    assert!(slot.y > 0.0 && slot.y < FIELD_H / 2.0);
                }
            }
        }
    }
}
