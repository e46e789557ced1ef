//! Fixed timestep clocks and explicit timers
//!
//! Frames arrive with a variable `dt`; movement happens in discrete logical
//! ticks. Each moving subsystem (player, pursuers, the whole shooter field)
//! owns one [`TickClock`]. Fractional progress towards the next tick is only
//! ever used for interpolated rendering.

use serde::{Deserialize, Serialize};

/// Maximum ticks a carrying clock will commit in a single frame
pub const MAX_SUBSTEPS: u32 = 8;

/// What happens to the accumulator when it overflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overflow {
    /// Drop the remainder: at most one tick per frame (tile movement)
    Reset,
    /// Keep the remainder and catch up, bounded by [`MAX_SUBSTEPS`]
    Carry,
}

/// Accumulator that turns frame time into whole ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickClock {
    interval: f32,
    accumulator: f32,
    overflow: Overflow,
}

impl TickClock {
    /// Clock for tile movers: one step every `interval` seconds, remainder dropped
    pub const fn per_tile(interval: f32) -> Self {
        Self {
            interval,
            accumulator: 0.0,
            overflow: Overflow::Reset,
        }
    }

    /// Clock for a fixed-rate simulation that must not lose time
    pub const fn fixed_rate(interval: f32) -> Self {
        Self {
            interval,
            accumulator: 0.0,
            overflow: Overflow::Carry,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Add one frame's `dt` and return how many ticks to commit now
    pub fn advance(&mut self, dt: f32) -> u32 {
        // Guard against a hitch (or a debugger pause) flooding the sim
        self.accumulator += dt.clamp(0.0, 0.1);
        if self.accumulator < self.interval {
            return 0;
        }
        match self.overflow {
            Overflow::Reset => {
                self.accumulator = 0.0;
                1
            }
            Overflow::Carry => {
                let mut ticks = 0;
                while self.accumulator >= self.interval && ticks < MAX_SUBSTEPS {
                    self.accumulator -= self.interval;
                    ticks += 1;
                }
                // Spiral of death: drop what could not be simulated
                if ticks == MAX_SUBSTEPS {
                    self.accumulator = self.accumulator.min(self.interval);
                }
                ticks
            }
        }
    }

    /// Interpolation factor between the previous and current committed positions
    pub fn alpha(&self) -> f32 {
        if self.interval <= 0.0 {
            return 1.0;
        }
        (self.accumulator / self.interval).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// A timer stored as an explicit start timestamp against a monotonic clock.
///
/// Timers are never cancelled mid-flight; a mode transition that ends one
/// calls [`Timer::clear`], which also forgets the start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    duration_ms: u64,
    started_at: Option<u64>,
}

impl Timer {
    pub const fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            started_at: None,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.started_at = Some(now_ms);
    }

    pub fn clear(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// True once `duration_ms` has elapsed since `start`
    pub fn expired(&self, now_ms: u64) -> bool {
        self.started_at
            .is_some_and(|start| now_ms.saturating_sub(start) >= self.duration_ms)
    }

    /// Milliseconds left, `None` when not running
    pub fn remaining(&self, now_ms: u64) -> Option<u64> {
        self.started_at
            .map(|start| self.duration_ms.saturating_sub(now_ms.saturating_sub(start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_tile_commits_one_tick_and_resets() {
        let mut clock = TickClock::per_tile(0.2);
        assert_eq!(clock.advance(0.1), 0);
        assert!((clock.alpha() - 0.5).abs() < 1e-5);
        assert_eq!(clock.advance(0.1), 1);
        assert_eq!(clock.accumulator(), 0.0);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn test_per_tile_never_commits_two_in_one_frame() {
        let mut clock = TickClock::per_tile(0.02);
        assert_eq!(clock.advance(0.09), 1);
        assert_eq!(clock.accumulator(), 0.0);
    }

    #[test]
    fn test_fixed_rate_carries_remainder() {
        let mut clock = TickClock::fixed_rate(1.0 / 60.0);
        assert_eq!(clock.advance(1.0 / 30.0 + 0.001), 2);
        assert!(clock.accumulator() > 0.0);
        assert!(clock.alpha() < 1.0);
    }

    #[test]
    fn test_fixed_rate_bounded_substeps() {
        let mut clock = TickClock::fixed_rate(0.001);
        assert_eq!(clock.advance(0.1), MAX_SUBSTEPS);
        assert!(clock.accumulator() <= clock.interval());
    }

    #[test]
    fn test_alpha_is_clamped() {
        let clock = TickClock::per_tile(0.0);
        assert_eq!(clock.alpha(), 1.0);
    }

    #[test]
    fn test_timer_lifecycle() {
        let mut timer = Timer::new(8000);
        assert!(!timer.expired(1_000_000));
        timer.start(1000);
        assert!(!timer.expired(8999));
        assert_eq!(timer.remaining(5000), Some(4000));
        assert!(timer.expired(9000));
        timer.clear();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(9000), None);
    }
}
