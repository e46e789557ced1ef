//! Platform abstraction layer
//!
//! Host-supplied services the core consumes or produces to:
//! - Input source (touch panel, joystick, buttons)
//! - Display surface that accepts finished bands
//! - Monotonic clock
//! - Reboot into another firmware image
//!
//! In-memory implementations of each are provided for tests and the
//! headless host runner.

use std::cell::Cell;
use std::collections::VecDeque;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::input::{ButtonSample, PointerSample, StickSample};

/// Raw input hardware. Every call is bounded-time; a failed read reports
/// "not touched / inactive / released" instead of an error.
pub trait InputSource {
    fn pointer(&mut self, screen_w: i32, screen_h: i32) -> PointerSample;
    fn directional(&mut self) -> StickSample;
    fn buttons(&mut self) -> ButtonSample;
}

/// Physical display that receives one band at a time
pub trait Display {
    fn size(&self) -> Size;
    /// Copy a finished band (row-major, `width * rows` pixels) to rows starting at `y`
    fn push_band(&mut self, y: i32, pixels: &[Rgb565]);
    /// Degraded path: whole screen one colour
    fn fill_screen(&mut self, color: Rgb565);
}

/// Millisecond clock that never goes backwards
pub trait MonotonicClock {
    fn now_ms(&self) -> u64;
}

/// Firmware-level services
pub trait Platform {
    /// Fire-and-forget request to reboot into the launcher image. On real
    /// hardware this does not return.
    fn reboot_to_menu(&mut self);
}

/// Input replayed from a queue of frames; released once the queue is empty
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<(PointerSample, StickSample, ButtonSample)>,
    current: Option<(PointerSample, StickSample, ButtonSample)>,
}

impl ScriptedInput {
    pub fn push_frame(&mut self, pointer: PointerSample, stick: StickSample, buttons: ButtonSample) {
        self.frames.push_back((pointer, stick, buttons));
    }

    /// A frame with only the pointer set
    pub fn push_touch(&mut self, pointer: PointerSample) {
        self.push_frame(pointer, StickSample::default(), ButtonSample::default());
    }

    /// Press-and-release of button A over two frames
    pub fn push_a_press(&mut self) {
        let press = ButtonSample {
            a_pressed: true,
            a_just_pressed: true,
            ..Default::default()
        };
        self.push_frame(PointerSample::released(), StickSample::default(), press);
        self.push_idle(1);
    }

    pub fn push_idle(&mut self, frames: usize) {
        for _ in 0..frames {
            self.push_frame(PointerSample::released(), StickSample::default(), ButtonSample::default());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The pointer is sampled first each frame, so it advances the script
    fn advance(&mut self) {
        self.current = self.frames.pop_front();
    }
}

impl InputSource for ScriptedInput {
    fn pointer(&mut self, _screen_w: i32, _screen_h: i32) -> PointerSample {
        self.advance();
        self.current.map(|f| f.0).unwrap_or_default()
    }

    fn directional(&mut self) -> StickSample {
        self.current.map(|f| f.1).unwrap_or_default()
    }

    fn buttons(&mut self) -> ButtonSample {
        self.current.map(|f| f.2).unwrap_or_default()
    }
}

/// Full framebuffer kept in memory, with transfer counters
#[derive(Debug, Clone)]
pub struct MemoryDisplay {
    size: Size,
    pub pixels: Vec<Rgb565>,
    pub bands_pushed: usize,
    pub fills: usize,
}

impl MemoryDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb565::BLACK; (width * height) as usize],
            bands_pushed: 0,
            fills: 0,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return None;
        }
        self.pixels.get(y as usize * self.size.width as usize + x as usize).copied()
    }
}

impl Display for MemoryDisplay {
    fn size(&self) -> Size {
        self.size
    }

    fn push_band(&mut self, y: i32, pixels: &[Rgb565]) {
        let width = self.size.width as usize;
        let start = y.max(0) as usize * width;
        let end = (start + pixels.len()).min(self.pixels.len());
        if start < end {
            self.pixels[start..end].copy_from_slice(&pixels[..end - start]);
        }
        self.bands_pushed += 1;
    }

    fn fill_screen(&mut self, color: Rgb565) {
        self.pixels.fill(color);
        self.fills += 1;
    }
}

/// Clock moved by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    /// Added after every read, to model time passing during a frame
    step_per_read: u64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
            step_per_read: 0,
        }
    }

    pub fn with_step_per_read(mut self, step: u64) -> Self {
        self.step_per_read = step;
        self
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step_per_read);
        now
    }
}

/// Remembers reboot requests instead of performing them
#[derive(Debug, Clone, Default)]
pub struct RecordingPlatform {
    pub reboots: usize,
}

impl Platform for RecordingPlatform {
    fn reboot_to_menu(&mut self) {
        log::info!("reboot to launcher requested");
        self.reboots += 1;
    }
}
