//! Strip-buffered rendering
//!
//! The device cannot hold a full framebuffer. The [`Compositor`] instead
//! paints the screen as a sequence of horizontal bands through one
//! [`StripBuffer`]: clear, draw the [`Scene`] clipped to the band, push the
//! band to the display, move down.

pub mod maze;
pub mod penalty;
pub mod palette;
pub mod shapes;
pub mod shooter;
pub mod ui;

use std::convert::Infallible;

use embedded_graphics::Pixel;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use thiserror::Error;

use crate::HitRect;
use crate::platform::{Display, MonotonicClock};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate {bytes} byte strip buffer")]
    StripAlloc { bytes: usize },
}

/// One band's worth of pixels, addressed in screen coordinates.
/// Anything outside the current band is silently clipped.
#[derive(Debug, Clone)]
pub struct StripBuffer {
    width: u32,
    screen_height: u32,
    band_height: u32,
    top: i32,
    rows: u32,
    pixels: Vec<Rgb565>,
}

impl StripBuffer {
    pub fn new(width: u32, screen_height: u32, band_height: u32) -> Result<Self, RenderError> {
        let len = width as usize * band_height as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| RenderError::StripAlloc { bytes: len.saturating_mul(2) })?;
        pixels.resize(len, Rgb565::BLACK);
        Ok(Self {
            width,
            screen_height,
            band_height,
            top: 0,
            rows: band_height.min(screen_height),
            pixels,
        })
    }

    /// Move to the band starting at screen row `top` and clear it
    pub fn begin(&mut self, top: i32, color: Rgb565) {
        self.top = top;
        self.rows = self
            .band_height
            .min((self.screen_height as i32 - top).max(0) as u32);
        self.pixels.fill(color);
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// The rows of the current band, ready to transfer
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels[..self.width as usize * self.rows as usize]
    }

    fn band_area(&self) -> Rectangle {
        Rectangle::new(Point::new(0, self.top), Size::new(self.width, self.rows))
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.x >= self.width as i32 || p.y < self.top || p.y >= self.top + self.rows as i32 {
            return None;
        }
        Some((p.y - self.top) as usize * self.width as usize + p.x as usize)
    }
}

impl OriginDimensions for StripBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.screen_height)
    }
}

impl DrawTarget for StripBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if let Some(i) = self.index(p) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.band_area());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let width = self.width as usize;
        let (x0, x1) = (area.top_left.x as usize, bottom_right.x as usize + 1);
        for y in area.top_left.y..=bottom_right.y {
            let row = (y - self.top) as usize * width;
            self.pixels[row + x0..row + x1].fill(color);
        }
        Ok(())
    }
}

/// Per-band drawing context. `now_ms` is read once per band so every
/// drawable in it shares one blink phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub top: i32,
    pub height: i32,
    pub now_ms: u64,
}

impl Band {
    /// Cheap rejection test every drawable runs first
    pub fn visible(&self, rect: HitRect) -> bool {
        rect.spans_rows(self.top, self.height)
    }
}

/// Something the compositor can paint. Passes run in order for every band:
/// background, entities (low to high z), overlay.
pub trait Scene {
    /// Colour each band is cleared to, and the degraded-mode fill
    fn background(&self) -> Rgb565;

    fn draw_background(&self, _target: &mut StripBuffer, _band: &Band) {}

    fn draw_entities(&self, _target: &mut StripBuffer, _band: &Band) {}

    fn draw_overlay(&self, _target: &mut StripBuffer, _band: &Band) {}
}

/// Drives the band loop
#[derive(Debug)]
pub struct Compositor {
    strip: Option<StripBuffer>,
    screen_height: i32,
    band_height: i32,
}

impl Compositor {
    /// Allocate the strip; on failure run degraded instead of failing
    pub fn new(size: Size, band_height: u32) -> Self {
        let strip = match StripBuffer::new(size.width, size.height, band_height) {
            Ok(strip) => Some(strip),
            Err(e) => {
                log::warn!("{e}, rendering degraded");
                None
            }
        };
        Self::with_strip(strip, size, band_height)
    }

    /// Compositor over an already-allocated strip, or degraded with `None`
    pub fn with_strip(strip: Option<StripBuffer>, size: Size, band_height: u32) -> Self {
        Self {
            strip,
            screen_height: size.height as i32,
            band_height: band_height.max(1) as i32,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.strip.is_none()
    }

    /// Paint one frame; returns the number of bands transferred
    pub fn render(
        &mut self,
        scene: &dyn Scene,
        display: &mut impl Display,
        clock: &impl MonotonicClock,
    ) -> usize {
        let Some(strip) = self.strip.as_mut() else {
            display.fill_screen(scene.background());
            return 0;
        };

        let mut bands = 0;
        let mut top = 0;
        while top < self.screen_height {
            let band = Band {
                top,
                height: self.band_height.min(self.screen_height - top),
                now_ms: clock.now_ms(),
            };
            strip.begin(top, scene.background());
            scene.draw_background(strip, &band);
            scene.draw_entities(strip, &band);
            scene.draw_overlay(strip, &band);
            display.push_band(top, strip.pixels());
            bands += 1;
            top += self.band_height;
        }
        bands
    }
}
