//! Band-aware drawing primitives
//!
//! Every helper takes the current [`Band`] and returns early when its
//! bounding box misses it, so callers never pay for off-band shapes.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle, Triangle,
};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use super::{Band, StripBuffer};
use crate::HitRect;

fn rectangle(r: HitRect) -> Rectangle {
    Rectangle::new(Point::new(r.x, r.y), Size::new(r.w.max(0) as u32, r.h.max(0) as u32))
}

pub fn fill_rect(target: &mut StripBuffer, band: &Band, r: HitRect, color: Rgb565) {
    if !band.visible(r) {
        return;
    }
    let Ok(()) = rectangle(r)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target);
}

pub fn stroke_rect(target: &mut StripBuffer, band: &Band, r: HitRect, color: Rgb565, width: u32) {
    if !band.visible(r) {
        return;
    }
    let Ok(()) = rectangle(r)
        .into_styled(PrimitiveStyle::with_stroke(color, width))
        .draw(target);
}

/// Button-style rounded rectangle, optionally outlined
pub fn rounded_rect(
    target: &mut StripBuffer,
    band: &Band,
    r: HitRect,
    radius: u32,
    fill: Rgb565,
    outline: Option<Rgb565>,
) {
    if !band.visible(r) {
        return;
    }
    let shape = RoundedRectangle::with_equal_corners(rectangle(r), Size::new(radius, radius));
    let Ok(()) = shape.into_styled(PrimitiveStyle::with_fill(fill)).draw(target);
    if let Some(color) = outline {
        let Ok(()) = shape
            .into_styled(PrimitiveStyle::with_stroke(color, 2))
            .draw(target);
    }
}

fn circle_bounds(center: Point, diameter: u32) -> HitRect {
    let d = diameter as i32;
    HitRect::new(center.x - d / 2, center.y - d / 2, d + 1, d + 1)
}

pub fn fill_circle(target: &mut StripBuffer, band: &Band, center: Point, diameter: u32, color: Rgb565) {
    if !band.visible(circle_bounds(center, diameter)) {
        return;
    }
    let Ok(()) = Circle::with_center(center, diameter)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target);
}

pub fn stroke_circle(target: &mut StripBuffer, band: &Band, center: Point, diameter: u32, color: Rgb565) {
    if !band.visible(circle_bounds(center, diameter)) {
        return;
    }
    let Ok(()) = Circle::with_center(center, diameter)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(target);
}

pub fn fill_triangle(target: &mut StripBuffer, band: &Band, points: [Point; 3], color: Rgb565) {
    let top = points.iter().map(|p| p.y).min().unwrap_or(0);
    let bottom = points.iter().map(|p| p.y).max().unwrap_or(0);
    if !band.visible(HitRect::new(0, top, 1, bottom - top + 1)) {
        return;
    }
    let Ok(()) = Triangle::new(points[0], points[1], points[2])
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target);
}

pub fn line(target: &mut StripBuffer, band: &Band, from: Point, to: Point, color: Rgb565, width: u32) {
    let pad = width as i32;
    let top = from.y.min(to.y) - pad;
    let bottom = from.y.max(to.y) + pad;
    if !band.visible(HitRect::new(0, top, 1, bottom - top + 1)) {
        return;
    }
    let Ok(()) = Line::new(from, to)
        .into_styled(PrimitiveStyle::with_stroke(color, width))
        .draw(target);
}

/// Text with its top edge at `pos.y`, aligned horizontally around `pos.x`
pub fn text(
    target: &mut StripBuffer,
    band: &Band,
    s: &str,
    pos: Point,
    font: &MonoFont<'_>,
    color: Rgb565,
    alignment: Alignment,
) {
    let glyph = font.character_size;
    let h = glyph.height as i32;
    if !band.visible(HitRect::new(pos.x, pos.y, 1, h)) {
        return;
    }
    let style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();
    let Ok(_) = Text::with_text_style(s, pos, MonoTextStyle::new(font, color), style).draw(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::FONT_6X10;

    fn strip_at(top: i32) -> (StripBuffer, Band) {
        let mut strip = StripBuffer::new(64, 64, 16).expect("alloc");
        strip.begin(top, Rgb565::BLACK);
        (
            strip,
            Band {
                top,
                height: 16,
                now_ms: 0,
            },
        )
    }

    fn lit(strip: &StripBuffer) -> usize {
        strip.pixels().iter().filter(|&&c| c != Rgb565::BLACK).count()
    }

    #[test]
    fn test_off_band_shapes_draw_nothing() {
        let (mut strip, band) = strip_at(16);
        fill_rect(&mut strip, &band, HitRect::new(0, 0, 10, 16), Rgb565::RED);
        fill_circle(&mut strip, &band, Point::new(20, 50), 8, Rgb565::RED);
        text(&mut strip, &band, "HI", Point::new(0, 40), &FONT_6X10, Rgb565::WHITE, Alignment::Left);
        assert_eq!(lit(&strip), 0);
    }

    #[test]
    fn test_shapes_straddling_band_are_clipped() {
        let (mut strip, band) = strip_at(16);
        fill_rect(&mut strip, &band, HitRect::new(0, 10, 4, 10), Rgb565::RED);
        // Rows 16..20 of the rectangle fall in the band
        assert_eq!(lit(&strip), 16);

        fill_circle(&mut strip, &band, Point::new(40, 16), 9, Rgb565::GREEN);
        assert!(lit(&strip) > 16);
    }

    #[test]
    fn test_text_renders_inside_band() {
        let (mut strip, band) = strip_at(0);
        text(&mut strip, &band, "SCORE", Point::new(32, 2), &FONT_6X10, Rgb565::WHITE, Alignment::Center);
        assert!(lit(&strip) > 0);
    }
}
