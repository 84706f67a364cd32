//! Drawing primitives used to compose splash frames.
//!
//! All functions return a *guard object* that allows optional customization of the shape and
//! performs the draw operation when dropped.

use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::MonoTextStyle,
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::font::Font;

use super::{blend::blend_coverage, Color, Image};

/// Guard returned by [`arc`]; draws the arc when dropped and allows customization.
///
/// The stroke lies *inside* the circle described by the center and radius, so the outer edge of
/// the arc touches the radius and the inner edge is at `radius - stroke_width`. Pixels are filled
/// if their center is covered; there is no anti-aliasing (render at a higher resolution and
/// downsample for that).
pub struct DrawArc<'a> {
    image: &'a mut Image,
    center_x: f32,
    center_y: f32,
    radius: f32,
    start_degrees: f32,
    sweep_degrees: f32,
    stroke_width: f32,
    color: Color,
}

impl DrawArc<'_> {
    /// Sets the arc's color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the start angle in degrees.
    ///
    /// 0° points right (3 o'clock), angles increase clockwise.
    pub fn start(&mut self, degrees: f32) -> &mut Self {
        self.start_degrees = degrees;
        self
    }

    /// Sets the angle covered by the arc, in degrees, going clockwise from the start angle.
    ///
    /// By default, the arc covers the full circle.
    pub fn sweep(&mut self, degrees: f32) -> &mut Self {
        self.sweep_degrees = degrees;
        self
    }

    /// Sets the arc's stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: f32) -> &mut Self {
        self.stroke_width = width;
        self
    }

    fn covers(&self, x: f32, y: f32) -> bool {
        let (dx, dy) = (x - self.center_x, y - self.center_y);
        let dist = dx.hypot(dy);
        if dist > self.radius || dist < self.radius - self.stroke_width {
            return false;
        }
        if self.sweep_degrees >= 360.0 {
            return true;
        }

        // Image Y points down, so `atan2` already yields clockwise angles.
        let angle = dy.atan2(dx).to_degrees();
        (angle - self.start_degrees).rem_euclid(360.0) <= self.sweep_degrees
    }
}

impl Drop for DrawArc<'_> {
    fn drop(&mut self) {
        if self.radius <= 0.0 || self.sweep_degrees <= 0.0 || self.stroke_width <= 0.0 {
            return;
        }

        let clamp_x = |v: f32| v.clamp(0.0, self.image.width() as f32) as u32;
        let clamp_y = |v: f32| v.clamp(0.0, self.image.height() as f32) as u32;
        let (x_min, x_max) = (
            clamp_x((self.center_x - self.radius).floor()),
            clamp_x((self.center_x + self.radius).ceil()),
        );
        let (y_min, y_max) = (
            clamp_y((self.center_y - self.radius).floor()),
            clamp_y((self.center_y + self.radius).ceil()),
        );

        for y in y_min..y_max {
            for x in x_min..x_max {
                if self.covers(x as f32 + 0.5, y as f32 + 0.5) {
                    self.image.set(x, y, self.color);
                }
            }
        }
    }
}

/// Guard returned by [`text`]; draws the text when dropped and allows customization.
pub struct DrawText<'a> {
    image: &'a mut Image,
    font: &'a Font,
    x: i32,
    y: i32,
    text: &'a str,
    color: Color,
}

impl DrawText<'_> {
    /// Sets the text color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

impl Drop for DrawText<'_> {
    fn drop(&mut self) {
        match self.font {
            Font::TrueType { font, scale, .. } => {
                let ascent = font.v_metrics(*scale).ascent;
                let origin = rusttype::point(self.x as f32, self.y as f32 + ascent);
                for glyph in font.layout(self.text, *scale, origin) {
                    let Some(bb) = glyph.pixel_bounding_box() else {
                        continue;
                    };
                    let (width, height) = (self.image.width(), self.image.height());
                    let image = &mut *self.image;
                    let color = self.color;
                    glyph.draw(|gx, gy, coverage| {
                        let x = bb.min.x + gx as i32;
                        let y = bb.min.y + gy as i32;
                        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                            let (x, y) = (x as u32, y as u32);
                            let blended = blend_coverage(image.get(x, y), color, coverage);
                            image.set(x, y, blended);
                        }
                    });
                }
            }
            Font::Builtin(mono) => {
                let character_style = MonoTextStyle::new(*mono, self.color);
                let text_style = TextStyleBuilder::new()
                    .alignment(Alignment::Left)
                    .baseline(Baseline::Top)
                    .build();
                match Text::with_text_style(
                    self.text,
                    Point::new(self.x, self.y),
                    character_style,
                    text_style,
                )
                .draw(&mut Target(&mut *self.image))
                {
                    Ok(_) => {}
                    Err(infallible) => match infallible {},
                }
            }
        }
    }
}

/// Draws an arc (or a full ring) onto an image.
///
/// `(center_x, center_y)` and `radius` describe the outer edge of the arc, in pixels.
pub fn arc(image: &mut Image, center_x: f32, center_y: f32, radius: f32) -> DrawArc<'_> {
    DrawArc {
        image,
        center_x,
        center_y,
        radius,
        start_degrees: 0.0,
        sweep_degrees: 360.0,
        stroke_width: 1.0,
        color: Color::WHITE,
    }
}

/// Draws a text string onto an image.
///
/// `x` and `y` are the top-left corner of the text's line box: the ascender line for TrueType
/// fonts, the top of the character cell for the built-in font.
pub fn text<'a>(
    image: &'a mut Image,
    font: &'a Font,
    x: i32,
    y: i32,
    text: &'a str,
) -> DrawText<'a> {
    DrawText {
        image,
        font,
        x,
        y,
        text,
        color: Color::WHITE,
    }
}

struct Target<'a>(&'a mut Image);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = (self.0.width(), self.0.height());

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && (point.x as u32) < self.0.width()
                && point.y >= 0
                && (point.y as u32) < self.0.height()
            {
                self.0.set(point.x as _, point.y as _, color);
            }
        }

        Ok(())
    }
}
