//! Image manipulation.
//!
//! This module provides:
//!
//! - The [`Image`] type, an owned RGBA image.
//! - [`Color`], an 8-bit sRGB color that can be parsed from hex notation.
//! - [`Blend`], alpha compositing of one image onto another.
//! - A few [`draw`] functions for the shapes splash frames are made of.

mod blend;
mod color;
pub mod draw;


use std::{fmt, io, path::Path};

use image::{imageops::FilterType, ImageBuffer, Rgba, Rgba32FImage, RgbaImage};

use crate::{resolution::Resolution, Error, Result};

pub use blend::*;
pub use color::*;

/// An 8-bit sRGB image with alpha channel.
#[derive(Clone)]
pub struct Image {
    pub(crate) buf: RgbaImage,
}

impl Image {
    /// Loads an image from the filesystem, converting it to RGBA.
    ///
    /// The format is detected from the file contents. A missing file results in
    /// [`Error::InputNotFound`].
    pub fn load<A: AsRef<Path>>(path: A) -> Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(e),
        })?;
        let buf = image::load_from_memory(&data)?.to_rgba8();
        log::trace!(
            "loaded {}x{} image from '{}'",
            buf.width(),
            buf.height(),
            path.display()
        );
        Ok(Self { buf })
    }

    pub fn from_rgba8(res: Resolution, buf: &[u8]) -> Self {
        let expected_size = res.width() as usize * res.height() as usize * 4;
        assert_eq!(
            expected_size,
            buf.len(),
            "incorrect buffer size {} for {} image (expected {} bytes)",
            buf.len(),
            res,
            expected_size,
        );

        Self {
            buf: ImageBuffer::from_vec(res.width(), res.height(), buf.to_vec())
                .expect("buffer size does not match image resolution"),
        }
    }

    /// Creates an empty image of a specified size.
    ///
    /// The image will start out black and fully transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    /// Creates an image of size `res` where every pixel has the value `color`.
    pub fn filled(res: Resolution, color: Color) -> Self {
        Self {
            buf: ImageBuffer::from_pixel(res.width(), res.height(), Rgba(color.0)),
        }
    }

    /// Returns the width of this image, in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    /// Returns the height of this image, in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns the size of this image.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width(), self.height())
    }

    /// Gets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        Color(self.buf[(x, y)].0)
    }

    /// Sets the image color at the given pixel coordinates.
    ///
    /// # Panics
    ///
    /// This will panic if `(x, y)` is outside the bounds of this image.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.buf[(x, y)] = Rgba(color.0);
    }

    /// Resamples this image to `res` using a Lanczos filter with a window of 3.
    ///
    /// Filtering happens on premultiplied alpha, so the color of fully transparent pixels does not
    /// bleed into the edges of opaque regions.
    pub fn resize(&self, res: Resolution) -> Image {
        log::trace!("resize {} -> {}", self.resolution(), res);
        let premultiplied = Rgba32FImage::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b, a] = self.buf[(x, y)].0.map(|c| f32::from(c) / 255.0);
            Rgba([r * a, g * a, b * a, a])
        });
        let resized =
            image::imageops::resize(&premultiplied, res.width(), res.height(), FilterType::Lanczos3);

        let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let buf = RgbaImage::from_fn(res.width(), res.height(), |x, y| {
            let [r, g, b, a] = resized[(x, y)].0;
            if to_u8(a) == 0 {
                return Rgba([0; 4]);
            }
            Rgba([to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)])
        });
        Image { buf }
    }

    /// Alpha-blends `src` onto `self`.
    ///
    /// By default, `src` is placed at the top-left corner. Use the returned [`Blend`] to change the
    /// position; the operation is performed when it is dropped.
    pub fn blend_from<'b>(&'b mut self, src: &'b Image) -> Blend<'b> {
        Blend::new(self, src)
    }

    /// Makes every pixel fully opaque, discarding alpha like a conversion to RGB would.
    pub fn make_opaque(&mut self) {
        self.buf.pixels_mut().for_each(|pix| pix.0[3] = 255);
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        self.buf.as_raw()
    }

    pub(crate) fn from_buf(buf: RgbaImage) -> Self {
        Self { buf }
    }

    pub(crate) fn into_buf(self) -> RgbaImage {
        self.buf
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} Image", self.width(), self.height())
    }
}
