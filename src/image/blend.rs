use super::{Color, Image};

/// An alpha blending operation that makes one image appear in front of another.
///
/// Blending happens directly on the sRGB-encoded values, which is what most image editors (and the
/// GIF viewers displaying our output) expect.
///
/// Returned by [`Image::blend_from`]. The operation is performed when the guard is dropped.
pub struct Blend<'a> {
    dest: &'a mut Image,
    src: &'a Image,
    x: i32,
    y: i32,
}

impl<'a> Blend<'a> {
    pub(super) fn new(dest: &'a mut Image, src: &'a Image) -> Self {
        Self {
            dest,
            src,
            x: 0,
            y: 0,
        }
    }

    /// Places the top-left corner of the source image at `(x, y)` in the destination.
    ///
    /// Parts of the source that end up outside of the destination are ignored.
    pub fn at(&mut self, x: i32, y: i32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }
}

impl Drop for Blend<'_> {
    fn drop(&mut self) {
        for src_y in 0..self.src.height() {
            let dest_y = i64::from(self.y) + i64::from(src_y);
            if dest_y < 0 || dest_y >= i64::from(self.dest.height()) {
                continue;
            }
            for src_x in 0..self.src.width() {
                let dest_x = i64::from(self.x) + i64::from(src_x);
                if dest_x < 0 || dest_x >= i64::from(self.dest.width()) {
                    continue;
                }

                let (dest_x, dest_y) = (dest_x as u32, dest_y as u32);
                let src_pix = self.src.get(src_x, src_y);
                let dest_pix = self.dest.get(dest_x, dest_y);
                self.dest
                    .set(dest_x, dest_y, blend_alpha(dest_pix, src_pix));
            }
        }
    }
}

/// Composites `src` over `dest` using non-premultiplied alpha.
pub(crate) fn blend_alpha(dest: Color, src: Color) -> Color {
    match src.a() {
        0 => return dest,
        255 => return src,
        _ => {}
    }

    let src_a = f32::from(src.a()) / 255.0;
    let dest_a = f32::from(dest.a()) / 255.0;
    let result_a = src_a + dest_a * (1.0 - src_a);

    let channel = |d: u8, s: u8| {
        let v = (f32::from(s) * src_a + f32::from(d) * dest_a * (1.0 - src_a)) / result_a;
        v.round().clamp(0.0, 255.0) as u8
    };

    Color([
        channel(dest.r(), src.r()),
        channel(dest.g(), src.g()),
        channel(dest.b(), src.b()),
        (result_a * 255.0).round() as u8,
    ])
}

/// Blends `color` onto `dest` with an additional coverage factor in range 0.0 to 1.0.
///
/// Used for anti-aliased glyph rendering.
pub(crate) fn blend_coverage(dest: Color, color: Color, coverage: f32) -> Color {
    let alpha = (f32::from(color.a()) * coverage.clamp(0.0, 1.0)).round() as u8;
    blend_alpha(dest, color.with_alpha(alpha))
}
