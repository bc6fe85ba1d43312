use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::SynthesisError;

/// Largest side, in physical pixels, a drawing surface may have.
pub const MAX_SURFACE_SIDE: u32 = 8192;

/// RGBA drawing surface addressed in logical units, backed by
/// `logical * scale` physical pixels.
pub struct Canvas {
    pixels: RgbaImage,
    scale: f32,
}

impl Canvas {
    pub fn new(logical_width: f32, logical_height: f32, scale: f32) -> Result<Self, SynthesisError> {
        let width = (logical_width * scale).ceil();
        let height = (logical_height * scale).ceil();
        let valid = |side: f32| side.is_finite() && side >= 1.0 && side <= MAX_SURFACE_SIDE as f32;
        if !(scale > 0.0 && valid(width) && valid(height)) {
            return Err(SynthesisError::Surface {
                width: width.max(0.0).min(u32::MAX as f32) as u32,
                height: height.max(0.0).min(u32::MAX as f32) as u32,
            });
        }
        Ok(Self {
            pixels: RgbaImage::new(width as u32, height as u32),
            scale,
        })
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Source-over blend of `color` at `coverage` onto one physical pixel.
    /// Out-of-bounds pixels are ignored.
    pub fn blend(&mut self, px: i64, py: i64, coverage: f32, color: Rgba<u8>) {
        if px < 0 || py < 0 || px >= self.pixels.width() as i64 || py >= self.pixels.height() as i64 {
            return;
        }
        let coverage = coverage.clamp(0.0, 1.0);
        if coverage <= 0.0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(px as u32, py as u32);
        *dst = source_over(*dst, color, coverage);
    }

    /// Fills a logical rectangle with anti-aliased edges.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba<u8>) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let x0 = x * self.scale;
        let y0 = y * self.scale;
        let x1 = (x + width) * self.scale;
        let y1 = (y + height) * self.scale;
        for py in y0.floor() as i64..y1.ceil() as i64 {
            let cover_y = span_coverage(py as f32, y0, y1);
            for px in x0.floor() as i64..x1.ceil() as i64 {
                let cover_x = span_coverage(px as f32, x0, x1);
                self.blend(px, py, cover_x * cover_y, color);
            }
        }
    }

    /// Draws `src` scaled into the logical rectangle, passing every source
    /// pixel through `filter`. Parts of the rectangle outside the canvas are
    /// cropped before resampling.
    pub fn draw_image(
        &mut self,
        src: &RgbaImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        filter: impl Fn(Rgba<u8>) -> Rgba<u8>,
    ) {
        if src.width() == 0 || src.height() == 0 || width <= 0.0 || height <= 0.0 {
            return;
        }
        let dx = x * self.scale;
        let dy = y * self.scale;
        let dw = width * self.scale;
        let dh = height * self.scale;

        let vis_x0 = dx.max(0.0).round();
        let vis_y0 = dy.max(0.0).round();
        let vis_x1 = (dx + dw).min(self.pixels.width() as f32).round();
        let vis_y1 = (dy + dh).min(self.pixels.height() as f32).round();
        if vis_x1 - vis_x0 < 1.0 || vis_y1 - vis_y0 < 1.0 {
            return;
        }

        let to_src_x = src.width() as f32 / dw;
        let to_src_y = src.height() as f32 / dh;
        let sx0 = ((vis_x0 - dx) * to_src_x).floor().max(0.0) as u32;
        let sy0 = ((vis_y0 - dy) * to_src_y).floor().max(0.0) as u32;
        let sx1 = (((vis_x1 - dx) * to_src_x).ceil() as u32).clamp(sx0 + 1, src.width());
        let sy1 = (((vis_y1 - dy) * to_src_y).ceil() as u32).clamp(sy0 + 1, src.height());
        let sx0 = sx0.min(sx1 - 1);
        let sy0 = sy0.min(sy1 - 1);

        let out_w = (vis_x1 - vis_x0) as u32;
        let out_h = (vis_y1 - vis_y0) as u32;
        let cropped = imageops::crop_imm(src, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();
        let resampled = if cropped.dimensions() == (out_w, out_h) {
            cropped
        } else {
            imageops::resize(&cropped, out_w, out_h, FilterType::Triangle)
        };

        let ox = vis_x0 as i64;
        let oy = vis_y0 as i64;
        for (px, py, pixel) in resampled.enumerate_pixels() {
            let filtered = filter(*pixel);
            let alpha = filtered.0[3] as f32 / 255.0;
            let opaque = Rgba([filtered.0[0], filtered.0[1], filtered.0[2], 0xff]);
            self.blend(ox + px as i64, oy + py as i64, alpha, opaque);
        }
    }
}

fn span_coverage(p: f32, a: f32, b: f32) -> f32 {
    ((p + 1.0).min(b) - p.max(a)).clamp(0.0, 1.0)
}

fn source_over(dst: Rgba<u8>, color: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let sa = color.0[3] as f32 / 255.0 * coverage;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let s = color.0[c] as f32;
        let d = dst.0[c] as f32;
        out[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}
