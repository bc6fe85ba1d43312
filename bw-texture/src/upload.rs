use std::sync::Arc;

use bw_utils::{EngravingSpec, ImageFit, SourceImage};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::{Canvas, GeneratedTexture, Synthesis, SynthesisError, TEXTURE_SIZE, TextureOptions};

/// Decoded pixels of an upload, tagged with the bytes they came from.
pub struct DecodedSource {
    source: SourceImage,
    pixels: RgbaImage,
}

impl DecodedSource {
    pub fn decode(source: &SourceImage) -> Result<Self, SynthesisError> {
        let decoded = image::load_from_memory(&source.bytes).map_err(|err| SynthesisError::Decode {
            name: source.name.clone(),
            source: err,
        })?;
        let pixels = decoded.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(SynthesisError::EmptyImage {
                name: source.name.clone(),
            });
        }
        Ok(Self {
            source: source.clone(),
            pixels,
        })
    }

    pub fn matches(&self, source: &SourceImage) -> bool {
        self.source.same_bytes(source)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl std::fmt::Debug for DecodedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedSource")
            .field("name", &self.source.name)
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

/// Destination rectangle of an upload inside the square, logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub fn fit_rect(fit: ImageFit, src_width: u32, src_height: u32, size: f32) -> DrawRect {
    let (w, h) = (src_width as f32, src_height as f32);
    let (width, height) = match fit {
        ImageFit::Fit => {
            let scale = (size / w).min(size / h);
            (w * scale, h * scale)
        }
        ImageFit::Fill => {
            let scale = (size / w).max(size / h);
            (w * scale, h * scale)
        }
        ImageFit::Stretch => (size, size),
    };
    DrawRect {
        x: (size - width) / 2.0,
        y: (size - height) / 2.0,
        width,
        height,
    }
}

/// Full desaturation with Rec. 709 luma weights; alpha is kept.
pub fn grayscale(pixel: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    let luma = 0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32;
    let l = luma.round().clamp(0.0, 255.0) as u8;
    Rgba([l, l, l, a])
}

pub(crate) fn render_upload(
    spec: &EngravingSpec,
    options: &TextureOptions,
    cached: Option<Arc<DecodedSource>>,
) -> Result<Synthesis, SynthesisError> {
    let Some(source) = spec.upload.as_ref().filter(|s| !s.is_empty()) else {
        return Err(SynthesisError::EmptyImage {
            name: String::new(),
        });
    };

    let decoded = match cached.filter(|c| c.matches(source)) {
        Some(reused) => {
            debug!(name = %source.name, "reusing decoded upload");
            reused
        }
        None => Arc::new(DecodedSource::decode(source)?),
    };

    let mut canvas = Canvas::new(TEXTURE_SIZE, TEXTURE_SIZE, options.scale())?;
    let rect = fit_rect(spec.fit, decoded.width(), decoded.height(), TEXTURE_SIZE);
    canvas.draw_image(
        decoded.pixels(),
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        grayscale,
    );

    Ok(Synthesis {
        texture: GeneratedTexture::new(canvas.into_image()),
        source: Some(decoded),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretch_ignores_aspect() {
        let rect = fit_rect(ImageFit::Stretch, 100, 50, 512.0);
        assert_eq!(
            rect,
            DrawRect {
                x: 0.0,
                y: 0.0,
                width: 512.0,
                height: 512.0
            }
        );
    }

    fn assert_rect(rect: DrawRect, expected: [f32; 4]) {
        let actual = [rect.x, rect.y, rect.width, rect.height];
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn fit_contains_and_centers() {
        assert_rect(fit_rect(ImageFit::Fit, 100, 50, 512.0), [0.0, 128.0, 512.0, 256.0]);
        assert_rect(fit_rect(ImageFit::Fit, 50, 200, 512.0), [192.0, 0.0, 128.0, 512.0]);
    }

    #[test]
    fn fill_covers_and_crops() {
        assert_rect(fit_rect(ImageFit::Fill, 100, 50, 512.0), [-256.0, 0.0, 1024.0, 512.0]);
    }

    #[test]
    fn grayscale_keeps_alpha_and_neutral_colors() {
        assert_eq!(grayscale(Rgba([200, 200, 200, 40])), Rgba([200, 200, 200, 40]));
        let g = grayscale(Rgba([255, 0, 0, 255]));
        assert_eq!(g.0[0], g.0[1]);
        assert_eq!(g.0[1], g.0[2]);
        assert_eq!(g.0[0], 54);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let source = SourceImage::new("broken.png", vec![0x89u8, b'P', b'N', b'G', 0, 1, 2]);
        assert!(matches!(
            DecodedSource::decode(&source),
            Err(SynthesisError::Decode { .. })
        ));
    }
}
