//! Per-face texture synthesis for the box preview.
//!
//! Everything here is a pure function of an [`EngravingSpec`] plus the font
//! collaborator; no Bevy state is touched. Failures never escape: a face that
//! cannot be drawn simply has no texture.

use std::sync::Arc;

use bw_utils::{EngravingMethod, EngravingSpec};
use image::{Rgba, RgbaImage};
use tracing::warn;

mod canvas;
mod error;
pub mod fonts;
pub mod layout;
mod text;
pub mod upload;


pub use canvas::Canvas;
pub use error::SynthesisError;
pub use fonts::{FontRequest, LineMeasure, SystemFonts, TextMeasurer};
pub use upload::DecodedSource;

/// Side of the square working canvas in logical units.
pub const TEXTURE_SIZE: f32 = 512.0;
/// Anisotropic sample count for generated textures.
pub const TEXTURE_ANISOTROPY: u16 = 4;
/// Engraving ink.
pub const INK: Rgba<u8> = Rgba([0x2f, 0x33, 0x41, 0xff]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureOptions {
    /// Device pixel ratio applied to the logical canvas.
    pub dpr: f32,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self { dpr: 1.0 }
    }
}

impl TextureOptions {
    pub fn scale(&self) -> f32 {
        if self.dpr.is_finite() && self.dpr > 0.0 {
            self.dpr
        } else {
            1.0
        }
    }

    pub fn pixel_size(&self) -> u32 {
        (TEXTURE_SIZE * self.scale()).ceil() as u32
    }
}

/// Square RGBA texture for one face, transparent where nothing is engraved.
#[derive(Debug, Clone)]
pub struct GeneratedTexture {
    image: RgbaImage,
}

impl GeneratedTexture {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }
}

/// A synthesized texture plus the decoded upload it was drawn from, if any.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub texture: GeneratedTexture,
    pub source: Option<Arc<DecodedSource>>,
}

pub fn synthesize(
    spec: Option<&EngravingSpec>,
    options: &TextureOptions,
    measurer: &dyn TextMeasurer,
) -> Option<GeneratedTexture> {
    synthesize_with_source(spec, options, measurer, None).map(|synthesis| synthesis.texture)
}

/// Like [`synthesize`], reusing `cached` instead of decoding again when it was
/// decoded from the same upload bytes.
pub fn synthesize_with_source(
    spec: Option<&EngravingSpec>,
    options: &TextureOptions,
    measurer: &dyn TextMeasurer,
    cached: Option<Arc<DecodedSource>>,
) -> Option<Synthesis> {
    let spec = spec?;
    if !spec.has_content() {
        return None;
    }

    let result = match spec.method {
        EngravingMethod::Text => text::render_text(spec, options, measurer).map(|texture| Synthesis {
            texture,
            source: None,
        }),
        EngravingMethod::Upload => upload::render_upload(spec, options, cached),
    };

    match result {
        Ok(synthesis) => Some(synthesis),
        Err(err) => {
            warn!("engraving synthesis failed: {err}");
            None
        }
    }
}
