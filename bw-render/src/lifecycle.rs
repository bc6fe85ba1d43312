//! Ownership of generated face textures.
//!
//! Every change to the engravings becomes a batch tagged with a generation
//! and a cancellation token. Only the newest uncancelled batch may commit,
//! and it commits all of its faces at once: old image disposed, new image
//! bound, decoded-upload cache replaced. The number of live image assets
//! therefore always equals the number of faces showing a texture.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::image::{ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bw_texture::{
    DecodedSource, GeneratedTexture, Synthesis, TEXTURE_ANISOTROPY, TextMeasurer, TextureOptions,
    synthesize_with_source,
};
use bw_utils::{EngravingSpec, Face, FaceEngravings};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct FaceJob {
    pub face: Face,
    pub spec: EngravingSpec,
    pub cached: Option<Arc<DecodedSource>>,
}

#[derive(Debug)]
pub struct TextureBatch {
    pub generation: u64,
    pub cancel: CancelToken,
    pub options: TextureOptions,
    pub faces: Vec<FaceJob>,
}

impl TextureBatch {
    /// Synthesizes every face, giving up as soon as the batch is cancelled.
    pub fn synthesize(self, measurer: &dyn TextMeasurer) -> Option<BatchResult> {
        let mut faces = Vec::with_capacity(self.faces.len());
        for job in self.faces {
            if self.cancel.is_cancelled() {
                debug!(generation = self.generation, "batch cancelled mid-flight");
                return None;
            }
            let synthesis =
                synthesize_with_source(Some(&job.spec), &self.options, measurer, job.cached);
            faces.push(FaceOutcome {
                face: job.face,
                spec: job.spec,
                synthesis,
            });
        }
        Some(BatchResult {
            generation: self.generation,
            cancel: self.cancel,
            faces,
        })
    }
}

#[derive(Debug)]
pub struct FaceOutcome {
    pub face: Face,
    pub spec: EngravingSpec,
    pub synthesis: Option<Synthesis>,
}

#[derive(Debug)]
pub struct BatchResult {
    pub generation: u64,
    pub cancel: CancelToken,
    pub faces: Vec<FaceOutcome>,
}

/// Committed texture state per face, indexed by geometry slot.
#[derive(Resource, Default)]
pub struct FaceTextures {
    bound: [Option<Handle<Image>>; 6],
    sources: [Option<Arc<DecodedSource>>; 6],
    /// Spec each slot was last committed from; `None` forces resynthesis.
    committed: [Option<EngravingSpec>; 6],
    generation: u64,
    pending: Option<CancelToken>,
}

impl FaceTextures {
    pub fn bound(&self, face: Face) -> Option<&Handle<Image>> {
        self.bound[face.slot()].as_ref()
    }

    pub fn source(&self, face: Face) -> Option<&Arc<DecodedSource>> {
        self.sources[face.slot()].as_ref()
    }

    pub fn live_count(&self) -> usize {
        self.bound.iter().flatten().count()
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// Forgets what was committed so the next plan covers all six faces.
    pub fn reset_baseline(&mut self) {
        self.cancel_pending();
        self.committed = Default::default();
    }

    /// Cancels any in-flight batch and returns a new one holding the faces
    /// whose engraving renders differently from what is committed.
    pub fn plan(
        &mut self,
        engravings: &FaceEngravings,
        options: TextureOptions,
    ) -> Option<TextureBatch> {
        self.cancel_pending();

        let faces: Vec<FaceJob> = Face::SLOTS
            .into_iter()
            .filter(|face| {
                let spec = engravings.get(*face);
                self.committed[face.slot()]
                    .as_ref()
                    .is_none_or(|committed| !committed.renders_same(spec))
            })
            .map(|face| FaceJob {
                face,
                spec: engravings.get(face).clone(),
                cached: self.sources[face.slot()].clone(),
            })
            .collect();
        if faces.is_empty() {
            return None;
        }

        self.generation += 1;
        let cancel = CancelToken::default();
        self.pending = Some(cancel.clone());
        debug!(
            generation = self.generation,
            faces = faces.len(),
            "texture batch started"
        );
        Some(TextureBatch {
            generation: self.generation,
            cancel,
            options,
            faces,
        })
    }

    /// Binds a finished batch. Returns `false` and touches nothing when the
    /// batch was cancelled or superseded.
    pub fn commit(
        &mut self,
        result: BatchResult,
        images: &mut Assets<Image>,
        materials: &mut Assets<StandardMaterial>,
        slots: &[Handle<StandardMaterial>; 6],
    ) -> bool {
        if result.cancel.is_cancelled() || result.generation != self.generation {
            debug!(
                generation = result.generation,
                latest = self.generation,
                "discarding stale texture batch"
            );
            return false;
        }

        for outcome in result.faces {
            let slot = outcome.face.slot();
            if let Some(old) = self.bound[slot].take() {
                images.remove(&old);
            }
            let (texture, source) = match outcome.synthesis {
                Some(synthesis) => (
                    Some(images.add(to_gpu_image(synthesis.texture))),
                    synthesis.source,
                ),
                None => (None, None),
            };
            if let Some(material) = materials.get_mut(&slots[slot]) {
                material.base_color_texture = texture.clone();
            }
            self.bound[slot] = texture;
            self.sources[slot] = source;
            self.committed[slot] = Some(outcome.spec);
        }
        self.pending = None;
        debug!(generation = result.generation, live = self.live_count(), "texture batch committed");
        true
    }

    /// Disposes every bound texture and decoded upload.
    pub fn release_all(&mut self, images: &mut Assets<Image>) {
        self.cancel_pending();
        for handle in self.bound.iter_mut().filter_map(Option::take) {
            images.remove(&handle);
        }
        self.sources = Default::default();
        self.committed = Default::default();
    }
}

/// GPU image for a face. Empty areas become white so the material's base
/// color shows through and ink reads as engraved.
pub fn to_gpu_image(texture: GeneratedTexture) -> Image {
    let mut pixels = texture.into_image();
    for pixel in pixels.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let over_white = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        pixel.0 = [over_white(r), over_white(g), over_white(b), 255];
    }

    let (width, height) = pixels.dimensions();
    let mut image = Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        pixels.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        mag_filter: ImageFilterMode::Linear,
        min_filter: ImageFilterMode::Linear,
        mipmap_filter: ImageFilterMode::Linear,
        anisotropy_clamp: TEXTURE_ANISOTROPY,
        ..ImageSamplerDescriptor::linear()
    });
    image
}

/// Finishes a batch without rasterizing: faces with content get a tiny
/// inked texture.
#[cfg(test)]
pub(crate) fn finish_batch(batch: TextureBatch) -> BatchResult {
    let faces = batch
        .faces
        .into_iter()
        .map(|job| FaceOutcome {
            face: job.face,
            synthesis: job.spec.has_content().then(|| Synthesis {
                texture: GeneratedTexture::new(image::RgbaImage::from_pixel(
                    2,
                    2,
                    image::Rgba([0, 0, 0, 255]),
                )),
                source: None,
            }),
            spec: job.spec,
        })
        .collect();
    BatchResult {
        generation: batch.generation,
        cancel: batch.cancel,
        faces,
    }
}
