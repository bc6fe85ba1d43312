use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bevy::{ecs::resource::Resource, math::Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod engraving;
pub mod face;
pub use engraving::{
    EngravingMethod, EngravingSpec, FaceEngravings, ImageFit, Placement, SourceImage, TextAlign,
};
pub use face::Face;

pub const BOXWRIGHT_ASSETS_ROOT_ENV: &str = "BOXWRIGHT_ASSETS_ROOT";

pub fn boxwright_assets_root() -> PathBuf {
    if let Ok(explicit) = std::env::var(BOXWRIGHT_ASSETS_ROOT_ENV) {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return path;
        }
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(exe_dir) = exe.parent()
    {
        let sibling_assets = exe_dir.join("assets");
        if sibling_assets.exists() {
            return sibling_assets;
        }
    }

    let repo_assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("../bw-client/assets");
    if repo_assets.exists() {
        return repo_assets;
    }

    PathBuf::from("assets")
}

pub fn bundled_fonts_root() -> PathBuf {
    boxwright_assets_root().join("fonts")
}

/// The face currently being edited.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveFace(pub Face);

impl Default for ActiveFace {
    fn default() -> Self {
        Self(Face::Front)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DimensionError {
    #[error("box {axis} must be a positive number, got {value}")]
    NotPositive { axis: &'static str, value: f32 },
}

/// Outer size of the box in consistent units (inches for the stock boxes).
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Default for BoxDimensions {
    fn default() -> Self {
        Self {
            width: 3.25,
            height: 4.125,
            depth: 3.1875,
        }
    }
}

impl BoxDimensions {
    pub fn new(width: f32, height: f32, depth: f32) -> Result<Self, DimensionError> {
        let dims = Self {
            width,
            height,
            depth,
        };
        dims.validate()?;
        Ok(dims)
    }

    pub fn validate(&self) -> Result<(), DimensionError> {
        for (axis, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DimensionError::NotPositive { axis, value });
            }
        }
        Ok(())
    }

    pub fn max_dim(&self) -> f32 {
        self.width.max(self.height).max(self.depth)
    }
}

/// Window region (logical pixels) the 3-D preview is drawn into.
///
/// `None` until the UI has laid itself out; the preview then falls back to
/// the whole window.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PreviewViewport(pub Option<Rect>);

#[derive(Resource, Debug, Default)]
pub struct UiState {
    /// Pointer is over a UI panel; orbit input must be ignored.
    pub pointer_over_ui: bool,
    /// A text field has keyboard focus.
    pub keyboard_captured: bool,
}

/// Touches that began inside the preview and belong to the orbit controls.
#[derive(Resource, Debug, Default)]
pub struct TouchCapture {
    ids: HashSet<u64>,
}

impl TouchCapture {
    pub fn capture(&mut self, id: u64) {
        self.ids.insert(id);
    }

    pub fn retain(&mut self, keep: impl Fn(u64) -> bool) {
        self.ids.retain(|id| keep(*id));
    }

    pub fn is_captured(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_reject_non_positive_values() {
        assert!(BoxDimensions::new(1.0, 2.0, 3.0).is_ok());
        assert_eq!(
            BoxDimensions::new(1.0, 0.0, 3.0),
            Err(DimensionError::NotPositive {
                axis: "height",
                value: 0.0
            })
        );
        assert!(BoxDimensions::new(f32::INFINITY, 1.0, 1.0).is_err());
    }

    #[test]
    fn touch_capture_tracks_ids() {
        let mut capture = TouchCapture::default();
        capture.capture(3);
        capture.capture(7);
        assert!(capture.is_captured(3));
        capture.retain(|id| id != 3);
        assert!(!capture.is_captured(3));
        assert!(capture.is_captured(7));
        assert!(!capture.is_empty());
    }

    #[test]
    fn max_dim_picks_largest_axis() {
        let dims = BoxDimensions::new(3.25, 4.125, 3.1875).unwrap();
        assert_eq!(dims.max_dim(), 4.125);
    }
}
