use std::path::PathBuf;

use bevy::prelude::*;
use serde::Deserialize;

use crate::components::PreviewCamera;
use crate::controls::OrbitCamera;
use crate::orientation::OrientationAnimation;

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Pixel ratio for generated face textures. `None` follows the window.
    pub dpr: Option<f32>,
    pub fov_deg: f32,
    /// Extra distance factor so the whole box fits in frame.
    pub fit_offset: f32,
    pub animation_ms: u64,
    pub damping: f32,
    pub rotate_speed: f32,
    #[serde(skip)]
    pub fonts_dir: Option<PathBuf>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            dpr: None,
            fov_deg: 35.0,
            fit_offset: 1.35,
            animation_ms: 200,
            damping: 0.08,
            rotate_speed: 0.9,
            fonts_dir: None,
        }
    }
}

impl PreviewSettings {
    pub fn fov_radians(&self) -> f32 {
        self.fov_deg.clamp(1.0, 179.0).to_radians()
    }

    /// The configured override, else the window's scale factor, else 1.
    pub fn texture_dpr(&self, window_scale: Option<f32>) -> f32 {
        self.dpr
            .or(window_scale)
            .filter(|dpr| dpr.is_finite() && *dpr > 0.0)
            .unwrap_or(1.0)
    }

    pub fn animation_secs(&self) -> f32 {
        self.animation_ms as f32 / 1000.0
    }
}

pub fn apply_preview_settings(
    settings: Res<PreviewSettings>,
    mut orientation: ResMut<OrientationAnimation>,
    mut cameras: Query<(&mut Projection, &mut OrbitCamera), With<PreviewCamera>>,
) {
    if !settings.is_changed() {
        return;
    }
    orientation.set_duration(settings.animation_secs());
    for (mut projection, mut orbit) in &mut cameras {
        if let Projection::Perspective(p) = &mut *projection {
            p.fov = settings.fov_radians();
        }
        orbit.damping = settings.damping.clamp(0.0, 1.0);
        orbit.rotate_speed = settings.rotate_speed;
    }
}
