use bevy::prelude::*;
use bevy::render::camera::Viewport;
use bevy::window::PrimaryWindow;
use bw_utils::{BoxDimensions, PreviewViewport};

use crate::components::PreviewCamera;
use crate::controls::{OrbitCamera, OrbitPose};
use crate::scene::PreviewSession;
use crate::settings::PreviewSettings;

/// Container width used when the layout reports zero.
pub const FALLBACK_WIDTH: f32 = 260.0;
pub const MIN_HEIGHT: f32 = 220.0;

/// Camera distance at which the whole box fits the vertical field of view.
pub fn frame_distance(dims: &BoxDimensions, fov: f32, fit_offset: f32) -> f32 {
    let half_fov = (fov / 2.0).max(1e-3);
    dims.max_dim() / 2.0 / half_fov.tan() * fit_offset
}

pub fn container_size(size: Vec2) -> Vec2 {
    let width = if size.x > 0.0 { size.x } else { FALLBACK_WIDTH };
    Vec2::new(width, size.y.max(MIN_HEIGHT))
}

/// Preview area in logical window pixels, floored and then clamped to the
/// window.
pub fn container_rect(viewport: Option<Rect>, window: Vec2) -> Rect {
    let area = viewport.unwrap_or(Rect::from_corners(Vec2::ZERO, window));
    let size = container_size(area.size());
    let min = area.min.clamp(Vec2::ZERO, window.max(Vec2::ZERO));
    let max = (min + size).min(window);
    Rect::from_corners(min, max)
}

pub fn physical_viewport(rect: Rect, scale_factor: f32, window: UVec2) -> Option<Viewport> {
    let to_physical = |v: Vec2| (v * scale_factor).round().max(Vec2::ZERO).as_uvec2();
    let position = to_physical(rect.min).min(window);
    let end = to_physical(rect.max).min(window);
    let size = end.saturating_sub(position);
    if size.x == 0 || size.y == 0 {
        return None;
    }
    Some(Viewport {
        physical_position: position,
        physical_size: size,
        ..default()
    })
}

pub fn spawn_preview_camera(
    commands: &mut Commands,
    dims: &BoxDimensions,
    settings: &PreviewSettings,
) -> Entity {
    let fov = settings.fov_radians();
    let distance = frame_distance(dims, fov, settings.fit_offset);
    let pose = OrbitPose::looking_from(distance);
    commands
        .spawn((
            Name::new("PreviewCamera"),
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov,
                near: distance / 50.0,
                far: distance * 50.0,
                ..default()
            }),
            pose.transform(),
            PreviewCamera,
            OrbitCamera::new(pose, settings.damping, settings.rotate_speed),
        ))
        .id()
}

/// Re-derives viewport, clip planes and default orbit pose whenever the
/// container, the settings or the session change.
pub fn frame_preview_camera(
    mut last_rect: Local<Option<Rect>>,
    viewport: Res<PreviewViewport>,
    settings: Res<PreviewSettings>,
    session: Res<PreviewSession>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(&mut Camera, &mut Projection, &mut OrbitCamera), With<PreviewCamera>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let rect = container_rect(viewport.0, window.size());
    if *last_rect == Some(rect) && !settings.is_changed() && !session.is_changed() {
        return;
    }
    *last_rect = Some(rect);

    let fov = settings.fov_radians();
    let distance = frame_distance(&session.dimensions, fov, settings.fit_offset);
    let physical = UVec2::new(window.physical_width(), window.physical_height());
    for (mut camera, mut projection, mut orbit) in &mut cameras {
        camera.viewport = physical_viewport(rect, window.scale_factor(), physical);
        if let Projection::Perspective(p) = &mut *projection {
            p.fov = fov;
            p.near = distance / 50.0;
            p.far = distance * 50.0;
        }
        orbit.save_state(OrbitPose::looking_from(distance));
    }
    debug!(
        width = rect.width(),
        height = rect.height(),
        distance,
        "framed preview camera"
    );
}
