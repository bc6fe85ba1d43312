use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bw_utils::{PreviewViewport, TouchCapture, UiState};

use crate::camera::container_rect;

/// Keeps the orbit strictly between the poles.
const POLAR_MARGIN: f32 = 1e-3;
const WHEEL_ZOOM_STEP: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, zero looking down -Z from +Z.
    pub yaw: f32,
    /// Elevation above the XZ plane.
    pub pitch: f32,
}

impl OrbitPose {
    pub fn looking_from(distance: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            radius: distance,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.radius
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

/// Damped orbit camera: rotate and dolly, never pan.
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    pub pose: OrbitPose,
    pub saved: OrbitPose,
    pub damping: f32,
    pub rotate_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Rotation still to be applied, (yaw, pitch) radians.
    pending: Vec2,
}

impl OrbitCamera {
    pub fn new(pose: OrbitPose, damping: f32, rotate_speed: f32) -> Self {
        let mut orbit = Self {
            pose,
            saved: pose,
            damping,
            rotate_speed,
            min_radius: 0.0,
            max_radius: f32::INFINITY,
            pending: Vec2::ZERO,
        };
        orbit.save_state(pose);
        orbit
    }

    /// New default pose; also moves the camera there.
    pub fn save_state(&mut self, pose: OrbitPose) {
        self.saved = pose;
        self.min_radius = pose.radius * 0.35;
        self.max_radius = pose.radius * 4.0;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.pose = self.saved;
        self.pending = Vec2::ZERO;
    }

    pub fn is_settled(&self) -> bool {
        self.pending.length_squared() < 1e-12
    }

    /// Queues rotation for a drag of `delta` pixels in a viewport `height` tall.
    pub fn drag(&mut self, delta: Vec2, height: f32) {
        let height = height.max(1.0);
        let per_pixel = TAU / height * self.rotate_speed;
        self.pending.x -= delta.x * per_pixel;
        self.pending.y += delta.y * per_pixel;
    }

    /// Scales the orbit radius; values below 1 move closer.
    pub fn dolly(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.pose.radius = (self.pose.radius * scale).clamp(self.min_radius, self.max_radius);
        }
    }

    /// Applies one frame of damped rotation.
    pub fn update(&mut self) {
        let step = if self.damping > 0.0 {
            self.pending * self.damping
        } else {
            self.pending
        };
        self.pose.yaw += step.x;
        self.pose.pitch = (self.pose.pitch + step.y)
            .clamp(-FRAC_PI_2 + POLAR_MARGIN, FRAC_PI_2 - POLAR_MARGIN);
        self.pending -= step;
        if self.is_settled() {
            self.pending = Vec2::ZERO;
        }
    }
}

#[derive(Default)]
pub struct DragState {
    active: bool,
}

pub fn orbit_mouse_input(
    mut drag: Local<DragState>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    ui_state: Res<UiState>,
    viewport: Res<PreviewViewport>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut orbits: Query<&mut OrbitCamera>,
) {
    let Ok(window) = windows.single() else {
        motion.clear();
        wheel.clear();
        return;
    };
    let area = container_rect(viewport.0, window.size());

    if buttons.just_pressed(MouseButton::Left) {
        let inside = window.cursor_position().is_some_and(|p| area.contains(p));
        drag.active = inside && !ui_state.pointer_over_ui;
    }
    if !buttons.pressed(MouseButton::Left) {
        drag.active = false;
    }

    let delta: Vec2 = motion.read().map(|ev| ev.delta).sum();
    let mut zoom = 1.0f32;
    for ev in wheel.read() {
        if ui_state.pointer_over_ui {
            continue;
        }
        let steps = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        zoom *= WHEEL_ZOOM_STEP.powf(steps);
    }

    for mut orbit in &mut orbits {
        if drag.active && delta != Vec2::ZERO {
            orbit.drag(delta, area.height());
        }
        if zoom != 1.0 {
            orbit.dolly(zoom);
        }
    }
}

#[derive(Default)]
pub struct PinchState {
    last_distance: Option<f32>,
}

pub fn orbit_touch_input(
    mut pinch: Local<PinchState>,
    touches: Res<Touches>,
    mut capture: ResMut<TouchCapture>,
    viewport: Res<PreviewViewport>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut orbits: Query<&mut OrbitCamera>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let area = container_rect(viewport.0, window.size());

    // Ids stay captured through the frame they are released in.
    capture.retain(|id| {
        touches.get_pressed(id).is_some() || touches.just_released(id) || touches.just_canceled(id)
    });

    for touch in touches.iter_just_pressed() {
        if area.contains(touch.start_position()) {
            capture.capture(touch.id());
        }
    }

    let captured: Vec<_> = touches
        .iter()
        .filter(|t| capture.is_captured(t.id()))
        .collect();

    match captured.as_slice() {
        [one] => {
            pinch.last_distance = None;
            let delta = one.delta();
            if delta != Vec2::ZERO {
                for mut orbit in &mut orbits {
                    orbit.drag(delta, area.height());
                }
            }
        }
        [a, b, ..] => {
            let distance = a.position().distance(b.position());
            if let Some(last) = pinch.last_distance
                && distance > 0.0
            {
                for mut orbit in &mut orbits {
                    orbit.dolly(last / distance);
                }
            }
            pinch.last_distance = Some(distance);
        }
        [] => pinch.last_distance = None,
    }
}

pub fn update_orbit_cameras(mut cameras: Query<(&mut OrbitCamera, &mut Transform)>) {
    for (mut orbit, mut transform) in &mut cameras {
        orbit.update();
        let next = orbit.pose.transform();
        if *transform != next {
            *transform = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit() -> OrbitCamera {
        OrbitCamera::new(OrbitPose::looking_from(10.0), 0.08, 0.9)
    }

    #[test]
    fn default_pose_sits_on_positive_z() {
        let pose = OrbitPose::looking_from(10.0);
        assert!(pose.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-5));
    }

    #[test]
    fn drag_rotation_is_scaled_by_viewport_height() {
        let mut orbit = orbit();
        orbit.damping = 0.0;
        orbit.rotate_speed = 1.0;
        orbit.drag(Vec2::new(100.0, 0.0), 400.0);
        orbit.update();
        assert!((orbit.pose.yaw + TAU / 4.0).abs() < 1e-5);
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut orbit = orbit();
        orbit.drag(Vec2::new(-50.0, 0.0), 500.0);
        orbit.update();
        let first = orbit.pose.yaw;
        let total = TAU / 500.0 * 0.9 * 50.0;
        assert!((first - total * 0.08).abs() < 1e-5);
        for _ in 0..400 {
            orbit.update();
        }
        assert!((orbit.pose.yaw - total).abs() < 1e-3);
        assert!(orbit.is_settled());
    }

    #[test]
    fn pitch_never_reaches_a_pole() {
        let mut orbit = orbit();
        orbit.damping = 0.0;
        orbit.drag(Vec2::new(0.0, 1e5), 100.0);
        orbit.update();
        assert!(orbit.pose.pitch < FRAC_PI_2);
        orbit.drag(Vec2::new(0.0, -1e6), 100.0);
        orbit.update();
        assert!(orbit.pose.pitch > -FRAC_PI_2);
    }

    #[test]
    fn dolly_is_clamped() {
        let mut orbit = orbit();
        orbit.dolly(0.01);
        assert_eq!(orbit.pose.radius, orbit.min_radius);
        orbit.dolly(1e4);
        assert_eq!(orbit.pose.radius, orbit.max_radius);
        orbit.dolly(f32::NAN);
        assert_eq!(orbit.pose.radius, orbit.max_radius);
    }

    #[test]
    fn reset_restores_saved_pose_and_drops_momentum() {
        let mut orbit = orbit();
        orbit.drag(Vec2::new(80.0, 30.0), 300.0);
        orbit.update();
        orbit.dolly(0.5);
        orbit.reset();
        assert_eq!(orbit.pose, orbit.saved);
        assert!(orbit.is_settled());
        orbit.update();
        assert_eq!(orbit.pose, orbit.saved);
    }
}
