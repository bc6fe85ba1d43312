use bevy::input::touch::Touches;
use bevy::prelude::*;
use bw_utils::{ActiveFace, TouchCapture, UiState};

/// Minimum horizontal travel, in logical pixels, that counts as a swipe.
pub const SWIPE_THRESHOLD: f32 = 40.0;

/// Face step for a horizontal swipe: right goes back, left goes forward.
pub fn swipe_step(start_x: f32, end_x: f32) -> Option<isize> {
    let delta = end_x - start_x;
    if delta.abs() <= SWIPE_THRESHOLD {
        return None;
    }
    Some(if delta > 0.0 { -1 } else { 1 })
}

pub fn step_active_face(active: &mut ResMut<ActiveFace>, delta: isize) {
    let next = active.0.step(delta);
    if next != active.0 {
        active.0 = next;
    }
}

/// Swipes that began outside the preview page through faces.
pub fn swipe_navigation(
    touches: Res<Touches>,
    capture: Res<TouchCapture>,
    mut active: ResMut<ActiveFace>,
) {
    for touch in touches.iter_just_released() {
        if capture.is_captured(touch.id()) {
            continue;
        }
        if let Some(delta) = swipe_step(touch.start_position().x, touch.position().x) {
            step_active_face(&mut active, delta);
        }
    }
}

pub fn arrow_key_navigation(
    keys: Res<ButtonInput<KeyCode>>,
    ui_state: Res<UiState>,
    mut active: ResMut<ActiveFace>,
) {
    if ui_state.keyboard_captured {
        return;
    }
    if keys.just_pressed(KeyCode::ArrowLeft) {
        step_active_face(&mut active, -1);
    }
    if keys.just_pressed(KeyCode::ArrowRight) {
        step_active_face(&mut active, 1);
    }
}
