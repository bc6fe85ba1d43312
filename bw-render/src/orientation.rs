use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;
use bw_utils::{ActiveFace, Face};

use crate::components::BoxRoot;
use crate::controls::OrbitCamera;

/// Box rotation that turns `face` toward a camera on the +Z axis.
pub fn face_rotation(face: Face) -> Quat {
    match face {
        Face::Front => Quat::IDENTITY,
        Face::Back => Quat::from_rotation_y(PI),
        Face::Right => Quat::from_rotation_y(-FRAC_PI_2),
        Face::Left => Quat::from_rotation_y(FRAC_PI_2),
        Face::Lid => Quat::from_rotation_x(FRAC_PI_2),
        Face::Bottom => Quat::from_rotation_x(-FRAC_PI_2),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationState {
    Idle,
    Animating {
        from: Quat,
        to: Quat,
        /// Set by the first frame that drives the animation.
        started_at: Option<f64>,
    },
}

#[derive(Resource, Debug, Clone)]
pub struct OrientationAnimation {
    state: OrientationState,
    duration: f32,
}

impl Default for OrientationAnimation {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl OrientationAnimation {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            state: OrientationState::Idle,
            duration: duration_secs,
        }
    }

    pub fn state(&self) -> OrientationState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, OrientationState::Animating { .. })
    }

    pub fn set_duration(&mut self, duration_secs: f32) {
        self.duration = duration_secs;
    }

    /// Replaces any running animation with one from `current` to `face`.
    pub fn begin(&mut self, current: Quat, face: Face) {
        self.state = OrientationState::Animating {
            from: current,
            to: face_rotation(face),
            started_at: None,
        };
    }

    pub fn cancel(&mut self) {
        self.state = OrientationState::Idle;
    }

    /// Rotation for time `now`, or `None` when idle. Reaching the end snaps
    /// to the exact target and goes idle.
    pub fn sample(&mut self, now: f64) -> Option<Quat> {
        let OrientationState::Animating {
            from,
            to,
            started_at,
        } = &mut self.state
        else {
            return None;
        };
        let start = *started_at.get_or_insert(now);
        let progress = if self.duration > 0.0 {
            (((now - start) as f32) / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if progress >= 1.0 {
            let target = *to;
            self.state = OrientationState::Idle;
            return Some(target);
        }
        Some(from.slerp(*to, progress))
    }
}

pub fn begin_face_orientation(
    active: Res<ActiveFace>,
    mut animation: ResMut<OrientationAnimation>,
    boxes: Query<&Transform, With<BoxRoot>>,
    mut orbits: Query<&mut OrbitCamera>,
) {
    if !active.is_changed() {
        return;
    }
    let Ok(transform) = boxes.single() else {
        return;
    };
    for mut orbit in &mut orbits {
        orbit.reset();
    }
    animation.begin(transform.rotation, active.0);
}

pub fn animate_orientation(
    time: Res<Time>,
    mut animation: ResMut<OrientationAnimation>,
    mut boxes: Query<&mut Transform, With<BoxRoot>>,
) {
    if !animation.is_animating() {
        return;
    }
    let Some(rotation) = animation.sample(time.elapsed_secs_f64()) else {
        return;
    };
    for mut transform in &mut boxes {
        transform.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Quat, b: Quat) -> bool {
        a.abs_diff_eq(b, 1e-5) || a.abs_diff_eq(-b, 1e-5)
    }

    #[test]
    fn every_face_is_turned_toward_the_viewer() {
        let outward = [
            (Face::Front, Vec3::Z),
            (Face::Back, Vec3::NEG_Z),
            (Face::Right, Vec3::X),
            (Face::Left, Vec3::NEG_X),
            (Face::Lid, Vec3::Y),
            (Face::Bottom, Vec3::NEG_Y),
        ];
        for (face, normal) in outward {
            let turned = face_rotation(face) * normal;
            assert!(turned.abs_diff_eq(Vec3::Z, 1e-5), "{face}: {turned}");
        }
    }

    #[test]
    fn start_time_comes_from_first_driven_frame() {
        let mut anim = OrientationAnimation::new(0.2);
        anim.begin(Quat::IDENTITY, Face::Back);
        // first sample is at t = 0 of the animation however late it runs
        let first = anim.sample(50.0).unwrap();
        assert!(close(first, Quat::IDENTITY));
        let mid = anim.sample(50.1).unwrap();
        assert!(close(mid, Quat::IDENTITY.slerp(face_rotation(Face::Back), 0.5)));
    }

    #[test]
    fn finishing_lands_exactly_on_target_and_idles() {
        let mut anim = OrientationAnimation::new(0.2);
        anim.begin(Quat::from_rotation_z(0.3), Face::Lid);
        anim.sample(1.0);
        let end = anim.sample(1.5).unwrap();
        assert_eq!(end, face_rotation(Face::Lid));
        assert_eq!(anim.state(), OrientationState::Idle);
        assert_eq!(anim.sample(2.0), None);
    }

    #[test]
    fn rapid_reselection_restarts_from_present_rotation() {
        let mut anim = OrientationAnimation::new(0.2);
        let mut rotation = Quat::IDENTITY;

        anim.begin(rotation, Face::Lid);
        anim.sample(0.0);
        rotation = anim.sample(0.05).unwrap();

        anim.begin(rotation, Face::Right);
        match anim.state() {
            OrientationState::Animating { from, started_at, .. } => {
                assert!(close(from, rotation));
                assert_eq!(started_at, None);
            }
            OrientationState::Idle => panic!("expected animation"),
        }

        let mut now = 0.06;
        while let Some(q) = anim.sample(now) {
            rotation = q;
            now += 0.016;
        }
        assert_eq!(rotation, face_rotation(Face::Right));
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let mut anim = OrientationAnimation::new(0.0);
        anim.begin(Quat::IDENTITY, Face::Left);
        assert_eq!(anim.sample(3.0), Some(face_rotation(Face::Left)));
        assert!(!anim.is_animating());
    }
}
