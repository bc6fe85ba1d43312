use bevy::prelude::*;
use bw_utils::Face;

/// Parent of the face quads and outline; orientation rotates this.
#[derive(Component)]
pub struct BoxRoot;

#[derive(Component, Debug, Clone, Copy)]
pub struct FaceQuad {
    pub face: Face,
}

#[derive(Component)]
pub struct EdgeOutline;

#[derive(Component)]
pub struct PreviewCamera;

#[derive(Component)]
pub struct KeyLight;
