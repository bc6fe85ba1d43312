//! A bare `World` carrying everything the preview systems read, so they can
//! run without a window or renderer.

use bevy::asset::Asset;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bw_texture::TextureOptions;
use bw_utils::{ActiveFace, BoxDimensions, FaceEngravings};

use crate::lifecycle::{FaceTextures, finish_batch};
use crate::orientation::OrientationAnimation;
use crate::scene::{PreviewSession, sync_session};
use crate::settings::PreviewSettings;

pub fn preview_world() -> World {
    let mut world = World::new();
    world.init_resource::<Assets<Image>>();
    world.init_resource::<Assets<Mesh>>();
    world.init_resource::<Assets<StandardMaterial>>();
    world.init_resource::<BoxDimensions>();
    world.init_resource::<ActiveFace>();
    world.init_resource::<FaceEngravings>();
    world.init_resource::<FaceTextures>();
    world.insert_resource(PreviewSettings::default());
    world.insert_resource(OrientationAnimation::new(0.2));
    world
}

pub fn mounted_world() -> World {
    let mut world = preview_world();
    world.run_system_once(sync_session).unwrap();
    assert!(world.contains_resource::<PreviewSession>());
    world
}

pub fn live<A: Asset>(world: &World) -> usize {
    world.resource::<Assets<A>>().len()
}

/// Plans and commits the world's engravings in one step, as if the worker
/// had finished instantly.
pub fn commit_engravings(world: &mut World) {
    let slots = world.resource::<PreviewSession>().materials.clone();
    let engravings = world.resource::<FaceEngravings>().clone();
    world.resource_scope(|world, mut textures: Mut<FaceTextures>| {
        world.resource_scope(|world, mut images: Mut<Assets<Image>>| {
            let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
            let Some(batch) = textures.plan(&engravings, TextureOptions::default()) else {
                return;
            };
            assert!(textures.commit(finish_batch(batch), &mut images, &mut materials, &slots));
        });
    });
}
