use bevy::prelude::*;
use bw_utils::{ActiveFace, BoxDimensions, Face};
use tracing::{info, warn};

use crate::camera::spawn_preview_camera;
use crate::components::{BoxRoot, EdgeOutline, FaceQuad, KeyLight};
use crate::lifecycle::FaceTextures;
use crate::mesh::{edge_mesh, face_mesh};
use crate::orientation::{OrientationAnimation, face_rotation};
use crate::settings::PreviewSettings;

pub const BASE_COLOR: Color = Color::srgb(232.0 / 255.0, 222.0 / 255.0, 200.0 / 255.0);
pub const ACTIVE_COLOR: Color = Color::srgb(216.0 / 255.0, 193.0 / 255.0, 122.0 / 255.0);
pub const ACTIVE_EMISSIVE: Color = Color::srgb(144.0 / 255.0, 117.0 / 255.0, 45.0 / 255.0);
pub const EDGE_COLOR: Color = Color::srgb(111.0 / 255.0, 91.0 / 255.0, 58.0 / 255.0);
pub const METALLIC: f32 = 0.05;
pub const ROUGHNESS: f32 = 0.68;

const AMBIENT_BRIGHTNESS: f32 = 0.8 * 500.0;
const KEY_ILLUMINANCE: f32 = 0.85 * 10_000.0;
const KEY_POSITION: Vec3 = Vec3::new(6.0, 8.0, 5.0);

/// Everything spawned for one mounted preview. Present exactly while a
/// preview is mounted.
#[derive(Resource, Debug)]
pub struct PreviewSession {
    pub dimensions: BoxDimensions,
    pub root: Entity,
    pub camera: Entity,
    pub light: Entity,
    /// Face materials in slot order.
    pub materials: [Handle<StandardMaterial>; 6],
    pub edge_material: Handle<StandardMaterial>,
    pub meshes: Vec<Handle<Mesh>>,
}

pub fn face_material() -> StandardMaterial {
    StandardMaterial {
        base_color: BASE_COLOR,
        metallic: METALLIC,
        perceptual_roughness: ROUGHNESS,
        ..default()
    }
}

/// Colors the active face's material and resets every other slot.
pub fn paint_active_face(
    materials: &mut Assets<StandardMaterial>,
    slots: &[Handle<StandardMaterial>; 6],
    active: Face,
) {
    for (slot, handle) in slots.iter().enumerate() {
        let Some(material) = materials.get_mut(handle) else {
            continue;
        };
        if slot == active.slot() {
            material.base_color = ACTIVE_COLOR;
            material.emissive = ACTIVE_EMISSIVE.into();
        } else {
            material.base_color = BASE_COLOR;
            material.emissive = LinearRgba::BLACK;
        }
    }
}

pub fn mount(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    dims: BoxDimensions,
    active: Face,
    settings: &PreviewSettings,
) -> PreviewSession {
    let camera = spawn_preview_camera(commands, &dims, settings);

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_BRIGHTNESS,
        affects_lightmapped_meshes: true,
    });
    let light = commands
        .spawn((
            KeyLight,
            DirectionalLight {
                color: Color::WHITE,
                illuminance: KEY_ILLUMINANCE,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(KEY_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        ))
        .id();

    let root = commands
        .spawn((
            Name::new("BoxRoot"),
            BoxRoot,
            Transform::from_rotation(face_rotation(active)),
            GlobalTransform::default(),
            Visibility::Visible,
        ))
        .id();

    let slot_materials: [Handle<StandardMaterial>; 6] =
        std::array::from_fn(|_| materials.add(face_material()));
    paint_active_face(materials, &slot_materials, active);
    let mut mesh_handles = Vec::with_capacity(7);

    commands.entity(root).with_children(|parent| {
        for face in Face::SLOTS {
            let mesh = meshes.add(face_mesh(face, &dims));
            mesh_handles.push(mesh.clone());
            parent.spawn((
                FaceQuad { face },
                Mesh3d(mesh),
                MeshMaterial3d(slot_materials[face.slot()].clone()),
                Transform::default(),
            ));
        }
    });

    let edge_material = materials.add(StandardMaterial {
        base_color: EDGE_COLOR,
        unlit: true,
        ..default()
    });
    let edges = meshes.add(edge_mesh(&dims));
    mesh_handles.push(edges.clone());
    commands.entity(root).with_children(|parent| {
        parent.spawn((
            EdgeOutline,
            Mesh3d(edges),
            MeshMaterial3d(edge_material.clone()),
            Transform::default(),
        ));
    });

    info!(
        width = dims.width,
        height = dims.height,
        depth = dims.depth,
        "preview mounted"
    );

    PreviewSession {
        dimensions: dims,
        root,
        camera,
        light,
        materials: slot_materials,
        edge_material,
        meshes: mesh_handles,
    }
}

/// Releases everything a session owns. Entities that are already gone are
/// skipped.
pub fn teardown(
    commands: &mut Commands,
    session: &PreviewSession,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    for entity in [session.root, session.camera, session.light] {
        if let Ok(mut entity) = commands.get_entity(entity) {
            entity.despawn();
        }
    }
    for handle in session.materials.iter().chain([&session.edge_material]) {
        materials.remove(handle);
    }
    for handle in &session.meshes {
        meshes.remove(handle);
    }
    info!("preview torn down");
}

/// Mounts on the first frame and remounts whenever the box size changes.
pub fn sync_session(
    mut commands: Commands,
    dims: Res<BoxDimensions>,
    settings: Res<PreviewSettings>,
    session: Option<Res<PreviewSession>>,
    active: Res<ActiveFace>,
    mut textures: ResMut<FaceTextures>,
    mut orientation: ResMut<OrientationAnimation>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if session.is_some() && !dims.is_changed() {
        return;
    }
    if let Some(existing) = session.as_deref()
        && existing.dimensions == *dims
    {
        return;
    }
    if let Err(err) = dims.validate() {
        warn!("ignoring box dimensions: {err}");
        return;
    }

    if let Some(existing) = session.as_deref() {
        orientation.cancel();
        textures.release_all(&mut images);
        teardown(&mut commands, existing, &mut meshes, &mut materials);
    }

    let mounted = mount(
        &mut commands,
        &mut meshes,
        &mut materials,
        *dims,
        active.0,
        &settings,
    );
    textures.reset_baseline();
    commands.insert_resource(mounted);
}

/// Removes the session and all its resources. Runs on app exit and is a no-op
/// without a session.
pub fn teardown_session(
    mut commands: Commands,
    session: Option<Res<PreviewSession>>,
    mut textures: ResMut<FaceTextures>,
    mut orientation: ResMut<OrientationAnimation>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    orientation.cancel();
    textures.release_all(&mut images);
    if let Some(session) = session {
        teardown(&mut commands, &session, &mut meshes, &mut materials);
        commands.remove_resource::<PreviewSession>();
    }
}

pub fn highlight_active_face(
    active: Res<ActiveFace>,
    session: Res<PreviewSession>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if active.is_changed() {
        paint_active_face(&mut materials, &session.materials, active.0);
    }
}
