use std::sync::{Arc, PoisonError};

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bw_texture::{SystemFonts, TextureOptions};
use bw_utils::{ActiveFace, BoxDimensions, FaceEngravings, PreviewViewport, TouchCapture, UiState};
use tracing::error;

mod async_texture;
pub mod camera;
mod components;
pub mod controls;
pub mod lifecycle;
pub mod mesh;
pub mod orientation;
pub mod scene;
pub mod settings;
#[cfg(test)]
mod test_support;

pub use async_texture::TextureWorker;
pub use components::{BoxRoot, EdgeOutline, FaceQuad, KeyLight, PreviewCamera};
pub use lifecycle::FaceTextures;
pub use orientation::OrientationAnimation;
pub use scene::PreviewSession;
pub use settings::PreviewSettings;

/// Live 3-D preview of the engraved box.
#[derive(Default)]
pub struct PreviewPlugin {
    pub settings: PreviewSettings,
}

impl PreviewPlugin {
    pub fn new(settings: PreviewSettings) -> Self {
        Self { settings }
    }
}

impl Plugin for PreviewPlugin {
    fn build(&self, app: &mut App) {
        let fonts = SystemFonts::new(self.settings.fonts_dir.as_deref());
        match TextureWorker::spawn(Arc::new(fonts)) {
            Ok(worker) => {
                app.insert_resource(worker);
            }
            Err(err) => error!("texture worker unavailable, faces stay blank: {err}"),
        }

        app.insert_resource(self.settings.clone())
            .insert_resource(OrientationAnimation::new(self.settings.animation_secs()))
            .init_resource::<BoxDimensions>()
            .init_resource::<FaceEngravings>()
            .init_resource::<ActiveFace>()
            .init_resource::<PreviewViewport>()
            .init_resource::<UiState>()
            .init_resource::<TouchCapture>()
            .init_resource::<FaceTextures>()
            .add_systems(
                Update,
                (
                    scene::sync_session,
                    (
                        settings::apply_preview_settings,
                        camera::frame_preview_camera,
                        scene::highlight_active_face,
                        orientation::begin_face_orientation,
                        controls::orbit_mouse_input,
                        controls::orbit_touch_input,
                        controls::update_orbit_cameras,
                        orientation::animate_orientation,
                        queue_texture_batches,
                        apply_texture_results,
                    )
                        .chain()
                        .run_if(resource_exists::<PreviewSession>),
                )
                    .chain(),
            )
            .add_systems(Last, scene::teardown_session.run_if(on_event::<AppExit>));
    }
}

fn queue_texture_batches(
    engravings: Res<FaceEngravings>,
    settings: Res<PreviewSettings>,
    session: Res<PreviewSession>,
    mut textures: ResMut<FaceTextures>,
    mut last_dpr: Local<Option<f32>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    worker: Option<Res<TextureWorker>>,
) {
    let dpr = settings.texture_dpr(windows.single().ok().map(Window::scale_factor));
    let dpr_changed = last_dpr.is_some_and(|last| last != dpr);
    *last_dpr = Some(dpr);
    if dpr_changed {
        // every face is redrawn at the new pixel ratio
        textures.reset_baseline();
    } else if !engravings.is_changed() && !session.is_changed() {
        return;
    }
    let Some(worker) = worker else {
        return;
    };
    let options = TextureOptions { dpr };
    if let Some(batch) = textures.plan(&engravings, options) {
        // a closed channel means the app is shutting down
        let _ = worker.job_tx.send(batch);
    }
}

fn apply_texture_results(
    worker: Option<Res<TextureWorker>>,
    session: Res<PreviewSession>,
    mut textures: ResMut<FaceTextures>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(worker) = worker else {
        return;
    };
    let mut receiver = worker
        .result_rx
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    while let Ok(result) = receiver.try_recv() {
        textures.commit(result, &mut images, &mut materials, &session.materials);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bevy::ecs::system::{RunSystemOnce, SystemId};
    use bevy::window::WindowResolution;
    use bw_utils::{EngravingSpec, Face};
    use tokio::runtime::Runtime;
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

    use super::*;
    use crate::lifecycle::{BatchResult, TextureBatch, finish_batch};
    use crate::test_support::{live, mounted_world};

    struct WorkerEnds {
        jobs: UnboundedReceiver<TextureBatch>,
        results: UnboundedSender<BatchResult>,
    }

    /// Installs a worker whose channels the test drives by hand.
    fn install_worker(world: &mut World) -> WorkerEnds {
        let (job_tx, jobs) = unbounded_channel();
        let (results, result_rx) = unbounded_channel();
        world.insert_resource(TextureWorker {
            runtime: Arc::new(Runtime::new().unwrap()),
            job_tx,
            result_rx: Mutex::new(result_rx),
        });
        WorkerEnds { jobs, results }
    }

    fn spawn_window(world: &mut World, scale: f32) -> Entity {
        world
            .spawn((
                Window {
                    resolution: WindowResolution::new(800.0, 600.0)
                        .with_scale_factor_override(scale),
                    ..default()
                },
                PrimaryWindow,
            ))
            .id()
    }

    fn set_scale(world: &mut World, window: Entity, scale: f32) {
        let mut window = world.get_mut::<Window>(window).unwrap();
        window.resolution.set_scale_factor_override(Some(scale));
    }

    #[test]
    fn results_are_bound_to_their_slots() {
        let mut world = mounted_world();
        let mut ends = install_worker(&mut world);
        world.insert_resource(
            FaceEngravings::default()
                .with(Face::Lid, EngravingSpec::text("top"))
                .with(Face::Right, EngravingSpec::text("side")),
        );

        world.run_system_once(queue_texture_batches).unwrap();
        let batch = ends.jobs.try_recv().unwrap();
        ends.results.send(finish_batch(batch)).unwrap();
        world.run_system_once(apply_texture_results).unwrap();

        let slots = world.resource::<PreviewSession>().materials.clone();
        let textures = world.resource::<FaceTextures>();
        let materials = world.resource::<Assets<StandardMaterial>>();
        for face in Face::ALL {
            let bound = materials
                .get(&slots[face.slot()])
                .and_then(|m| m.base_color_texture.clone());
            assert_eq!(bound.as_ref(), textures.bound(face), "{face}");
            assert_eq!(bound.is_some(), matches!(face, Face::Lid | Face::Right), "{face}");
        }
        assert_eq!(live::<Image>(&world), 2);
    }

    #[test]
    fn superseded_result_is_dropped() {
        let mut world = mounted_world();
        let mut ends = install_worker(&mut world);
        let queue: SystemId = world.register_system(queue_texture_batches);
        world.insert_resource(FaceEngravings::default().with(Face::Front, EngravingSpec::text("A")));
        world.run_system(queue).unwrap();
        let stale = ends.jobs.try_recv().unwrap();

        world.insert_resource(FaceEngravings::default().with(Face::Front, EngravingSpec::text("B")));
        world.run_system(queue).unwrap();
        let fresh = ends.jobs.try_recv().unwrap();

        ends.results.send(finish_batch(stale)).unwrap();
        world.run_system_once(apply_texture_results).unwrap();
        assert_eq!(live::<Image>(&world), 0);

        ends.results.send(finish_batch(fresh)).unwrap();
        world.run_system_once(apply_texture_results).unwrap();
        assert_eq!(live::<Image>(&world), 1);
    }

    #[test]
    fn texture_pixel_ratio_tracks_the_window() {
        let mut world = mounted_world();
        let mut ends = install_worker(&mut world);
        let window = spawn_window(&mut world, 2.0);
        world.insert_resource(
            Face::ALL.into_iter().fold(FaceEngravings::default(), |acc, face| {
                acc.with(face, EngravingSpec::text(face.label()))
            }),
        );
        let queue: SystemId = world.register_system(queue_texture_batches);

        world.run_system(queue).unwrap();
        let first = ends.jobs.try_recv().unwrap();
        assert_eq!(first.options.dpr, 2.0);
        ends.results.send(finish_batch(first)).unwrap();
        world.run_system_once(apply_texture_results).unwrap();
        assert_eq!(live::<Image>(&world), 6);

        world.run_system(queue).unwrap();
        assert!(ends.jobs.try_recv().is_err());

        // moving to another monitor redraws every face at the new density
        set_scale(&mut world, window, 1.5);
        world.run_system(queue).unwrap();
        let redraw = ends.jobs.try_recv().unwrap();
        assert_eq!(redraw.options.dpr, 1.5);
        assert_eq!(redraw.faces.len(), 6);
    }

    #[test]
    fn configured_pixel_ratio_overrides_the_window() {
        let mut world = mounted_world();
        let mut ends = install_worker(&mut world);
        spawn_window(&mut world, 2.0);
        world.resource_mut::<PreviewSettings>().dpr = Some(3.0);

        world.run_system_once(queue_texture_batches).unwrap();
        assert_eq!(ends.jobs.try_recv().unwrap().options.dpr, 3.0);
    }

    #[test]
    fn poisoned_result_channel_still_commits() {
        let mut world = mounted_world();
        let mut ends = install_worker(&mut world);
        world.insert_resource(FaceEngravings::default().with(Face::Back, EngravingSpec::text("A")));
        world.run_system_once(queue_texture_batches).unwrap();
        let batch = ends.jobs.try_recv().unwrap();

        let worker = world.resource::<TextureWorker>();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = worker.result_rx.lock().unwrap();
            panic!("poison the result lock");
        }));
        assert!(worker.result_rx.is_poisoned());

        ends.results.send(finish_batch(batch)).unwrap();
        world.run_system_once(apply_texture_results).unwrap();
        assert_eq!(live::<Image>(&world), 1);
    }
}
