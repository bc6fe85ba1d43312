use std::path::PathBuf;

use bevy::app::Plugin;
use bevy::prelude::*;
use bevy_egui::{
    EguiContexts, EguiGlobalSettings, EguiPlugin, EguiPrimaryContextPass, PrimaryEguiContext,
    egui::{self, RichText},
};
use bw_render::PreviewSettings;
use bw_render::controls::orbit_touch_input;
use bw_utils::{
    ActiveFace, BoxDimensions, EngravingMethod, EngravingSpec, Face, FaceEngravings, ImageFit,
    Placement, PreviewViewport, TextAlign, UiState,
};
use tracing::{info, warn};

pub mod navigation;
pub mod presets;
pub mod upload;

use presets::{FONT_PLACEHOLDER, FONT_PRESETS, font_label};

const PANEL_WIDTH: f32 = 340.0;
const MIN_FONT_SIZE: f32 = 8.0;
const MAX_FONT_SIZE: f32 = 128.0;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut bevy::app::App) {
        app.insert_resource(EguiGlobalSettings {
            auto_create_primary_context: false,
            ..default()
        })
        .add_plugins(EguiPlugin::default())
        .init_resource::<ConfiguratorState>()
        .add_systems(Startup, spawn_ui_camera)
        .add_systems(
            Update,
            (
                navigation::swipe_navigation.after(orbit_touch_input),
                navigation::arrow_key_navigation,
            ),
        )
        .add_systems(EguiPrimaryContextPass, configurator_ui);
    }
}

#[derive(Resource, Default)]
pub struct ConfiguratorState {
    /// Path typed into the upload field.
    pub upload_path: String,
    pub upload_error: Option<String>,
}

/// Full-window camera that only carries the egui pass; the preview camera
/// draws into the area beside the panel.
fn spawn_ui_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("UiCamera"),
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        PrimaryEguiContext,
    ));
}

fn configurator_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<ConfiguratorState>,
    mut active: ResMut<ActiveFace>,
    mut engravings: ResMut<FaceEngravings>,
    mut dimensions: ResMut<BoxDimensions>,
    mut settings: ResMut<PreviewSettings>,
    mut viewport: ResMut<PreviewViewport>,
    mut ui_state: ResMut<UiState>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut face = active.0;
    let mut draft = engravings.get(face).clone();
    let mut dims = *dimensions;
    let mut fov = settings.fov_deg;

    egui::SidePanel::left("configurator")
        .resizable(true)
        .default_width(PANEL_WIDTH)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.label(RichText::new("ENGRAVING").small().weak());
                face_carousel(ui, &mut face);
                ui.separator();

                // A face switch this frame shows the new face next frame.
                if face == active.0 {
                    method_toggle(ui, &mut draft);
                    ui.add_space(6.0);
                    match draft.method {
                        EngravingMethod::Upload => upload_editor(ui, &mut state, &mut draft),
                        EngravingMethod::Text => text_editor(ui, &mut draft),
                    }
                }

                ui.add_space(12.0);
                egui::CollapsingHeader::new("Preview").show(ui, |ui| {
                    preview_controls(ui, &mut dims, &mut fov);
                });
            });
        });

    if face != active.0 {
        active.0 = face;
    } else if draft != *engravings.get(face) {
        engravings.set(face, draft);
    }
    if dims != *dimensions {
        match dims.validate() {
            Ok(()) => {
                info!(?dims, "box dimensions changed");
                *dimensions = dims;
            }
            Err(err) => warn!("{err}"),
        }
    }
    if fov != settings.fov_deg {
        settings.fov_deg = fov;
    }

    let free = ctx.available_rect();
    let rect = Some(Rect::new(free.min.x, free.min.y, free.max.x, free.max.y));
    if viewport.0 != rect {
        viewport.0 = rect;
    }
    let pointer_over_ui = ctx.is_pointer_over_area() || ctx.wants_pointer_input();
    let keyboard_captured = ctx.wants_keyboard_input();
    if ui_state.pointer_over_ui != pointer_over_ui || ui_state.keyboard_captured != keyboard_captured
    {
        ui_state.pointer_over_ui = pointer_over_ui;
        ui_state.keyboard_captured = keyboard_captured;
    }
}

fn face_carousel(ui: &mut egui::Ui, face: &mut Face) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new("Face").small());
            ui.heading(face.label());
        });
    });
    ui.horizontal(|ui| {
        if ui.button("‹").on_hover_text("Previous face").clicked() {
            *face = face.prev();
        }
        ui.label(format!("{} / {}", face.index() + 1, Face::ALL.len()));
        if ui.button("›").on_hover_text("Next face").clicked() {
            *face = face.next();
        }
        ui.add_space(12.0);
        for candidate in Face::ALL {
            let dot = if candidate == *face { "●" } else { "○" };
            if ui
                .selectable_label(candidate == *face, dot)
                .on_hover_text(format!("Show {}", candidate.label()))
                .clicked()
            {
                *face = candidate;
            }
        }
    });
}

fn method_toggle(ui: &mut egui::Ui, draft: &mut EngravingSpec) {
    ui.horizontal(|ui| {
        for method in EngravingMethod::ALL {
            ui.selectable_value(&mut draft.method, method, method.label());
        }
    });
    ui.label(RichText::new(draft.method.helper()).small().weak());
}

fn upload_editor(ui: &mut egui::Ui, state: &mut ConfiguratorState, draft: &mut EngravingSpec) {
    ui.horizontal(|ui| {
        let field = ui.add(
            egui::TextEdit::singleline(&mut state.upload_path)
                .hint_text("Path to SVG, PNG, JPEG or BMP"),
        );
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Load").clicked() || submitted {
            let path = PathBuf::from(state.upload_path.trim());
            match upload::load_upload(&path) {
                Ok(source) => {
                    info!(name = %source.name, bytes = source.bytes.len(), "upload loaded");
                    draft.upload = Some(source);
                    state.upload_error = None;
                }
                Err(err) => {
                    warn!("upload rejected: {err}");
                    state.upload_error = Some(err.to_string());
                }
            }
        }
    });
    let name = draft
        .upload
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or("No file chosen");
    ui.label(RichText::new(name).italics());
    if let Some(err) = &state.upload_error {
        ui.colored_label(egui::Color32::from_rgb(0xb0, 0x3a, 0x2e), err);
    }
    ui.horizontal(|ui| {
        for fit in ImageFit::ALL {
            ui.selectable_value(&mut draft.fit, fit, fit.label());
        }
    });
}

fn text_editor(ui: &mut egui::Ui, draft: &mut EngravingSpec) {
    ui.add(
        egui::TextEdit::multiline(&mut draft.text)
            .desired_rows(3)
            .hint_text("Your text"),
    );

    ui.horizontal(|ui| {
        ui.label("Font");
        egui::ComboBox::from_id_salt("font_family")
            .selected_text(font_label(&draft.font))
            .width(180.0)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut draft.font, String::new(), FONT_PLACEHOLDER);
                for (label, family) in FONT_PRESETS {
                    ui.selectable_value(&mut draft.font, family.to_string(), *label)
                        .on_hover_text(*family);
                }
            });
    });

    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut draft.size)
                .range(MIN_FONT_SIZE..=MAX_FONT_SIZE)
                .speed(1.0)
                .fixed_decimals(0),
        );
    });

    ui.horizontal(|ui| {
        ui.toggle_value(&mut draft.bold, RichText::new("B").strong())
            .on_hover_text("Bold");
        ui.toggle_value(&mut draft.italic, RichText::new("I").italics())
            .on_hover_text("Italic");
        ui.toggle_value(&mut draft.underline, RichText::new("U").underline())
            .on_hover_text("Underline");
        ui.toggle_value(&mut draft.strikethrough, RichText::new("S").strikethrough())
            .on_hover_text("Strikethrough");
    });

    ui.horizontal(|ui| {
        ui.label("Align");
        for (align, label) in TextAlign::ALL.into_iter().zip(["Left", "Center", "Right"]) {
            ui.selectable_value(&mut draft.alignment, align, label);
        }
    });

    ui.horizontal_wrapped(|ui| {
        ui.label("Placement");
        for (placement, label) in Placement::ALL
            .into_iter()
            .zip(["Top", "Left", "Center", "Right", "Bottom"])
        {
            ui.selectable_value(&mut draft.placement, placement, label);
        }
    });
}

fn preview_controls(ui: &mut egui::Ui, dims: &mut BoxDimensions, fov: &mut f32) {
    egui::Grid::new("box_dimensions").num_columns(2).show(ui, |ui| {
        for (label, value) in [
            ("Width (in)", &mut dims.width),
            ("Height (in)", &mut dims.height),
            ("Depth (in)", &mut dims.depth),
        ] {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(0.5..=24.0).speed(0.0625));
            ui.end_row();
        }
    });
    ui.add(egui::Slider::new(fov, 20.0..=60.0).text("FOV"));
}
