use std::process::ExitCode;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bw_render::PreviewPlugin;
use bw_ui::UiPlugin;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{Args, ClientConfig};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match ClientConfig::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        width = config.dimensions.width,
        height = config.dimensions.height,
        depth = config.dimensions.depth,
        dpr = ?config.preview.dpr,
        "Starting boxwright"
    );

    let exit = App::new()
        .add_plugins(
            DefaultPlugins
                .build()
                .disable::<LogPlugin>()
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Boxwright".to_string(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .insert_resource(ClearColor(Color::srgb(0.96, 0.95, 0.93)))
        .insert_resource(config.dimensions)
        .add_plugins(PreviewPlugin::new(config.preview))
        .add_plugins(UiPlugin)
        .run();

    match exit {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}
