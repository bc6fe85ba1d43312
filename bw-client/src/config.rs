use std::path::{Path, PathBuf};

use bw_render::PreviewSettings;
use bw_utils::{BoxDimensions, DimensionError, bundled_fonts_root};
use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

#[derive(Parser, Debug, Default)]
#[command(name = "boxwright", about = "Engraving preview for gift boxes")]
pub struct Args {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<f32>,

    #[arg(long)]
    pub height: Option<f32>,

    #[arg(long)]
    pub depth: Option<f32>,

    /// Pixel ratio for generated face textures; follows the display when unset
    #[arg(long)]
    pub dpr: Option<f32>,

    /// Directory scanned for engraving fonts
    #[arg(long)]
    pub fonts_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Dimensions(#[from] DimensionError),
    #[error("pixel ratio must be a positive number, got {0}")]
    PixelRatio(f32),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(rename = "box")]
    pub box_size: BoxSection,
    pub preview: PreviewSettings,
    pub assets: AssetsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BoxSection {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub depth: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    pub fonts_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved startup configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub dimensions: BoxDimensions,
    pub preview: PreviewSettings,
}

impl ClientConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::merge(file, args)
    }

    /// Command line values win over the file, the file wins over defaults.
    pub fn merge(file: ConfigFile, args: &Args) -> Result<Self, ConfigError> {
        let defaults = BoxDimensions::default();
        let dimensions = BoxDimensions::new(
            args.width.or(file.box_size.width).unwrap_or(defaults.width),
            args.height.or(file.box_size.height).unwrap_or(defaults.height),
            args.depth.or(file.box_size.depth).unwrap_or(defaults.depth),
        )?;

        let mut preview = file.preview;
        if args.dpr.is_some() {
            preview.dpr = args.dpr;
        }
        if let Some(dpr) = preview.dpr
            && !(dpr.is_finite() && dpr > 0.0)
        {
            return Err(ConfigError::PixelRatio(dpr));
        }
        preview.fonts_dir = Some(
            args.fonts_dir
                .clone()
                .or(file.assets.fonts_dir)
                .unwrap_or_else(bundled_fonts_root),
        );

        Ok(Self {
            dimensions,
            preview,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ConfigFile {
        ConfigFile::parse(text, Path::new("boxwright.toml")).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ClientConfig::merge(parse(""), &Args::default()).unwrap();
        assert_eq!(config.dimensions, BoxDimensions::default());
        assert_eq!(config.preview.dpr, None);
        assert_eq!(config.preview.animation_ms, 200);
        assert!(config.preview.fonts_dir.is_some());
    }

    #[test]
    fn file_sections_are_read() {
        let file = parse(
            r#"
            [box]
            width = 5.0
            depth = 2.5

            [preview]
            dpr = 2.0
            fov_deg = 40.0
            animation_ms = 350

            [assets]
            fonts_dir = "/opt/fonts"
            "#,
        );
        let config = ClientConfig::merge(file, &Args::default()).unwrap();
        assert_eq!(config.dimensions.width, 5.0);
        assert_eq!(config.dimensions.height, BoxDimensions::default().height);
        assert_eq!(config.dimensions.depth, 2.5);
        assert_eq!(config.preview.dpr, Some(2.0));
        assert_eq!(config.preview.fov_deg, 40.0);
        assert_eq!(config.preview.animation_ms, 350);
        assert_eq!(config.preview.damping, PreviewSettings::default().damping);
        assert_eq!(config.preview.fonts_dir, Some(PathBuf::from("/opt/fonts")));
    }

    #[test]
    fn command_line_overrides_file() {
        let file = parse("[box]\nwidth = 5.0\n[preview]\ndpr = 2.0\n");
        let args = Args::parse_from([
            "boxwright",
            "--width",
            "7",
            "--dpr",
            "3",
            "--fonts-dir",
            "fonts",
        ]);
        let config = ClientConfig::merge(file, &args).unwrap();
        assert_eq!(config.dimensions.width, 7.0);
        assert_eq!(config.preview.dpr, Some(3.0));
        assert_eq!(config.preview.fonts_dir, Some(PathBuf::from("fonts")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let args = Args {
            height: Some(0.0),
            ..Args::default()
        };
        let err = ClientConfig::merge(ConfigFile::default(), &args).unwrap_err();
        assert!(matches!(err, ConfigError::Dimensions(_)));

        let err = ClientConfig::merge(parse("[preview]\ndpr = -1.0\n"), &Args::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::PixelRatio(_)));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let err = ConfigFile::parse("[box\nwidth = ", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ConfigFile::load(Path::new("/nonexistent/boxwright.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
