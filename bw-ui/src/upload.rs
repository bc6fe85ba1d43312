use std::path::{Path, PathBuf};

use bw_utils::SourceImage;
use thiserror::Error;

pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["svg", "png", "jpg", "jpeg", "bmp"];
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{path}: only SVG, PNG, JPEG or BMP files can be engraved")]
    UnsupportedType { path: PathBuf },
    #[error("{path}: {bytes} bytes is over the 10MB limit")]
    TooLarge { path: PathBuf, bytes: u64 },
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// Reads an image file chosen in the configurator.
pub fn load_upload(path: &Path) -> Result<SourceImage, UploadError> {
    if !is_accepted(path) {
        return Err(UploadError::UnsupportedType {
            path: path.to_path_buf(),
        });
    }
    let io = |source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::metadata(path).map_err(io)?.len();
    if bytes >= MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            path: path.to_path_buf(),
            bytes,
        });
    }
    let data = std::fs::read(path).map_err(io)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SourceImage::new(name, data))
}
