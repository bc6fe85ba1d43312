use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("failed to decode upload `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("upload `{name}` decoded to an empty image")]
    EmptyImage { name: String },
    #[error("cannot allocate a {width}x{height} drawing surface")]
    Surface { width: u32, height: u32 },
    #[error("no font available for `{family}`")]
    FontUnavailable { family: String },
}
