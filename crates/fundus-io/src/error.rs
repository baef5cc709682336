use std::path::PathBuf;

use fundus_pipeline::PipelineError;

/// Errors that can occur while reading datasets or writing results.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// A directory could not be listed.
    #[error("cannot read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An output directory could not be created.
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file could not be opened or is not a decodable image.
    #[error("cannot decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// A result image could not be written.
    #[error("cannot write image {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// The decoded image was rejected by the pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
