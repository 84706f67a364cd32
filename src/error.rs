use std::{io, path::PathBuf};

use crate::image::ParseColorError;

/// Errors that can occur while rendering or encoding a splash animation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("could not find '{}', make sure the file exists", .path.display())]
    InputNotFound { path: PathBuf },
    #[error("'{}' is not a usable font file", .path.display())]
    InvalidFont { path: PathBuf },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    InvalidColor(#[from] ParseColorError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
