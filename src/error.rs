use std::{io, path::PathBuf};

use thiserror::Error;

use crate::dungeon::error::DecodeError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("tile asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    #[error("tile asset '{name}' is {found:?}, expected {expected:?} like the others")]
    AssetSizeMismatch {
        name: String,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("tile asset '{name}' is {}x{}, tiles must be square", .size.0, .size.1)]
    NonSquareTile { name: String, size: (u32, u32) },

    #[error("no level_*.json files in {}", .0.display())]
    NoLevels(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
