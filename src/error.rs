//! Error types shared by the tiler, the projectors and the CLI.

use thiserror::Error;

/// Everything that can go wrong while building or projecting a plane.
#[derive(Error, Debug)]
pub enum Error {
    /// Tile variants (or generator outputs) disagree in pixel size.
    #[error("tile dimensions differ: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    /// Degenerate tile radius, zero-area canvas, empty tile list...
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Advisory only: visible torus pixels that no sample reached.
    #[error("sampling underrun: {holes} pixel(s) left unwritten inside the surface")]
    SamplingUnderrun { holes: usize },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
