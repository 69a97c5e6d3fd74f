// src/error.rs
use thiserror::Error;

use crate::processing::bands::SpectralBand;

/// Errors raised by index lookup, evaluation and export.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown vegetation index {0:?}")]
    UnknownIndex(String),

    #[error("composite is missing required band {0}")]
    MissingBand(SpectralBand),

    #[error("unknown spectral band {0:?}")]
    UnknownBand(String),

    #[error("raster buffer holds {len} values, expected {width}x{height}")]
    BufferLength {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("raster size mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("window {window:?} is outside a {width}x{height} raster")]
    InvalidWindow {
        window: (usize, usize, usize, usize),
        width: usize,
        height: usize,
    },

    #[error("invalid color {0:?}")]
    InvalidColor(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid export request: {0}")]
    InvalidExport(String),

    #[error("export queue is closed")]
    ExportClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

pub type Result<T> = std::result::Result<T, Error>;
