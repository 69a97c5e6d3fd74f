// src/io/mod.rs
mod source;

#[cfg(feature = "gdal")]
pub mod reader;
#[cfg(feature = "gdal")]
pub mod writer;

pub use source::BandSource;

#[cfg(feature = "gdal")]
pub use reader::read_composite;
#[cfg(feature = "gdal")]
pub use writer::GeoTiffWriter;
