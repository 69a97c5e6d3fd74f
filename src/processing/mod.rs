// src/processing/mod.rs
pub mod bands;
pub mod composite;
pub mod indices;
pub mod parallel;
pub mod registry;

// Re-export main components
pub use bands::{Pixel, SpectralBand};
pub use composite::{Composite, GeoInfo, Raster, Window};
pub use parallel::{Evaluator, IndexCalculator, IndexResult, RasterStats};
pub use registry::{Color, DisplayRange, IndexDefinition, Registry};
