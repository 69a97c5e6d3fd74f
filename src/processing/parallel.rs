// src/processing/parallel.rs
use std::time::Instant;

use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::processing::bands::{Pixel, SpectralBand};
use crate::processing::composite::{Composite, GeoInfo, Raster};
use crate::processing::registry::{Color, DisplayRange, IndexDefinition};

const DEFAULT_BLOCK_ROWS: usize = 256;

/// Trait for spectral index calculators
pub trait IndexCalculator: Send + Sync {
    /// Calculate the index for one pixel
    fn calculate(&self, pixel: &Pixel) -> f32;

    /// Bands the formula reads, in validation order
    fn required_bands(&self) -> &[SpectralBand];

    /// Return the name of the index
    fn name(&self) -> &str;
}

impl IndexCalculator for IndexDefinition {
    fn calculate(&self, pixel: &Pixel) -> f32 {
        self.apply(pixel)
    }

    fn required_bands(&self) -> &[SpectralBand] {
        self.required_bands
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Single-band output of an index evaluation plus its display defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexResult {
    pub index: String,
    pub raster: Raster,
    pub geo_info: Option<GeoInfo>,
    pub display_range: Option<DisplayRange>,
    pub palette: Vec<Color>,
}

/// Summary over the finite pixels of a result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterStats {
    pub count: usize,
    pub finite: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub mean: Option<f64>,
}

impl IndexResult {
    pub fn with_display_range(mut self, range: Option<DisplayRange>) -> Self {
        self.display_range = range;
        self
    }

    pub fn with_palette(mut self, palette: Vec<Color>) -> Result<Self> {
        if palette.len() < 2 {
            return Err(Error::InvalidParameter {
                name: "palette",
                reason: format!("needs at least two colors, got {}", palette.len()),
            });
        }
        self.palette = palette;
        Ok(self)
    }

    pub fn stats(&self) -> RasterStats {
        let finite = || self.raster.data().iter().copied().filter(|v| v.is_finite());
        let (min, max) = match finite().minmax_by(f32::total_cmp) {
            itertools::MinMaxResult::NoElements => (None, None),
            itertools::MinMaxResult::OneElement(v) => (Some(v), Some(v)),
            itertools::MinMaxResult::MinMax(lo, hi) => (Some(lo), Some(hi)),
        };
        let (sum, count) = finite().fold((0.0f64, 0usize), |(sum, n), v| (sum + v as f64, n + 1));

        RasterStats {
            count: self.raster.len(),
            finite: count,
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
        }
    }
}

/// Applies index formulas to composites, partitioned into row blocks across
/// the rayon pool.
#[derive(Debug, Clone)]
pub struct Evaluator {
    block_rows: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            block_rows: DEFAULT_BLOCK_ROWS,
        }
    }

    pub fn with_block_rows(block_rows: usize) -> Self {
        Self {
            block_rows: block_rows.max(1),
        }
    }

    /// Evaluate a catalog entry, carrying its display range and palette into the result.
    pub fn evaluate(
        &self,
        definition: &IndexDefinition,
        composite: &Composite,
    ) -> Result<IndexResult> {
        let raster = self.calculate(definition, composite)?;
        Ok(IndexResult {
            index: definition.name.to_string(),
            raster,
            geo_info: composite.geo_info().cloned(),
            display_range: definition.display_range,
            palette: definition.palette.to_vec(),
        })
    }

    /// Run any calculator over the composite.
    ///
    /// Fails with [`Error::MissingBand`] for the first required band the
    /// composite lacks, before any pixel is computed.
    pub fn calculate<I: IndexCalculator + ?Sized>(
        &self,
        calculator: &I,
        composite: &Composite,
    ) -> Result<Raster> {
        let inputs = calculator
            .required_bands()
            .iter()
            .map(|&band| {
                composite
                    .band(band)
                    .map(|raster| (band, raster.data()))
                    .ok_or(Error::MissingBand(band))
            })
            .collect::<Result<Vec<_>>>()?;

        let (width, height) = composite.shape();
        let block_len = (self.block_rows * width).max(1);
        debug!(
            "Evaluating {} over {}x{} pixels ({} bands: {}), {} rows per block",
            calculator.name(),
            width,
            height,
            inputs.len(),
            inputs.iter().map(|(band, _)| band).join(", "),
            self.block_rows
        );

        let started = Instant::now();
        let mut result_data = vec![0.0f32; width * height];
        result_data
            .par_chunks_mut(block_len)
            .enumerate()
            .for_each(|(block, out)| {
                let offset = block * block_len;
                let mut pixel = Pixel::default();
                for (i, result) in out.iter_mut().enumerate() {
                    for (band, data) in &inputs {
                        pixel.set(*band, data[offset + i]);
                    }
                    *result = calculator.calculate(&pixel);
                }
            });
        debug!("{} finished in {:?}", calculator.name(), started.elapsed());

        Raster::new((width, height), result_data)
    }
}
