// src/processing/composite.rs
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::processing::bands::SpectralBand;

/// Georeferencing copied from the source dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    pub projection: String,
    pub geo_transform: [f64; 6],
}

/// Pixel window `(x, y, width, height)` inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    fn fits(&self, shape: (usize, usize)) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|end| end <= shape.0)
            && self.y.checked_add(self.height).is_some_and(|end| end <= shape.1)
    }
}

/// Single-band `f32` raster stored row-major, shape is `(width, height)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    shape: (usize, usize),
    data: Vec<f32>,
}

impl Raster {
    pub fn new(shape: (usize, usize), data: Vec<f32>) -> Result<Self> {
        if data.len() != shape.0 * shape.1 {
            return Err(Error::BufferLength {
                len: data.len(),
                width: shape.0,
                height: shape.1,
            });
        }
        Ok(Self { shape, data })
    }

    pub fn filled(shape: (usize, usize), value: f32) -> Self {
        Self {
            shape,
            data: vec![value; shape.0 * shape.1],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn width(&self) -> usize {
        self.shape.0
    }

    pub fn height(&self) -> usize {
        self.shape.1
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.shape.0 && y < self.shape.1 {
            Some(self.data[y * self.shape.0 + x])
        } else {
            None
        }
    }

    /// Copy out the pixels covered by `window`.
    pub fn crop(&self, window: Window) -> Result<Raster> {
        if !window.fits(self.shape) {
            return Err(Error::InvalidWindow {
                window: (window.x, window.y, window.width, window.height),
                width: self.shape.0,
                height: self.shape.1,
            });
        }

        let mut data = Vec::with_capacity(window.width * window.height);
        for row in self.data.chunks_exact(self.shape.0).skip(window.y).take(window.height) {
            data.extend_from_slice(&row[window.x..window.x + window.width]);
        }

        Ok(Raster {
            shape: (window.width, window.height),
            data,
        })
    }
}

/// Multi-band raster over a fixed extent, one [`Raster`] per spectral band.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    shape: (usize, usize),
    bands: BTreeMap<SpectralBand, Raster>,
    geo_info: Option<GeoInfo>,
}

impl Composite {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            shape,
            bands: BTreeMap::new(),
            geo_info: None,
        }
    }

    pub fn with_band(mut self, band: SpectralBand, raster: Raster) -> Result<Self> {
        self.insert_band(band, raster)?;
        Ok(self)
    }

    pub fn with_geo_info(mut self, geo_info: GeoInfo) -> Self {
        self.geo_info = Some(geo_info);
        self
    }

    /// Add or replace a band. The raster must match the composite's shape.
    pub fn insert_band(&mut self, band: SpectralBand, raster: Raster) -> Result<()> {
        if raster.shape() != self.shape {
            return Err(Error::ShapeMismatch {
                expected: self.shape,
                actual: raster.shape(),
            });
        }
        self.bands.insert(band, raster);
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn pixel_count(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    pub fn band(&self, band: SpectralBand) -> Option<&Raster> {
        self.bands.get(&band)
    }

    pub fn has_band(&self, band: SpectralBand) -> bool {
        self.bands.contains_key(&band)
    }

    pub fn bands(&self) -> impl Iterator<Item = SpectralBand> + '_ {
        self.bands.keys().copied()
    }

    pub fn geo_info(&self) -> Option<&GeoInfo> {
        self.geo_info.as_ref()
    }

    /// Divide every band by `factor`, e.g. 10000 for scaled reflectance products.
    pub fn rescale(&mut self, factor: f32) -> Result<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::InvalidParameter {
                name: "input_scale_factor",
                reason: format!("must be a positive number, got {factor}"),
            });
        }
        if (factor - 1.0).abs() <= f32::EPSILON {
            return Ok(());
        }

        for raster in self.bands.values_mut() {
            raster.data_mut().par_iter_mut().for_each(|value| *value /= factor);
        }
        Ok(())
    }
}
