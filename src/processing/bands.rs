// src/processing/bands.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Canonical spectral channels of an optical composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpectralBand {
    Blue,
    Green,
    Red,
    Nir,
    Swir1,
    Swir2,
}

impl SpectralBand {
    pub const ALL: [SpectralBand; 6] = [
        SpectralBand::Blue,
        SpectralBand::Green,
        SpectralBand::Red,
        SpectralBand::Nir,
        SpectralBand::Swir1,
        SpectralBand::Swir2,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SpectralBand::Blue => "BLUE",
            SpectralBand::Green => "GREEN",
            SpectralBand::Red => "RED",
            SpectralBand::Nir => "NIR",
            SpectralBand::Swir1 => "SWIR1",
            SpectralBand::Swir2 => "SWIR2",
        }
    }

    /// Short alias used in formula tables (B, G, R, N, S1, S2).
    pub const fn alias(self) -> &'static str {
        match self {
            SpectralBand::Blue => "B",
            SpectralBand::Green => "G",
            SpectralBand::Red => "R",
            SpectralBand::Nir => "N",
            SpectralBand::Swir1 => "S1",
            SpectralBand::Swir2 => "S2",
        }
    }

    /// Landsat 8 OLI Collection 2 band code.
    pub const fn landsat8_code(self) -> &'static str {
        match self {
            SpectralBand::Blue => "B2",
            SpectralBand::Green => "B3",
            SpectralBand::Red => "B4",
            SpectralBand::Nir => "B5",
            SpectralBand::Swir1 => "B6",
            SpectralBand::Swir2 => "B7",
        }
    }

    pub fn from_landsat8_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|band| band.landsat8_code().eq_ignore_ascii_case(code))
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SpectralBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpectralBand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|band| {
                band.name().eq_ignore_ascii_case(s) || band.alias().eq_ignore_ascii_case(s)
            })
            .or_else(|| Self::from_landsat8_code(s))
            .ok_or_else(|| Error::UnknownBand(s.to_string()))
    }
}

/// Band values of a single pixel, as seen by an index formula.
///
/// Bands that were not loaded read as NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    values: [f32; 6],
}

impl Default for Pixel {
    fn default() -> Self {
        Self {
            values: [f32::NAN; 6],
        }
    }
}

impl Pixel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, band: SpectralBand, value: f32) -> Self {
        self.set(band, value);
        self
    }

    #[inline]
    pub fn set(&mut self, band: SpectralBand, value: f32) {
        self.values[band.slot()] = value;
    }

    #[inline]
    pub fn get(&self, band: SpectralBand) -> f32 {
        self.values[band.slot()]
    }

    #[inline]
    pub fn blue(&self) -> f32 {
        self.values[SpectralBand::Blue.slot()]
    }

    #[inline]
    pub fn green(&self) -> f32 {
        self.values[SpectralBand::Green.slot()]
    }

    #[inline]
    pub fn red(&self) -> f32 {
        self.values[SpectralBand::Red.slot()]
    }

    #[inline]
    pub fn nir(&self) -> f32 {
        self.values[SpectralBand::Nir.slot()]
    }

    #[inline]
    pub fn swir1(&self) -> f32 {
        self.values[SpectralBand::Swir1.slot()]
    }

    #[inline]
    pub fn swir2(&self) -> f32 {
        self.values[SpectralBand::Swir2.slot()]
    }
}
