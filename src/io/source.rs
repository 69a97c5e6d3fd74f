// src/io/source.rs
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::processing::bands::SpectralBand;

/// One composite band read from band `band_index` (1-based) of a raster file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSource {
    pub band: SpectralBand,
    pub path: PathBuf,
    pub band_index: usize,
}

impl BandSource {
    pub fn new(band: SpectralBand, path: impl Into<PathBuf>) -> Self {
        Self {
            band,
            path: path.into(),
            band_index: 1,
        }
    }

    pub fn with_band_index(mut self, band_index: usize) -> Self {
        self.band_index = band_index;
        self
    }

    /// Parse `path[:band_no]` for a known band.
    pub fn parse_location(band: SpectralBand, location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::InvalidParameter {
                name: "band source",
                reason: format!("empty path for {band}"),
            });
        }

        // A trailing `:N` selects the band; anything else belongs to the path.
        if let Some((path, index)) = location.rsplit_once(':') {
            if let Ok(band_index) = index.parse::<usize>() {
                if band_index == 0 {
                    return Err(Error::InvalidParameter {
                        name: "band source",
                        reason: "band numbers start at 1".to_string(),
                    });
                }
                return Ok(Self::new(band, path).with_band_index(band_index));
            }
        }
        Ok(Self::new(band, location))
    }
}

impl FromStr for BandSource {
    type Err = Error;

    /// `BAND=path[:band_no]`, e.g. `NIR=composite.tif:5`.
    fn from_str(s: &str) -> Result<Self> {
        let (band, location) = s.split_once('=').ok_or_else(|| Error::InvalidParameter {
            name: "band source",
            reason: format!("expected BAND=path, got {s:?}"),
        })?;
        Self::parse_location(band.parse()?, location)
    }
}

impl fmt::Display for BandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}:{}", self.band, self.path.display(), self.band_index)
    }
}
