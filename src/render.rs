// src/render.rs
//! Turning an [`IndexResult`] into something a map or legend can draw.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::processing::bands::SpectralBand;
use crate::processing::composite::{Composite, Raster};
use crate::processing::parallel::IndexResult;
use crate::processing::registry::{Color, DisplayRange, IndexDefinition};

/// RGBA written for NaN and infinite pixels.
pub const NODATA_RGBA: [u8; 4] = [0, 0, 0, 0];

/// Resolved stretch and ramp for one result.
#[derive(Debug, Clone, PartialEq)]
pub struct VisParams {
    pub range: DisplayRange,
    pub palette: Vec<Color>,
}

impl VisParams {
    /// Use the result's fixed range, or stretch over its finite pixels.
    pub fn from_result(result: &IndexResult) -> Self {
        let range = result.display_range.unwrap_or_else(|| {
            let stats = result.stats();
            match (stats.min, stats.max) {
                (Some(min), Some(max)) if max > min => DisplayRange::new(min, max),
                (Some(v), Some(_)) => DisplayRange::new(v, v + 1.0),
                _ => DisplayRange::new(0.0, 1.0),
            }
        });

        Self {
            range,
            palette: result.palette.clone(),
        }
    }

    /// Color for a single value; `None` for non-finite input.
    pub fn color_for(&self, value: f32) -> Option<Color> {
        if !value.is_finite() {
            return None;
        }
        let span = self.range.max - self.range.min;
        let t = if span.abs() > f32::EPSILON {
            ((value - self.range.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(ramp(&self.palette, t))
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

// Evenly spaced stops, linear between neighbours.
fn ramp(palette: &[Color], t: f32) -> Color {
    match palette {
        [] => Color::BLACK,
        [only] => *only,
        _ => {
            let scaled = t * (palette.len() - 1) as f32;
            let lower = (scaled.floor() as usize).min(palette.len() - 2);
            let frac = scaled - lower as f32;
            let (c1, c2) = (palette[lower], palette[lower + 1]);
            Color::new(lerp(c1.r, c2.r, frac), lerp(c1.g, c2.g, frac), lerp(c1.b, c2.b, frac))
        }
    }
}

/// Row-major RGBA pixels, 4 bytes per pixel.
pub fn colorize(result: &IndexResult, vis: &VisParams) -> Vec<u8> {
    result
        .raster
        .data()
        .iter()
        .flat_map(|&value| match vis.color_for(value) {
            Some(Color { r, g, b }) => [r, g, b, 255],
            None => NODATA_RGBA,
        })
        .collect()
}

/// Bands drawn into the red, green and blue channels of a true-color view.
pub const TRUE_COLOR_BANDS: [SpectralBand; 3] =
    [SpectralBand::Red, SpectralBand::Green, SpectralBand::Blue];

/// Surface reflectance stretch for a true-color view.
pub const TRUE_COLOR_STRETCH: DisplayRange = DisplayRange::new(0.0, 0.25);

fn stretch_channel(value: f32, stretch: DisplayRange) -> u8 {
    let span = stretch.max - stretch.min;
    if span.abs() <= f32::EPSILON {
        return 0;
    }
    (((value - stretch.min) / span).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Row-major RGBA of the composite's red, green and blue bands, each linearly
/// stretched over `stretch`. A pixel with any non-finite channel is no-data.
pub fn composite_rgba(composite: &Composite, stretch: DisplayRange) -> Result<Vec<u8>> {
    let channel = move |band: SpectralBand| {
        composite
            .band(band)
            .map(Raster::data)
            .ok_or(Error::MissingBand(band))
    };
    let [red, green, blue] = TRUE_COLOR_BANDS;
    let (red, green, blue) = (channel(red)?, channel(green)?, channel(blue)?);

    Ok(red
        .iter()
        .zip(green)
        .zip(blue)
        .flat_map(|((&r, &g), &b)| {
            if r.is_finite() && g.is_finite() && b.is_finite() {
                [
                    stretch_channel(r, stretch),
                    stretch_channel(g, stretch),
                    stretch_channel(b, stretch),
                    255,
                ]
            } else {
                NODATA_RGBA
            }
        })
        .collect())
}

/// Data backing a legend widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub palette: Vec<Color>,
}

impl Legend {
    pub fn for_definition(definition: &IndexDefinition) -> Self {
        Self {
            title: definition.name.to_string(),
            min: definition.display_range.map(|r| r.min),
            max: definition.display_range.map(|r| r.max),
            palette: definition.palette.to_vec(),
        }
    }

    pub fn for_result(result: &IndexResult) -> Self {
        let vis = VisParams::from_result(result);
        Self {
            title: result.index.clone(),
            min: Some(vis.range.min),
            max: Some(vis.range.max),
            palette: vis.palette,
        }
    }
}
