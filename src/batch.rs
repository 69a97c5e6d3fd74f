// src/batch.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::{Encoding, ExportDescriptor};
use crate::io::BandSource;
use crate::processing::bands::SpectralBand;
use crate::processing::registry::{Color, DisplayRange, Registry};
use crate::render::TRUE_COLOR_BANDS;

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    /// Band name to `path[:band_no]`, shared by every operation.
    #[serde(default)]
    pub bands: BTreeMap<String, String>,
    pub operations: Vec<Operation>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GlobalParams {
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub float: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: i32,
    #[serde(default = "default_true")]
    pub tiled: bool,
    #[serde(default = "default_input_scale_factor")]
    pub input_scale_factor: f32,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            compress: default_compress(),
            compress_level: default_compress_level(),
            float: true,
            scale_factor: default_scale_factor(),
            tiled: true,
            input_scale_factor: default_input_scale_factor(),
            scale: default_scale(),
        }
    }
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_scale_factor() -> i32 {
    10000
}

fn default_true() -> bool {
    true
}

fn default_input_scale_factor() -> f32 {
    1.0
}

fn default_scale() -> f64 {
    30.0
}

#[derive(Deserialize, Serialize, Debug)]
pub struct Operation {
    pub index: String,
    pub output: String,
    /// Per-operation band overrides.
    #[serde(default)]
    pub bands: BTreeMap<String, String>,
    pub float: Option<bool>,
    pub scale_factor: Option<i32>,
    pub compress: Option<String>,
    pub compress_level: Option<u8>,
    pub tiled: Option<bool>,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub palette: Option<Vec<Color>>,
    /// Optional RGBA rendering written next to the export.
    pub preview: Option<String>,
    /// Optional true-color rendering of the operation's input bands.
    pub rgb_preview: Option<String>,
}

impl Operation {
    pub fn display_range(&self) -> Result<Option<DisplayRange>> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Ok(Some(DisplayRange::new(min, max))),
            (None, None) => Ok(None),
            _ => Err(Error::InvalidParameter {
                name: "min/max",
                reason: format!("{}: both or neither must be set", self.index),
            }),
        }
    }

    /// Export settings with operation overrides applied over `global`.
    pub fn descriptor(&self, global: &GlobalParams) -> ExportDescriptor {
        let mut descriptor = ExportDescriptor::new(&self.index, &self.output);
        descriptor.scale = global.scale;
        descriptor.encoding = if self.float.unwrap_or(global.float) {
            Encoding::Float32
        } else {
            Encoding::FixedPoint {
                scale_factor: self.scale_factor.unwrap_or(global.scale_factor),
            }
        };
        descriptor.compress = self.compress.clone().unwrap_or_else(|| global.compress.clone());
        descriptor.compress_level = self.compress_level.unwrap_or(global.compress_level);
        descriptor.tiled = self.tiled.unwrap_or(global.tiled);
        descriptor
    }
}

fn parse_sources(bands: &BTreeMap<String, String>) -> Result<BTreeMap<SpectralBand, BandSource>> {
    bands
        .iter()
        .map(|(name, location)| {
            let band: SpectralBand = name.parse()?;
            Ok((band, BandSource::parse_location(band, location)?))
        })
        .collect()
}

impl BatchConfig {
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)?;
        Ok(serde_json::from_str(&config_content)?)
    }

    /// Check index names, band names, display overrides and export settings
    /// before any raster is read.
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        let global = parse_sources(&self.bands)?;
        for op in &self.operations {
            let definition = registry.get(&op.index)?;
            let local = parse_sources(&op.bands)?;
            let missing = |bands: &[SpectralBand]| {
                bands
                    .iter()
                    .copied()
                    .find(|band| !global.contains_key(band) && !local.contains_key(band))
            };
            if let Some(band) = missing(definition.required_bands) {
                return Err(Error::MissingBand(band));
            }
            if op.rgb_preview.is_some() {
                if let Some(band) = missing(&TRUE_COLOR_BANDS) {
                    return Err(Error::MissingBand(band));
                }
            }
            op.display_range()?;
            op.descriptor(&self.global).validate()?;
            if let Some(palette) = &op.palette {
                if palette.len() < 2 {
                    return Err(Error::InvalidParameter {
                        name: "palette",
                        reason: format!("{}: needs at least two colors", op.index),
                    });
                }
            }
        }
        Ok(())
    }

    /// Band sources an operation reads, global entries overridden by its own.
    pub fn sources_for(&self, op: &Operation) -> Result<Vec<BandSource>> {
        let mut sources = parse_sources(&self.bands)?;
        sources.extend(parse_sources(&op.bands)?);
        Ok(sources.into_values().collect())
    }
}

#[cfg(feature = "gdal")]
pub fn process_batch(config_path: &Path) -> anyhow::Result<()> {
    use std::sync::Arc;

    use anyhow::Context;
    use log::info;

    use crate::export::{ExportQueue, JobStatus};
    use crate::io::writer::{write_composite_rgb, write_rgba};
    use crate::io::{read_composite, GeoTiffWriter};
    use crate::processing::parallel::Evaluator;
    use crate::render::TRUE_COLOR_STRETCH;

    let config = BatchConfig::from_path(config_path)
        .with_context(|| format!("reading batch config {}", config_path.display()))?;
    let registry = Registry::global();
    config.validate(registry)?;

    let evaluator = Evaluator::new();
    let mut queue = ExportQueue::new(Arc::new(GeoTiffWriter), None);

    info!("Starting batch processing with {} operations...", config.operations.len());

    // Operations sharing a band set reuse one composite.
    let mut composites = BTreeMap::new();
    for (i, op) in config.operations.iter().enumerate() {
        info!(
            "[{}/{}] Processing {} -> {}",
            i + 1,
            config.operations.len(),
            op.index,
            op.output
        );

        let sources = config.sources_for(op)?;
        let key = sources.iter().map(ToString::to_string).collect::<Vec<_>>();
        if !composites.contains_key(&key) {
            let composite = read_composite(&sources, config.global.input_scale_factor)
                .with_context(|| format!("reading bands for {}", op.index))?;
            composites.insert(key.clone(), composite);
        }
        let composite = &composites[&key];

        if let Some(rgb_preview) = &op.rgb_preview {
            write_composite_rgb(composite, TRUE_COLOR_STRETCH, Path::new(rgb_preview))
                .with_context(|| format!("writing RGB preview {rgb_preview}"))?;
        }

        let definition = registry.get(&op.index)?;
        let mut result = evaluator.evaluate(definition, composite)?;
        if let Some(range) = op.display_range()? {
            result = result.with_display_range(Some(range));
        }
        if let Some(palette) = &op.palette {
            result = result.with_palette(palette.clone())?;
        }

        if let Some(preview) = &op.preview {
            write_rgba(&result, Path::new(preview))
                .with_context(|| format!("writing preview {preview}"))?;
        }
        queue.submit(&result, op.descriptor(&config.global))?;
    }

    let failed = queue
        .shutdown()
        .into_values()
        .filter(|status| matches!(status, JobStatus::Failed(_)))
        .count();
    if failed > 0 {
        anyhow::bail!("{failed} export(s) failed");
    }

    info!("Batch processing complete!");
    Ok(())
}
