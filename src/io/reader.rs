// src/io/reader.rs
use std::collections::HashMap;
use std::path::Path;

use gdal::Dataset;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::io::BandSource;
use crate::processing::composite::{Composite, GeoInfo, Raster};

/// Read every source into one composite. All bands must share the first
/// source's size; georeferencing is taken from the first source.
pub fn read_composite(sources: &[BandSource], input_scale_factor: f32) -> Result<Composite> {
    let first = sources.first().ok_or_else(|| Error::InvalidParameter {
        name: "band sources",
        reason: "at least one band is required".to_string(),
    })?;

    // Several bands of one multi-band file share a handle.
    let mut datasets: HashMap<&Path, Dataset> = HashMap::new();
    for source in sources {
        if !datasets.contains_key(source.path.as_path()) {
            datasets.insert(source.path.as_path(), Dataset::open(&source.path)?);
        }
    }

    let (shape, geo_info) = {
        let dataset = &datasets[first.path.as_path()];
        (dataset.raster_size(), geo_info(dataset))
    };

    let mut composite = Composite::new(shape);
    if let Some(geo_info) = geo_info {
        composite = composite.with_geo_info(geo_info);
    }

    for source in sources {
        let dataset = &datasets[source.path.as_path()];
        let band = dataset.rasterband(source.band_index)?;
        let size = band.size();
        if size != shape {
            return Err(Error::ShapeMismatch {
                expected: shape,
                actual: size,
            });
        }

        let buffer = band.read_as::<f32>((0, 0), size, size, None)?;
        let mut data = buffer.data().to_vec();
        // Source nodata becomes NaN so it propagates through every formula.
        if let Some(nodata) = band.no_data_value() {
            let nodata = nodata as f32;
            data.iter_mut()
                .filter(|value| **value == nodata)
                .for_each(|value| *value = f32::NAN);
        }
        debug!("Read {} ({}x{})", source, size.0, size.1);
        composite.insert_band(source.band, Raster::new(size, data)?)?;
    }
    debug!("Opened {} distinct datasets for {} bands", datasets.len(), sources.len());

    composite.rescale(input_scale_factor)?;
    Ok(composite)
}

fn geo_info(dataset: &Dataset) -> Option<GeoInfo> {
    match dataset.geo_transform() {
        Ok(geo_transform) => Some(GeoInfo {
            projection: dataset.projection(),
            geo_transform,
        }),
        Err(e) => {
            warn!("Source has no geotransform, output will not be georeferenced: {}", e);
            None
        }
    }
}
