// src/io/writer.rs
use std::path::Path;

use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::{Dataset, DriverManager, Metadata};

use crate::error::Result;
use crate::export::{Encoding, ExportDescriptor, ExportFormat, ExportJob, RasterWriter};
use crate::processing::composite::{Composite, GeoInfo};
use crate::processing::parallel::IndexResult;
use crate::processing::registry::DisplayRange;
use crate::render::{colorize, composite_rgba, VisParams};
use crate::utils::fixed_point::{
    to_fixed_point, to_float_output, NODATA_VALUE_FLOAT, NODATA_VALUE_INT,
};

/// Writes export jobs as single-band GeoTIFFs.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoTiffWriter;

fn driver_name(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::GeoTiff => "GTiff",
    }
}

fn creation_options(descriptor: &ExportDescriptor) -> RasterCreationOptions {
    let mut options = Vec::new();
    let compress = descriptor.compress.to_uppercase();

    // Add compression if not NONE
    if compress != "NONE" {
        options.push(format!("COMPRESS={compress}"));

        match compress.as_str() {
            "DEFLATE" => options.push(format!("ZLEVEL={}", descriptor.compress_level.min(9))),
            "ZSTD" => options.push(format!("ZSTD_LEVEL={}", descriptor.compress_level.min(22))),
            _ => {}
        }
    }

    if descriptor.tiled {
        options.push("TILED=YES".to_string());
    }

    options.push("NUM_THREADS=ALL_CPUS".to_string());

    RasterCreationOptions::from_iter(options)
}

fn georeference(dataset: &mut Dataset, geo_info: Option<&GeoInfo>) -> Result<()> {
    if let Some(geo_info) = geo_info {
        dataset.set_projection(&geo_info.projection)?;
        dataset.set_geo_transform(&geo_info.geo_transform)?;
    }
    Ok(())
}

impl RasterWriter for GeoTiffWriter {
    fn write(&self, job: &ExportJob) -> Result<()> {
        let descriptor = &job.descriptor;
        let driver = DriverManager::get_driver_by_name(driver_name(descriptor.format))?;
        let options = creation_options(descriptor);
        let (width, height) = job.raster.shape();

        match descriptor.encoding {
            Encoding::FixedPoint { scale_factor } => {
                let mut output = driver.create_with_band_type_with_options::<i16, _>(
                    &descriptor.destination,
                    width,
                    height,
                    1,
                    &options,
                )?;
                georeference(&mut output, job.geo_info.as_ref())?;
                output.set_metadata_item("DESCRIPTION", &descriptor.description, "")?;
                output.set_metadata_item("SCALE_METRES", &descriptor.scale.to_string(), "")?;

                let mut band = output.rasterband(1)?;
                band.set_no_data_value(Some(NODATA_VALUE_INT as f64))?;
                band.set_metadata_item("SCALE", &format!("{}", 1.0 / scale_factor as f64), "")?;
                band.set_metadata_item("OFFSET", "0", "")?;
                band.set_description(&format!("{} (scaled by {})", job.index, scale_factor))?;

                let data = to_fixed_point(job.raster.data(), scale_factor, NODATA_VALUE_INT);
                let mut buffer = Buffer::new((width, height), data);
                band.write((0, 0), (width, height), &mut buffer)?;
                output.flush_cache()?;
            }
            Encoding::Float32 => {
                let mut output = driver.create_with_band_type_with_options::<f32, _>(
                    &descriptor.destination,
                    width,
                    height,
                    1,
                    &options,
                )?;
                georeference(&mut output, job.geo_info.as_ref())?;
                output.set_metadata_item("DESCRIPTION", &descriptor.description, "")?;
                output.set_metadata_item("SCALE_METRES", &descriptor.scale.to_string(), "")?;

                let mut band = output.rasterband(1)?;
                band.set_no_data_value(Some(NODATA_VALUE_FLOAT as f64))?;
                band.set_description(&job.index)?;

                let mut buffer = Buffer::new((width, height), to_float_output(job.raster.data()));
                band.write((0, 0), (width, height), &mut buffer)?;
                output.flush_cache()?;
            }
        }

        Ok(())
    }
}

fn write_rgba_bands(
    rgba: &[u8],
    (width, height): (usize, usize),
    geo_info: Option<&GeoInfo>,
    output_path: &Path,
) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let options =
        RasterCreationOptions::from_iter(["COMPRESS=DEFLATE", "PHOTOMETRIC=RGB", "ALPHA=YES"]);
    let mut output = driver.create_with_band_type_with_options::<u8, _>(
        output_path,
        width,
        height,
        4,
        &options,
    )?;
    georeference(&mut output, geo_info)?;

    for channel in 0..4 {
        let data: Vec<u8> = rgba.iter().skip(channel).step_by(4).copied().collect();
        let mut band = output.rasterband(channel + 1)?;
        let mut buffer = Buffer::new((width, height), data);
        band.write((0, 0), (width, height), &mut buffer)?;
    }
    output.flush_cache()?;
    Ok(())
}

/// Write the colorized result as a 4-band (RGBA) byte GeoTIFF.
pub fn write_rgba(result: &IndexResult, output_path: &Path) -> Result<VisParams> {
    let vis = VisParams::from_result(result);
    let rgba = colorize(result, &vis);
    write_rgba_bands(&rgba, result.raster.shape(), result.geo_info.as_ref(), output_path)?;
    Ok(vis)
}

/// Write the composite's true-color view as a 4-band (RGBA) byte GeoTIFF.
pub fn write_composite_rgb(
    composite: &Composite,
    stretch: DisplayRange,
    output_path: &Path,
) -> Result<()> {
    let rgba = composite_rgba(composite, stretch)?;
    write_rgba_bands(&rgba, composite.shape(), composite.geo_info(), output_path)
}
