// src/main.rs
use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use log::LevelFilter;

mod cli;

use crate::cli::{Cli, Commands};
use vegindx::processing::Registry;
use vegindx::render::Legend;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let registry = Registry::global();

    match cli.command {
        Commands::List { json } => {
            if json {
                let entries = registry
                    .iter()
                    .map(|d| {
                        serde_json::json!({
                            "name": d.name,
                            "description": d.description,
                            "bands": d.required_bands,
                        })
                    })
                    .collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for d in registry.iter() {
                    let bands = d.required_bands.iter().join(",");
                    println!("{:<8} {:<24} {}", d.name, bands, d.description);
                }
            }
        }
        Commands::Legend { index } => {
            let definition = registry.get(&index)?;
            println!("{}", serde_json::to_string_pretty(&Legend::for_definition(definition))?);
        }
        #[cfg(feature = "gdal")]
        Commands::Compute {
            index,
            bands,
            output,
            fixed_point,
            scale_factor,
            input_scale,
            compress,
            compress_level,
            no_tiled,
            preview,
            rgb_preview,
        } => {
            use std::sync::Arc;

            use anyhow::Context;
            use log::info;
            use vegindx::export::{Encoding, ExportDescriptor, ExportQueue, JobStatus};
            use vegindx::io::writer::{write_composite_rgb, write_rgba};
            use vegindx::io::{read_composite, GeoTiffWriter};
            use vegindx::processing::Evaluator;
            use vegindx::render::TRUE_COLOR_STRETCH;

            // Unknown names fail before any raster is opened.
            let definition = registry.get(&index)?;
            let composite = read_composite(&bands, input_scale).context("reading input bands")?;
            if let Some(rgb_preview) = rgb_preview {
                write_composite_rgb(&composite, TRUE_COLOR_STRETCH, &rgb_preview)
                    .context("writing RGB preview")?;
                info!("RGB preview {}", rgb_preview.display());
            }
            let result = Evaluator::new().evaluate(definition, &composite)?;

            let stats = result.stats();
            info!(
                "{}: {} pixels, {} finite, min {:?}, max {:?}, mean {:?}",
                result.index, stats.count, stats.finite, stats.min, stats.max, stats.mean
            );

            if let Some(preview) = preview {
                let vis = write_rgba(&result, &preview).context("writing preview")?;
                info!(
                    "Preview {} stretched over [{}, {}]",
                    preview.display(),
                    vis.range.min,
                    vis.range.max
                );
            }

            let mut descriptor = ExportDescriptor::new(&result.index, &output);
            descriptor.encoding = if fixed_point {
                Encoding::FixedPoint { scale_factor }
            } else {
                Encoding::Float32
            };
            descriptor.compress = compress;
            descriptor.compress_level = compress_level;
            descriptor.tiled = !no_tiled;

            let mut queue = ExportQueue::new(Arc::new(GeoTiffWriter), Some(1));
            let id = queue.submit(&result, descriptor)?;
            if let Some(JobStatus::Failed(reason)) = queue.shutdown().remove(&id) {
                anyhow::bail!("export to {} failed: {}", output.display(), reason);
            }
            info!("Processing complete: {}", output.display());
        }
        #[cfg(feature = "gdal")]
        Commands::Batch { config } => {
            vegindx::batch::process_batch(&config)?;
        }
        #[cfg(not(feature = "gdal"))]
        Commands::Compute { .. } | Commands::Batch { .. } => {
            anyhow::bail!("raster I/O requires GDAL; rebuild with `--features gdal`");
        }
    }

    Ok(())
}
