// src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vegindx::io::BandSource;

#[derive(Parser)]
#[command(name = "vegindx", version)]
#[command(about = "Vegetation index calculator for multispectral composites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the registered vegetation indices
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the legend (range and palette) of an index as JSON
    Legend {
        /// Index name, e.g. NDVI
        index: String,
    },

    /// Compute an index from band rasters and export it as GeoTIFF
    Compute {
        /// Index name, e.g. NDVI
        index: String,

        /// Band source BAND=path[:band_no], e.g. NIR=composite.tif:5 (repeatable)
        #[arg(short, long = "band", required = true)]
        bands: Vec<BandSource>,

        /// Output file path
        #[arg(short, long, default_value = "output.tif")]
        output: PathBuf,

        /// Write scaled int16 instead of float32
        #[arg(long)]
        fixed_point: bool,

        /// Scaling factor for fixed-point
        #[arg(long, default_value = "10000")]
        scale_factor: i32,

        /// Divide input values by this factor before evaluation (e.g. 10000 for scaled reflectance)
        #[arg(long, default_value = "1.0")]
        input_scale: f32,

        /// Compression: DEFLATE, LZW, ZSTD or NONE
        #[arg(long, default_value = "DEFLATE")]
        compress: String,

        /// Compression level
        #[arg(long, default_value = "6")]
        compress_level: u8,

        /// Write strips instead of tiles
        #[arg(long)]
        no_tiled: bool,

        /// Also write a colorized RGBA GeoTIFF
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Also write a true-color RGB rendering of the input bands
        #[arg(long)]
        rgb_preview: Option<PathBuf>,
    },

    /// Run the operations of a JSON batch file
    Batch {
        /// Batch configuration file
        config: PathBuf,
    },
}
