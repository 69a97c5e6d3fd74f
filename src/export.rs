// src/export.rs
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use flume::Sender;
use log::{error, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::processing::composite::{GeoInfo, Raster, Window};
use crate::processing::parallel::IndexResult;
use crate::utils::fixed_point::{count_saturated, NODATA_VALUE_INT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "GeoTIFF", alias = "GTiff", alias = "geotiff")]
    GeoTiff,
}

/// Sample encoding of the exported band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Float32,
    /// int16 holding `round(value * scale_factor)`; values outside the int16
    /// range are clamped.
    FixedPoint { scale_factor: i32 },
}

/// Where and how a result is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDescriptor {
    pub description: String,
    pub destination: PathBuf,
    #[serde(default)]
    pub format: ExportFormat,
    /// Nominal ground resolution in metres.
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub region: Option<Window>,
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
}

fn default_scale() -> f64 {
    30.0
}

fn default_max_pixels() -> u64 {
    1_000_000_000
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

impl ExportDescriptor {
    pub fn new(index: &str, destination: impl Into<PathBuf>) -> Self {
        Self {
            description: format!("Exported_{index}"),
            destination: destination.into(),
            format: ExportFormat::default(),
            scale: default_scale(),
            region: None,
            max_pixels: default_max_pixels(),
            encoding: Encoding::default(),
            compress: default_compress(),
            compress_level: default_compress_level(),
            tiled: true,
        }
    }

    /// Reject settings no writer can honour.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::InvalidExport(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if let Encoding::FixedPoint { scale_factor } = self.encoding {
            if scale_factor <= 0 {
                return Err(Error::InvalidExport(format!(
                    "scale_factor must be positive, got {scale_factor}"
                )));
            }
        }
        Ok(())
    }
}

/// A validated, self-contained export request.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub id: u64,
    pub index: String,
    pub raster: Raster,
    pub geo_info: Option<GeoInfo>,
    pub descriptor: ExportDescriptor,
}

/// Backend that persists one job.
pub trait RasterWriter: Send + Sync {
    fn write(&self, job: &ExportJob) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Done,
    Failed(String),
}

/// Shift the geotransform origin to the top-left corner of a crop window.
fn crop_geo_info(geo_info: &GeoInfo, window: Window) -> GeoInfo {
    let mut gt = geo_info.geo_transform;
    gt[0] += window.x as f64 * gt[1] + window.y as f64 * gt[2];
    gt[3] += window.x as f64 * gt[4] + window.y as f64 * gt[5];
    GeoInfo {
        projection: geo_info.projection.clone(),
        geo_transform: gt,
    }
}

/// Fire-and-forget export submission backed by a pool of writer threads.
pub struct ExportQueue {
    tx: Option<Sender<ExportJob>>,
    workers: Vec<JoinHandle<()>>,
    status: Arc<Mutex<HashMap<u64, JobStatus>>>,
    next_id: AtomicU64,
}

impl ExportQueue {
    pub fn new(writer: Arc<dyn RasterWriter>, threads: Option<usize>) -> Self {
        let threads = threads.unwrap_or_else(num_cpus::get).max(1);
        let (tx, rx) = flume::unbounded::<ExportJob>();
        let status = Arc::new(Mutex::new(HashMap::new()));

        let workers = (0..threads)
            .map(|_| {
                let rx = rx.clone();
                let writer = Arc::clone(&writer);
                let status = Arc::clone(&status);
                thread::spawn(move || {
                    for job in rx {
                        let outcome = match writer.write(&job) {
                            Ok(()) => {
                                info!(
                                    "Export {} complete: {}",
                                    job.descriptor.description,
                                    job.descriptor.destination.display()
                                );
                                JobStatus::Done
                            }
                            Err(e) => {
                                error!("Export {} failed: {}", job.descriptor.description, e);
                                JobStatus::Failed(e.to_string())
                            }
                        };
                        status.lock().insert(job.id, outcome);
                    }
                })
            })
            .collect();

        Self {
            tx: Some(tx),
            workers,
            status,
            next_id: AtomicU64::new(1),
        }
    }

    /// Validate and enqueue; returns the job id without waiting for the write.
    pub fn submit(&self, result: &IndexResult, descriptor: ExportDescriptor) -> Result<u64> {
        let tx = self.tx.as_ref().ok_or(Error::ExportClosed)?;
        descriptor.validate()?;

        let (raster, geo_info) = match descriptor.region {
            Some(window) => (
                result
                    .raster
                    .crop(window)
                    .map_err(|e| Error::InvalidExport(e.to_string()))?,
                result.geo_info.as_ref().map(|geo| crop_geo_info(geo, window)),
            ),
            None => (result.raster.clone(), result.geo_info.clone()),
        };

        let pixels = raster.len() as u64;
        if pixels > descriptor.max_pixels {
            return Err(Error::InvalidExport(format!(
                "{} pixels exceeds max_pixels {}",
                pixels, descriptor.max_pixels
            )));
        }

        if let Encoding::FixedPoint { scale_factor } = descriptor.encoding {
            let saturated = count_saturated(raster.data(), scale_factor, NODATA_VALUE_INT);
            if saturated > 0 {
                warn!(
                    "{}: {} pixels fall outside int16 at scale factor {} and will be clamped",
                    descriptor.description, saturated, scale_factor
                );
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.status.lock().insert(id, JobStatus::Pending);
        let job = ExportJob {
            id,
            index: result.index.clone(),
            raster,
            geo_info,
            descriptor,
        };
        if tx.send(job).is_err() {
            self.status.lock().remove(&id);
            return Err(Error::ExportClosed);
        }
        Ok(id)
    }

    pub fn status(&self, id: u64) -> Option<JobStatus> {
        self.status.lock().get(&id).cloned()
    }

    /// Remove and return every job that has finished, leaving pending ones.
    pub fn take_finished(&self) -> HashMap<u64, JobStatus> {
        let mut status = self.status.lock();
        let finished = status
            .iter()
            .filter(|(_, s)| **s != JobStatus::Pending)
            .map(|(&id, _)| id)
            .collect::<Vec<_>>();
        finished
            .into_iter()
            .filter_map(|id| status.remove_entry(&id))
            .collect()
    }

    pub fn is_open(&self) -> bool {
        self.tx.is_some()
    }

    /// Stop accepting jobs, let the workers drain the queue and join them.
    /// Returns the final status of every job not already taken.
    pub fn shutdown(&mut self) -> HashMap<u64, JobStatus> {
        drop(self.tx.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("Export worker panicked");
            }
        }
        std::mem::take(&mut *self.status.lock())
    }
}

impl Drop for ExportQueue {
    fn drop(&mut self) {
        if self.is_open() {
            self.shutdown();
        }
    }
}
