// src/processing/indices/ratio.rs
use crate::processing::bands::Pixel;

/// Normalized Difference Vegetation Index: (N - R) / (N + R)
pub fn ndvi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    (n - r) / (n + r)
}

/// Difference Vegetation Index: N - R
pub fn dvi(p: &Pixel) -> f32 {
    p.nir() - p.red()
}

/// Simple Ratio: N / R
pub fn sr(p: &Pixel) -> f32 {
    p.nir() / p.red()
}

/// Infrared Percentage Vegetation Index: N / (N - R)
pub fn ipvi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    n / (n - r)
}

/// Wide Dynamic Range Vegetation Index: 0.2(N - R) / (0.2(N + R))
pub fn wdrvi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    (0.2 * (n - r)) / (0.2 * (n + r))
}

/// Modified Simple Ratio: ((N / R) - 1) / (sqrt(N / R) + 1)
pub fn msr(p: &Pixel) -> f32 {
    let ratio = p.nir() / p.red();
    (ratio - 1.0) / (ratio.sqrt() + 1.0)
}

/// Renormalized Difference Vegetation Index: (N - R) / sqrt(N + R)
pub fn rdvi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    (n - r) / (n + r).sqrt()
}
