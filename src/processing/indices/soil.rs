// src/processing/indices/soil.rs
//! Soil- and atmosphere-adjusted indices built on the red/NIR pair.
use crate::processing::bands::Pixel;

/// Soil Adjusted Vegetation Index with L = 0.5: 1.5(N - R) / (N + R + 0.5)
pub fn savi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    (1.5 * (n - r)) / (n + r + 0.5)
}

/// Optimized SAVI: (N - R) / (N + R + 0.16)
pub fn osavi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    (n - r) / (n + r + 0.16)
}

/// Modified SAVI 2: (2N + 1 - sqrt((2N + 1)^2 - 8(N - R))) / 2
pub fn msavi2(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    let two_nir_plus_one = 2.0 * n + 1.0;
    (two_nir_plus_one - (two_nir_plus_one.powi(2) - 8.0 * (n - r)).sqrt()) / 2.0
}

/// Enhanced Vegetation Index (MODIS coefficients): 2.5(N - R) / (N + 6R - 7.5B + 1)
pub fn evi(p: &Pixel) -> f32 {
    let (n, r, b) = (p.nir(), p.red(), p.blue());
    2.5 * ((n - r) / (n + 6.0 * r - 7.5 * b + 1.0))
}

/// Global Environment Monitoring Index term
/// eta = (2(N^2 - R^2) + 1.5N + 0.5R) / (N + R + 0.5)
pub fn gemi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    (2.0 * (n * n - r * r) + 1.5 * n + 0.5 * r) / (n + r + 0.5)
}

/// Transformed Difference Vegetation Index: 1.5(N - R) / sqrt(N^2 + R + 0.5)
pub fn tdvi(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    1.5 * ((n - r) / (n * n + r + 0.5).sqrt())
}
