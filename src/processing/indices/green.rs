// src/processing/indices/green.rs
//! Indices substituting (or combining) the green band for red.
use crate::processing::bands::Pixel;

/// Green Atmospherically Resistant Index:
/// (N - (G - 1.7(B - R))) / (N + (G - 1.7(B - R)))
pub fn gari(p: &Pixel) -> f32 {
    let (n, g, r, b) = (p.nir(), p.green(), p.red(), p.blue());
    let corrected = g - 1.7 * (b - r);
    (n - corrected) / (n + corrected)
}

/// Green Chlorophyll Index: N / G - 1
pub fn gci(p: &Pixel) -> f32 {
    p.nir() / p.green() - 1.0
}

/// Green Difference Vegetation Index: N - G
pub fn gdvi(p: &Pixel) -> f32 {
    p.nir() - p.green()
}

/// Green NDVI: (N - G) / (N + G)
pub fn gndvi(p: &Pixel) -> f32 {
    let (n, g) = (p.nir(), p.green());
    (n - g) / (n + g)
}

/// Green Optimized SAVI: (N - G) / (N + G + 0.16)
pub fn gosavi(p: &Pixel) -> f32 {
    let (n, g) = (p.nir(), p.green());
    (n - g) / (n + g + 0.16)
}

/// Green Ratio Vegetation Index: N / G
pub fn grvi(p: &Pixel) -> f32 {
    p.nir() / p.green()
}

/// Green SAVI: 1.5(N - G) / (N + G + 0.5)
pub fn gsavi(p: &Pixel) -> f32 {
    let (n, g) = (p.nir(), p.green());
    1.5 * ((n - g) / (n + g + 0.5))
}
