// src/processing/indices/nonlinear.rs
use crate::processing::bands::Pixel;

/// Non-Linear Index: (N^2 - R) / (N^2 + R)
pub fn nli(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    (n * n - r) / (n * n + r)
}

/// Modified Non-Linear Index with L = 0.5: ((N^2 - R)(1 + L)) / (N^2 + R + L)
pub fn mnli(p: &Pixel) -> f32 {
    let (n, r) = (p.nir(), p.red());
    ((n * n - r) * 1.5) / (n * n + r + 0.5)
}
