// src/processing/indices/visible.rs
use crate::processing::bands::Pixel;

/// Green Leaf Index: ((G - R) + (G - B)) / (2G + R + B)
pub fn gli(p: &Pixel) -> f32 {
    let (g, r, b) = (p.green(), p.red(), p.blue());
    ((g - r) + (g - b)) / (2.0 * g + r + b)
}

/// Visible Atmospherically Resistant Index: (G - R) / (G + R - B)
pub fn vari(p: &Pixel) -> f32 {
    let (g, r, b) = (p.green(), p.red(), p.blue());
    (g - r) / (g + r - b)
}
