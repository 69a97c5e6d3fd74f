// src/processing/indices/tasseled_cap.rs
use crate::processing::bands::Pixel;

// Landsat tasseled-cap greenness coefficients, ordered B, G, R, N, S1, S2.
const GREENNESS: [f32; 6] = [-0.2848, -0.2435, -0.5436, 0.7243, 0.0840, -0.1800];

/// Green Vegetation Index (tasseled-cap greenness):
/// -0.2848B - 0.2435G - 0.5436R + 0.7243N + 0.0840S1 - 0.1800S2
pub fn gvi(p: &Pixel) -> f32 {
    let [cb, cg, cr, cn, cs1, cs2] = GREENNESS;
    cb * p.blue() + cg * p.green() + cr * p.red() + cn * p.nir() + cs1 * p.swir1() + cs2 * p.swir2()
}
