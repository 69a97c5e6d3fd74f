// src/processing/indices/mod.rs
//! Pixel-wise vegetation index formulas.
//!
//! Every formula is a plain function of a [`Pixel`](crate::processing::bands::Pixel)
//! and follows IEEE semantics: zero denominators give signed infinity or NaN,
//! square roots of negative values give NaN. Nothing is clamped or masked here.
pub mod green;
pub mod nonlinear;
pub mod ratio;
pub mod soil;
pub mod tasseled_cap;
pub mod visible;
