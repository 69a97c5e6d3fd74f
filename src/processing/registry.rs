// src/processing/registry.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::processing::bands::{Pixel, SpectralBand};
use crate::processing::indices::{green, nonlinear, ratio, soil, tasseled_cap, visible};

/// Pixel-wise index formula.
pub type Formula = fn(&Pixel) -> f32;

/// RGB color stop of a display palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 128, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const YELLOW: Color = Color::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Accepts `#rrggbb` or one of the named colors.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                    return Ok(Color::new(r, g, b));
                }
            }
            return Err(Error::InvalidColor(s.to_string()));
        }

        match s.to_ascii_lowercase().as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "red" => Ok(Color::RED),
            "green" => Ok(Color::GREEN),
            "blue" => Ok(Color::BLUE),
            "yellow" => Ok(Color::YELLOW),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed display stretch `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: f32,
    pub max: f32,
}

impl DisplayRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Ramp used for every catalog entry.
pub const DEFAULT_PALETTE: &[Color] = &[Color::BLACK, Color::YELLOW, Color::GREEN];

/// Immutable catalog entry describing one vegetation index.
#[derive(Clone, Copy)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub required_bands: &'static [SpectralBand],
    pub formula: Formula,
    /// `None` means auto-range.
    pub display_range: Option<DisplayRange>,
    pub palette: &'static [Color],
}

impl IndexDefinition {
    pub fn apply(&self, pixel: &Pixel) -> f32 {
        (self.formula)(pixel)
    }
}

impl fmt::Debug for IndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexDefinition")
            .field("name", &self.name)
            .field("required_bands", &self.required_bands)
            .field("display_range", &self.display_range)
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}

use SpectralBand::{Blue as B, Green as G, Nir as N, Red as R, Swir1 as S1, Swir2 as S2};

const fn entry(
    name: &'static str,
    description: &'static str,
    required_bands: &'static [SpectralBand],
    formula: Formula,
) -> IndexDefinition {
    IndexDefinition {
        name,
        description,
        required_bands,
        formula,
        display_range: None,
        palette: DEFAULT_PALETTE,
    }
}

const fn ranged(mut definition: IndexDefinition, min: f32, max: f32) -> IndexDefinition {
    definition.display_range = Some(DisplayRange::new(min, max));
    definition
}

static CATALOG: [IndexDefinition; 25] = [
    ranged(
        entry("NDVI", "Normalized Difference Vegetation Index", &[N, R], ratio::ndvi),
        -1.0,
        1.0,
    ),
    ranged(entry("DVI", "Difference Vegetation Index", &[N, R], ratio::dvi), 0.0, 1.0),
    entry("EVI", "Enhanced Vegetation Index", &[N, R, B], soil::evi),
    entry("GEMI", "Global Environment Monitoring Index", &[N, R], soil::gemi),
    entry("GARI", "Green Atmospherically Resistant Index", &[N, G, R, B], green::gari),
    entry("GCI", "Green Chlorophyll Index", &[N, G], green::gci),
    entry("GDVI", "Green Difference Vegetation Index", &[N, G], green::gdvi),
    entry("GLI", "Green Leaf Index", &[G, R, B], visible::gli),
    entry("GNDVI", "Green Normalized Difference Vegetation Index", &[N, G], green::gndvi),
    entry("GOSAVI", "Green Optimized Soil Adjusted Vegetation Index", &[N, G], green::gosavi),
    entry("GRVI", "Green Ratio Vegetation Index", &[N, G], green::grvi),
    entry("GSAVI", "Green Soil Adjusted Vegetation Index", &[N, G], green::gsavi),
    entry(
        "GVI",
        "Green Vegetation Index (tasseled-cap greenness)",
        &[B, G, R, N, S1, S2],
        tasseled_cap::gvi,
    ),
    entry("IPVI", "Infrared Percentage Vegetation Index", &[N, R], ratio::ipvi),
    entry("MNLI", "Modified Non-Linear Index", &[N, R], nonlinear::mnli),
    entry("MSAVI2", "Modified Soil Adjusted Vegetation Index 2", &[N, R], soil::msavi2),
    entry("MSR", "Modified Simple Ratio", &[N, R], ratio::msr),
    entry("NLI", "Non-Linear Index", &[N, R], nonlinear::nli),
    entry("OSAVI", "Optimized Soil Adjusted Vegetation Index", &[N, R], soil::osavi),
    entry("RDVI", "Renormalized Difference Vegetation Index", &[N, R], ratio::rdvi),
    entry("SAVI", "Soil Adjusted Vegetation Index", &[N, R], soil::savi),
    entry("SR", "Simple Ratio", &[N, R], ratio::sr),
    entry("TDVI", "Transformed Difference Vegetation Index", &[N, R], soil::tdvi),
    entry("VARI", "Visible Atmospherically Resistant Index", &[G, R, B], visible::vari),
    entry("WDRVI", "Wide Dynamic Range Vegetation Index", &[N, R], ratio::wdrvi),
];

static REGISTRY: Registry = Registry { entries: &CATALOG };

/// Lookup table of every supported index, immutable for the life of the process.
#[derive(Debug)]
pub struct Registry {
    entries: &'static [IndexDefinition],
}

impl Registry {
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Names in catalog order.
    pub fn list_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|definition| definition.name).collect()
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Result<&'static IndexDefinition> {
        self.entries
            .iter()
            .find(|definition| definition.name == name)
            .ok_or_else(|| Error::UnknownIndex(name.to_string()))
    }

    /// Lookup for an optional selection; no selection is an unknown index.
    pub fn resolve(&self, selection: Option<&str>) -> Result<&'static IndexDefinition> {
        self.get(selection.unwrap_or_default())
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static IndexDefinition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
