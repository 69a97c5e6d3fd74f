// tests/unit_tests.rs
use std::sync::atomic::{AtomicUsize, Ordering};

use vegindx::processing::{
    Color, Composite, DisplayRange, Evaluator, IndexCalculator, Pixel, Raster, Registry,
    SpectralBand,
};
use vegindx::Error;

use SpectralBand::{Blue, Green, Nir, Red, Swir1, Swir2};

/// Helper function to build a composite from per-band pixel values
fn create_composite(width: usize, height: usize, bands: &[(SpectralBand, &[f32])]) -> Composite {
    let mut composite = Composite::new((width, height));
    for (band, values) in bands {
        // Fill with test data (repeating pattern if needed)
        let data = (0..width * height).map(|i| values[i % values.len()]).collect();
        composite
            .insert_band(*band, Raster::new((width, height), data).unwrap())
            .unwrap();
    }
    composite
}

/// Single-pixel composite holding every canonical band
fn full_pixel(b: f32, g: f32, r: f32, n: f32, s1: f32, s2: f32) -> Composite {
    create_composite(
        1,
        1,
        &[(Blue, &[b]), (Green, &[g]), (Red, &[r]), (Nir, &[n]), (Swir1, &[s1]), (Swir2, &[s2])],
    )
}

fn evaluate_one(name: &str, composite: &Composite) -> f32 {
    let definition = Registry::global().get(name).unwrap();
    let result = Evaluator::new().evaluate(definition, composite).unwrap();
    result.raster.data()[0]
}

fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() < tolerance,
        "Expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_catalog_names_in_order() {
    let names = Registry::global().list_names();
    assert_eq!(
        names,
        [
            "NDVI", "DVI", "EVI", "GEMI", "GARI", "GCI", "GDVI", "GLI", "GNDVI", "GOSAVI", "GRVI",
            "GSAVI", "GVI", "IPVI", "MNLI", "MSAVI2", "MSR", "NLI", "OSAVI", "RDVI", "SAVI", "SR",
            "TDVI", "VARI", "WDRVI",
        ]
    );
    // Stable across calls
    assert_eq!(names, Registry::global().list_names());
}

#[test]
fn test_required_bands_are_nonempty_canonical_sets() {
    for definition in Registry::global().iter() {
        assert!(!definition.required_bands.is_empty(), "{} has no bands", definition.name);
        for band in definition.required_bands {
            assert!(SpectralBand::ALL.contains(band));
        }
        let mut unique = definition.required_bands.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(
            unique.len(),
            definition.required_bands.len(),
            "{} repeats a band",
            definition.name
        );
        assert!(definition.palette.len() >= 2);
    }
}

#[test]
fn test_required_bands_per_index() {
    let registry = Registry::global();
    assert_eq!(registry.get("GEMI").unwrap().required_bands, &[Nir, Red]);
    assert_eq!(registry.get("EVI").unwrap().required_bands, &[Nir, Red, Blue]);
    assert_eq!(registry.get("GARI").unwrap().required_bands, &[Nir, Green, Red, Blue]);
    assert_eq!(registry.get("GLI").unwrap().required_bands, &[Green, Red, Blue]);
    assert_eq!(registry.get("VARI").unwrap().required_bands, &[Green, Red, Blue]);
    assert_eq!(registry.get("GCI").unwrap().required_bands, &[Nir, Green]);
    assert_eq!(
        registry.get("GVI").unwrap().required_bands,
        &[Blue, Green, Red, Nir, Swir1, Swir2]
    );
}

/// Formulas only read their declared bands: with every other band left as NaN
/// the results stay finite for ordinary reflectance.
#[test]
fn test_formulas_only_read_declared_bands() {
    let values = [
        (Blue, 0.05),
        (Green, 0.08),
        (Red, 0.10),
        (Nir, 0.40),
        (Swir1, 0.20),
        (Swir2, 0.15),
    ];
    for definition in Registry::global().iter() {
        let mut pixel = Pixel::new();
        for (band, value) in values {
            if definition.required_bands.contains(&band) {
                pixel.set(band, value);
            }
        }
        let value = definition.calculate(&pixel);
        assert!(value.is_finite(), "{} read an undeclared band: {}", definition.name, value);
    }
}

#[test]
fn test_display_defaults() {
    let registry = Registry::global();
    let ndvi = registry.get("NDVI").unwrap();
    assert_eq!(ndvi.display_range, Some(DisplayRange::new(-1.0, 1.0)));
    assert_eq!(ndvi.palette, &[Color::BLACK, Color::YELLOW, Color::GREEN]);
    assert_eq!(registry.get("DVI").unwrap().display_range, Some(DisplayRange::new(0.0, 1.0)));
    assert_eq!(registry.get("SAVI").unwrap().display_range, None);
}

#[test]
fn test_unknown_index_names() {
    let registry = Registry::global();
    let mut names: Vec<String> = registry.list_names().iter().map(|n| n.to_lowercase()).collect();
    names.push(String::new());
    names.push("FOO".to_string());
    names.push(" NDVI".to_string());

    for name in &names {
        match registry.get(name) {
            Err(Error::UnknownIndex(n)) => assert_eq!(&n, name),
            other => panic!("Expected UnknownIndex for {:?}, got {:?}", name, other),
        }
    }
    assert!(matches!(registry.resolve(None), Err(Error::UnknownIndex(_))));
    assert_eq!(registry.resolve(Some("SR")).unwrap().name, "SR");
}

#[test]
fn test_ndvi_fixture() {
    let composite = create_composite(1, 1, &[(Red, &[0.10]), (Nir, &[0.40])]);
    assert_close(evaluate_one("NDVI", &composite), 0.6, 1e-6);
}

#[test]
fn test_sr_divide_by_zero_is_infinite() {
    let composite = create_composite(1, 1, &[(Red, &[0.0]), (Nir, &[0.5])]);
    let value = evaluate_one("SR", &composite);
    assert!(value.is_infinite() && value.is_sign_positive());
}

#[test]
fn test_savi_fixture() {
    let composite = create_composite(1, 1, &[(Red, &[0.2]), (Nir, &[0.5])]);
    assert_close(evaluate_one("SAVI", &composite), 0.375, 1e-6);
}

#[test]
fn test_msavi2_fixture() {
    let composite = create_composite(1, 1, &[(Red, &[0.1]), (Nir, &[0.5])]);
    assert_close(evaluate_one("MSAVI2", &composite), 0.552786, 1e-5);
}

#[test]
fn test_gvi_fixture() {
    let composite = full_pixel(0.05, 0.08, 0.10, 0.40, 0.20, 0.15);
    // -0.01424 - 0.01948 - 0.05436 + 0.28972 + 0.01680 - 0.02700
    assert_close(evaluate_one("GVI", &composite), 0.19144, 1e-5);
}

#[test]
fn test_every_formula_against_reference_values() {
    let (b, g, r, n): (f64, f64, f64, f64) = (0.05, 0.08, 0.10, 0.40);
    let composite = full_pixel(b as f32, g as f32, r as f32, n as f32, 0.20, 0.15);
    let gari_term = g - 1.7 * (b - r);
    let expected: [(&str, f64); 24] = [
        ("NDVI", (n - r) / (n + r)),
        ("DVI", n - r),
        ("EVI", 2.5 * (n - r) / (n + 6.0 * r - 7.5 * b + 1.0)),
        ("GEMI", (2.0 * (n * n - r * r) + 1.5 * n + 0.5 * r) / (n + r + 0.5)),
        ("GARI", (n - gari_term) / (n + gari_term)),
        ("GCI", n / g - 1.0),
        ("GDVI", n - g),
        ("GLI", ((g - r) + (g - b)) / (2.0 * g + r + b)),
        ("GNDVI", (n - g) / (n + g)),
        ("GOSAVI", (n - g) / (n + g + 0.16)),
        ("GRVI", n / g),
        ("GSAVI", 1.5 * (n - g) / (n + g + 0.5)),
        ("IPVI", n / (n - r)),
        ("MNLI", ((n * n - r) * 1.5) / (n * n + r + 0.5)),
        ("MSAVI2", (2.0 * n + 1.0 - ((2.0 * n + 1.0).powi(2) - 8.0 * (n - r)).sqrt()) / 2.0),
        ("MSR", ((n / r) - 1.0) / ((n / r).sqrt() + 1.0)),
        ("NLI", (n * n - r) / (n * n + r)),
        ("OSAVI", (n - r) / (n + r + 0.16)),
        ("RDVI", (n - r) / (n + r).sqrt()),
        ("SAVI", 1.5 * (n - r) / (n + r + 0.5)),
        ("SR", n / r),
        ("TDVI", 1.5 * (n - r) / (n * n + r + 0.5).sqrt()),
        ("VARI", (g - r) / (g + r - b)),
        ("WDRVI", 0.2 * (n - r) / (0.2 * (n + r))),
    ];

    for (name, value) in expected {
        let actual = evaluate_one(name, &composite) as f64;
        let tolerance = 1e-5 * value.abs().max(1.0);
        assert!(
            (actual - value).abs() < tolerance,
            "{}: expected {}, got {}",
            name,
            value,
            actual
        );
    }
}

#[test]
fn test_ieee_degenerate_values_propagate() {
    // MSR with R = 0 and N = 0 gives NaN, NDVI with N = R = 0 gives NaN
    let zeros = create_composite(1, 1, &[(Red, &[0.0]), (Nir, &[0.0])]);
    assert!(evaluate_one("MSR", &zeros).is_nan());
    assert!(evaluate_one("NDVI", &zeros).is_nan());

    // IPVI with N = R divides a positive number by zero
    let equal = create_composite(1, 1, &[(Red, &[0.3]), (Nir, &[0.3])]);
    assert_eq!(evaluate_one("IPVI", &equal), f32::INFINITY);

    // RDVI with negative N + R takes the square root of a negative number
    let negative = create_composite(1, 1, &[(Red, &[-0.3]), (Nir, &[0.1])]);
    assert!(evaluate_one("RDVI", &negative).is_nan());
}

#[test]
fn test_missing_band_is_reported() {
    let composite = create_composite(
        1,
        1,
        &[(Blue, &[0.05]), (Green, &[0.08]), (Red, &[0.10]), (Nir, &[0.40]), (Swir1, &[0.20])],
    );
    let gvi = Registry::global().get("GVI").unwrap();
    match Evaluator::new().evaluate(gvi, &composite) {
        Err(Error::MissingBand(band)) => assert_eq!(band, Swir2),
        other => panic!("Expected MissingBand, got {:?}", other),
    }
}

#[test]
fn test_missing_band_names_first_missing() {
    let composite = create_composite(1, 1, &[(Nir, &[0.4])]);
    let gari = Registry::global().get("GARI").unwrap();
    assert!(matches!(
        Evaluator::new().evaluate(gari, &composite),
        Err(Error::MissingBand(Green))
    ));
}

struct CountingCalculator {
    bands: Vec<SpectralBand>,
    calls: AtomicUsize,
}

impl IndexCalculator for CountingCalculator {
    fn calculate(&self, pixel: &Pixel) -> f32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pixel.nir()
    }

    fn required_bands(&self) -> &[SpectralBand] {
        &self.bands
    }

    fn name(&self) -> &str {
        "COUNT"
    }
}

#[test]
fn test_missing_band_fails_before_any_pixel() {
    let composite = create_composite(4, 4, &[(Nir, &[0.4])]);
    let calculator = CountingCalculator {
        bands: vec![Nir, Red],
        calls: AtomicUsize::new(0),
    };
    let result = Evaluator::new().calculate(&calculator, &composite);
    assert!(matches!(result, Err(Error::MissingBand(Red))));
    assert_eq!(calculator.calls.load(Ordering::SeqCst), 0);

    let calculator = CountingCalculator {
        bands: vec![Nir],
        calls: AtomicUsize::new(0),
    };
    Evaluator::new().calculate(&calculator, &composite).unwrap();
    assert_eq!(calculator.calls.load(Ordering::SeqCst), 16);
}

#[test]
fn test_evaluate_is_idempotent() {
    let nir: Vec<f32> = (0..97).map(|i| i as f32 / 97.0).collect();
    let red: Vec<f32> = (0..97).map(|i| (97 - i) as f32 / 200.0).collect();
    let composite = create_composite(10, 10, &[(Nir, &nir), (Red, &red)]);
    let msr = Registry::global().get("MSR").unwrap();

    let evaluator = Evaluator::new();
    let first = evaluator.evaluate(msr, &composite).unwrap();
    let second = evaluator.evaluate(msr, &composite).unwrap();
    let first_bits: Vec<u32> = first.raster.data().iter().map(|v| v.to_bits()).collect();
    let second_bits: Vec<u32> = second.raster.data().iter().map(|v| v.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
}

#[test]
fn test_block_size_does_not_change_results() {
    let nir: Vec<f32> = (0..13).map(|i| 0.2 + i as f32 / 50.0).collect();
    let red: Vec<f32> = (0..7).map(|i| 0.05 + i as f32 / 40.0).collect();
    let blue: Vec<f32> = (0..5).map(|i| 0.01 + i as f32 / 100.0).collect();
    let composite = create_composite(37, 23, &[(Nir, &nir), (Red, &red), (Blue, &blue)]);
    let evi = Registry::global().get("EVI").unwrap();

    let reference = Evaluator::with_block_rows(1).evaluate(evi, &composite).unwrap();
    for rows in [2, 5, 23, 1000] {
        let result = Evaluator::with_block_rows(rows).evaluate(evi, &composite).unwrap();
        assert_eq!(result.raster, reference.raster, "block rows {}", rows);
    }

    // Pixel-wise: every output matches a direct formula call
    for (i, value) in reference.raster.data().iter().enumerate() {
        let pixel = Pixel::new()
            .with(Nir, nir[i % nir.len()])
            .with(Red, red[i % red.len()])
            .with(Blue, blue[i % blue.len()]);
        assert_eq!(value.to_bits(), evi.apply(&pixel).to_bits());
    }
}

#[test]
fn test_result_copies_display_and_shape() {
    let composite = create_composite(3, 2, &[(Red, &[0.1, 0.2]), (Nir, &[0.5])]);
    let ndvi = Registry::global().get("NDVI").unwrap();
    let result = Evaluator::new().evaluate(ndvi, &composite).unwrap();

    assert_eq!(result.index, "NDVI");
    assert_eq!(result.raster.shape(), (3, 2));
    assert_eq!(result.display_range, ndvi.display_range);
    assert_eq!(result.palette, ndvi.palette);
    // Source composite untouched
    assert_eq!(composite.band(Nir).unwrap().data(), &[0.5; 6]);
}

#[test]
fn test_composite_rejects_mismatched_band() {
    let mut composite = Composite::new((2, 2));
    let err = composite
        .insert_band(Red, Raster::filled((3, 2), 0.1))
        .unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { expected: (2, 2), actual: (3, 2) }));
    assert!(matches!(
        Raster::new((2, 2), vec![0.0; 3]),
        Err(Error::BufferLength { len: 3, .. })
    ));
}

#[test]
fn test_input_rescaling() {
    let mut composite = create_composite(1, 1, &[(Red, &[1000.0]), (Nir, &[4000.0])]);
    composite.rescale(10000.0).unwrap();
    assert_close(composite.band(Red).unwrap().data()[0], 0.1, 1e-6);
    assert_close(evaluate_one("SAVI", &composite), 1.5 * 0.3 / 1.0, 1e-6);
    assert!(composite.rescale(0.0).is_err());
}

#[test]
fn test_band_parsing() {
    assert_eq!("nir".parse::<SpectralBand>().unwrap(), Nir);
    assert_eq!("S1".parse::<SpectralBand>().unwrap(), Swir1);
    assert_eq!("B7".parse::<SpectralBand>().unwrap(), Swir2);
    assert_eq!("b2".parse::<SpectralBand>().unwrap(), Blue);
    assert_eq!(Red.landsat8_code(), "B4");
    assert!(matches!("B9".parse::<SpectralBand>(), Err(Error::UnknownBand(_))));
}
