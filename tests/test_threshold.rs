//! Fixed-level binarization of index images.

mod common;

use common::*;
use hyperveg::analysis::binary;
use hyperveg::analysis::stats::{analyze_index, masked_area};
use hyperveg::outputs::DEFAULT_SAMPLE;

fn ramp() -> IndexImage {
    // -0.5, -0.25, 0.0, ... 1.25
    let values = (0..8).map(|i| -0.5 + 0.25 * i as f32).collect();
    IndexImage::new("ndvi", 4, 2, values)
}

#[test]
fn test_light_objects() {
    let index = ramp();
    let mask = binary(&index, 0.5, 200, ObjectType::Light);

    for (value, pixel) in index.values.iter().zip(mask.pixels()) {
        let expected = if *value >= 0.5 { 200 } else { 0 };
        assert_eq!(pixel[0], expected, "value {value}");
    }
    // The pixel exactly at the threshold is foreground
    assert_eq!(mask.get_pixel(0, 1)[0], 200);
    assert_eq!(masked_area(&mask), 4);
}

#[test]
fn test_dark_objects() {
    let index = ramp();
    let mask = binary(&index, 0.5, 255, ObjectType::Dark);

    for (value, pixel) in index.values.iter().zip(mask.pixels()) {
        let expected = if *value < 0.5 { 255 } else { 0 };
        assert_eq!(pixel[0], expected, "value {value}");
    }
}

#[test]
fn test_rethresholding_is_idempotent() {
    let index = ramp();
    // Holds for any threshold in (0, max_value]
    for &(t, m) in &[(0.5f32, 255u8), (1.0, 1), (0.25, 7)] {
        let mask = binary(&index, t, m, ObjectType::Light);
        let again = binary(&IndexImage::from(&mask), t, m, ObjectType::Light);
        assert_eq!(mask, again, "t={t} m={m}");
    }
}

#[test]
fn test_non_finite_values_are_background() {
    let index = IndexImage::new("ndvi", 3, 1, vec![f32::NAN, f32::INFINITY, 0.9]);
    let light = binary(&index, 0.5, 255, ObjectType::Light);
    let dark = binary(&index, 0.5, 255, ObjectType::Dark);

    assert_eq!(light.as_raw(), &vec![0u8, 0, 255]);
    assert_eq!(dark.as_raw(), &vec![0u8, 0, 0]);
}

#[test]
fn test_analyze_masked_region() {
    let index = ramp();
    let mask = binary(&index, 0.5, 255, ObjectType::Light);
    let mut outputs = Outputs::new();

    let area = analyze_index(&index, &mask, &mut outputs);

    assert_eq!(area, 4);
    let obs = |name: &str| {
        outputs
            .observation(DEFAULT_SAMPLE, name)
            .unwrap_or_else(|| panic!("missing {name}"))
            .value
            .as_f64()
            .unwrap()
    };
    assert_eq!(obs("area"), 4.0);
    // Masked values are 0.5, 0.75, 1.0 and 1.25
    assert!((obs("mean_ndvi") - 0.875).abs() < 1e-9);
    assert!((obs("med_ndvi") - 0.875).abs() < 1e-9);
    assert!((obs("std_ndvi") - 0.279_508_5).abs() < 1e-6);

    let freq = outputs
        .observation(DEFAULT_SAMPLE, "index_frequencies_ndvi")
        .unwrap();
    assert_eq!(freq.value.as_array().unwrap().len(), 100);
}

#[test]
fn test_analyze_empty_mask() {
    let index = ramp();
    let mask = binary(&index, 10.0, 255, ObjectType::Light);
    let mut outputs = Outputs::new();

    assert_eq!(analyze_index(&index, &mask, &mut outputs), 0);
    assert!(outputs.observation(DEFAULT_SAMPLE, "area").is_some());
    assert!(outputs.observation(DEFAULT_SAMPLE, "mean_ndvi").is_none());
}
