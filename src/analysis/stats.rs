use image::GrayImage;
use imageproc::stats::histogram;

use crate::models::{IndexImage, finite_range};
use crate::outputs::{DEFAULT_SAMPLE, Outputs};

/// Bins of the recorded index histogram
pub const HISTOGRAM_BINS: usize = 100;

/// Count non-zero mask pixels
pub fn masked_area(mask: &GrayImage) -> u64 {
    let hist = histogram(mask);
    let total = mask.width() as u64 * mask.height() as u64;
    total - hist.channels[0][0] as u64
}

/// Record area and index statistics for the pixels under `mask`
///
/// Returns the masked pixel count. Statistics are skipped when no finite
/// index value falls inside the mask.
pub fn analyze_index(index: &IndexImage, mask: &GrayImage, outputs: &mut Outputs) -> u64 {
    let area = masked_area(mask);
    outputs.add_observation(
        DEFAULT_SAMPLE,
        "area",
        "area",
        "count of masked pixels",
        "pixels",
        area,
        "pixels",
    );

    let mut values: Vec<f32> = index
        .values
        .iter()
        .zip(mask.pixels())
        .filter(|(v, m)| m[0] != 0 && v.is_finite())
        .map(|(v, _)| *v)
        .collect();

    if values.is_empty() {
        log::warn!("No finite {} values inside the mask", index.name);
        return area;
    }

    values.sort_by(f32::total_cmp);
    let n = values.len();
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (values[n / 2 - 1] as f64 + values[n / 2] as f64) / 2.0
    } else {
        values[n / 2] as f64
    };
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;

    let name = &index.name;
    let scale = "reflectance index";
    outputs.add_observation(
        DEFAULT_SAMPLE,
        &format!("mean_{name}"),
        &format!("Average {name} reflectance"),
        "mean of index values inside the mask",
        scale,
        mean,
        "none",
    );
    outputs.add_observation(
        DEFAULT_SAMPLE,
        &format!("med_{name}"),
        &format!("Median {name} reflectance"),
        "median of index values inside the mask",
        scale,
        median,
        "none",
    );
    outputs.add_observation(
        DEFAULT_SAMPLE,
        &format!("std_{name}"),
        &format!("Standard deviation {name} reflectance"),
        "standard deviation of index values inside the mask",
        scale,
        variance.sqrt(),
        "none",
    );

    let (centres, percent) = frequencies(&values);
    outputs.add_observation(
        DEFAULT_SAMPLE,
        &format!("index_frequencies_{name}"),
        &format!("{name} frequencies"),
        "histogram of index values inside the mask",
        "frequency",
        percent,
        centres,
    );

    area
}

/// Bin centres and percentage of values per bin over the value range
fn frequencies(values: &[f32]) -> (Vec<f64>, Vec<f64>) {
    let (lo, hi) = finite_range(values).unwrap_or((0.0, 0.0));
    let (lo, hi) = (lo as f64, hi as f64);
    let width = (hi - lo) / HISTOGRAM_BINS as f64;

    let mut counts = vec![0u64; HISTOGRAM_BINS];
    for &v in values {
        let bin = if width > 0.0 {
            (((v as f64 - lo) / width) as usize).min(HISTOGRAM_BINS - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }

    let centres = (0..HISTOGRAM_BINS)
        .map(|i| lo + width * (i as f64 + 0.5))
        .collect();
    let percent = counts
        .iter()
        .map(|&c| c as f64 * 100.0 / values.len() as f64)
        .collect();
    (centres, percent)
}
