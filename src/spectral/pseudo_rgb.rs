use image::{Rgb, RgbImage};

use crate::models::SpectralDataset;

/// Wavelengths (nm) used for red, green and blue when the file names no default bands
pub const RGB_WAVELENGTHS: [f32; 3] = [640.0, 550.0, 480.0];

const GAMMA: f32 = 1.0 / 2.2;

/// Pick the bands shown as red, green and blue
pub fn select_bands(dataset: &SpectralDataset) -> [usize; 3] {
    if dataset.bands == 0 {
        return [0; 3];
    }
    if let Some(bands) = dataset.default_bands {
        if bands.iter().all(|&b| b < dataset.bands) {
            return bands;
        }
    }
    if dataset.wavelengths.len() == dataset.bands {
        let pick = |w: f32| dataset.nearest_band(w).map(|(i, _)| i).unwrap_or(0);
        return RGB_WAVELENGTHS.map(pick);
    }
    if dataset.bands >= 3 {
        [0, 1, 2]
    } else {
        [0; 3]
    }
}

/// Render a gamma-corrected three-band preview of the cube
pub fn render(dataset: &SpectralDataset) -> RgbImage {
    if dataset.bands == 0 || dataset.pixel_count() == 0 {
        return RgbImage::new(dataset.width, dataset.height);
    }

    let [r, g, b] = select_bands(dataset);
    let channels = [dataset.band(r), dataset.band(g), dataset.band(b)];

    let max = channels
        .iter()
        .flat_map(|c| c.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);

    let scale = |v: f32| -> u8 {
        if !v.is_finite() || v <= 0.0 || max <= 0.0 {
            return 0;
        }
        (255.0 * (v / max).powf(GAMMA)).round().clamp(0.0, 255.0) as u8
    };

    RgbImage::from_fn(dataset.width, dataset.height, |x, y| {
        let i = y as usize * dataset.width as usize + x as usize;
        Rgb([scale(channels[0][i]), scale(channels[1][i]), scale(channels[2][i])])
    })
}
