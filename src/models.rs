use image::{GrayImage, Luma, RgbImage};
use std::path::PathBuf;

use crate::spectral::pseudo_rgb;

/// A multi-band image cube with optional band-centre wavelengths
///
/// Samples are stored band-sequential: all pixels of band 0 in row-major
/// order, then band 1, and so on.
#[derive(Debug, Clone)]
pub struct SpectralDataset {
    pub filename: PathBuf,
    pub width: u32,
    pub height: u32,
    pub bands: usize,
    pub data: Vec<f32>,
    /// Band-centre wavelengths in nanometres, empty when unknown
    pub wavelengths: Vec<f32>,
    pub wavelength_units: String,
    /// Source sample type, e.g. "float32"
    pub data_type: String,
    pub interleave: String,
    /// Zero-based bands the file suggests for red, green and blue
    pub default_bands: Option<[usize; 3]>,
    pub pseudo_rgb: RgbImage,
}

impl SpectralDataset {
    /// Build a dataset from band-sequential samples and render its preview
    pub fn from_bands(
        filename: impl Into<PathBuf>,
        width: u32,
        height: u32,
        data: Vec<f32>,
        wavelengths: Vec<f32>,
        default_bands: Option<[usize; 3]>,
    ) -> Self {
        let pixels = width as usize * height as usize;
        let bands = if pixels == 0 { 0 } else { data.len() / pixels };
        let mut dataset = Self {
            filename: filename.into(),
            width,
            height,
            bands,
            data,
            wavelengths,
            wavelength_units: "nm".to_string(),
            data_type: "float32".to_string(),
            interleave: "bsq".to_string(),
            default_bands,
            pseudo_rgb: RgbImage::new(width, height),
        };
        dataset.pseudo_rgb = pseudo_rgb::render(&dataset);
        dataset
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Samples of one band in row-major order
    pub fn band(&self, index: usize) -> &[f32] {
        let n = self.pixel_count();
        &self.data[index * n..(index + 1) * n]
    }

    /// Band whose wavelength is closest to `wavelength`, with that band's wavelength
    pub fn nearest_band(&self, wavelength: f32) -> Option<(usize, f32)> {
        self.wavelengths
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - wavelength).abs().total_cmp(&(*b - wavelength).abs())
            })
            .map(|(i, w)| (i, *w))
    }

    pub fn min_wavelength(&self) -> Option<f32> {
        self.wavelengths.iter().copied().reduce(f32::min)
    }

    pub fn max_wavelength(&self) -> Option<f32> {
        self.wavelengths.iter().copied().reduce(f32::max)
    }

    /// Smallest and largest finite sample
    pub fn value_range(&self) -> Option<(f32, f32)> {
        finite_range(&self.data)
    }
}

/// A single-band floating point image derived from a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct IndexImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl IndexImage {
    pub fn new(name: impl Into<String>, width: u32, height: u32, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            values,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Stretch finite values to 0..=255 for display; non-finite pixels become 0
    pub fn to_gray(&self) -> GrayImage {
        let (lo, hi) = finite_range(&self.values).unwrap_or((0.0, 0.0));
        let span = hi - lo;
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = self.get(x, y);
            if !v.is_finite() || span <= 0.0 {
                return Luma([0]);
            }
            Luma([((v - lo) / span * 255.0).round() as u8])
        })
    }
}

impl From<&GrayImage> for IndexImage {
    fn from(img: &GrayImage) -> Self {
        let values = img.pixels().map(|p| p[0] as f32).collect();
        IndexImage::new("gray", img.width(), img.height(), values)
    }
}

pub(crate) fn finite_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
