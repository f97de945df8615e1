//! Spectral image loading.
//!
//! ```text
//!  .hdr + data file        .png / .jpg / .tif ...
//!        │                        │
//!        ▼                        ▼
//!   ┌──────────┐            ┌──────────┐
//!   │   envi   │            │  native  │
//!   └──────────┘            └──────────┘
//!        │                        │
//!        └──────────┬─────────────┘
//!                   ▼
//!          SpectralDataset + pseudo_rgb
//! ```
pub mod envi;
pub mod pseudo_rgb;

use image::ImageFormat;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::SpectralDataset;

/// Load a dataset, choosing the reader from the file type
pub fn read_image(path: &Path) -> Result<SpectralDataset> {
    if !path.is_file() {
        return Err(Error::unreadable(path, "file not found"));
    }

    if let Some((header, data)) = envi::locate(path)? {
        log::debug!("Reading ENVI cube {} ({})", data.display(), header.display());
        return envi::read(&header, &data, path);
    }

    if ImageFormat::from_path(path).is_ok() {
        log::debug!("Reading raster image {}", path.display());
        return read_native(path);
    }

    Err(Error::unreadable(path, "unrecognized image format"))
}

/// Read an ordinary raster as a three-band dataset without wavelengths
fn read_native(path: &Path) -> Result<SpectralDataset> {
    let img = image::open(path)
        .map_err(|e| Error::unreadable(path, format!("failed to decode image: {e}")))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    let pixels = width as usize * height as usize;

    let mut data = vec![0.0f32; pixels * 3];
    for (i, pixel) in img.pixels().enumerate() {
        for c in 0..3 {
            data[c * pixels + i] = pixel[c] as f32;
        }
    }

    let mut dataset = SpectralDataset::from_bands(path, width, height, data, Vec::new(), None);
    dataset.data_type = "uint8".to_string();
    dataset.interleave = "bip".to_string();
    dataset.pseudo_rgb = img;
    Ok(dataset)
}
