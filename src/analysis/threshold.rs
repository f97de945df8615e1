use clap::ValueEnum;
use image::{GrayImage, Luma};

use crate::models::IndexImage;

/// Which side of the threshold counts as foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ObjectType {
    /// Values at or above the threshold
    #[default]
    Light,
    /// Values below the threshold
    Dark,
}

/// Fixed-level binarization
///
/// Foreground pixels get `max_value`, everything else 0. Non-finite index
/// values are always background.
pub fn binary(index: &IndexImage, threshold: f32, max_value: u8, object_type: ObjectType) -> GrayImage {
    GrayImage::from_fn(index.width, index.height, |x, y| {
        let v = index.get(x, y);
        let selected = match object_type {
            ObjectType::Light => v >= threshold,
            ObjectType::Dark => v < threshold,
        };
        if v.is_finite() && selected {
            Luma([max_value])
        } else {
            Luma([0])
        }
    })
}
