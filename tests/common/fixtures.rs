use hyperveg::WorkflowConfig;
use hyperveg::spectral::envi;
use image::{ImageBuffer, Rgb};
use std::path::{Path, PathBuf};

/// Band centres of the leaf cube, covering the NDVI pair exactly
pub const LEAF_WAVELENGTHS: [f32; 5] = [480.0, 550.0, 640.0, 680.0, 800.0];

/// Band centres near, but not at, 680 and 800 nm
pub const GAPPED_WAVELENGTHS: [f32; 4] = [470.0, 560.0, 690.0, 790.0];

pub const CUBE_SIZE: u32 = 8;

/// Reflectance of plant pixels (left half) and soil pixels (right half)
pub fn leaf_reflectance(x: u32, nm: f32) -> f32 {
    let plant = x < CUBE_SIZE / 2;
    match (plant, nm >= 700.0) {
        (true, true) => 0.6,
        (true, false) => 0.1,
        (false, true) => 0.3,
        (false, false) => 0.25,
    }
}

/// Writes an ENVI cube whose samples come from `f(x, y, wavelength)`.
/// Returns the header path.
pub fn write_cube(
    dir: &Path,
    name: &str,
    wavelengths: &[f32],
    f: impl Fn(u32, u32, f32) -> f32,
) -> PathBuf {
    let n = CUBE_SIZE;
    let mut data = Vec::with_capacity((n * n) as usize * wavelengths.len());
    for &nm in wavelengths {
        for y in 0..n {
            for x in 0..n {
                data.push(f(x, y, nm));
            }
        }
    }
    let (header, _) = envi::write(&dir.join(name), n, n, wavelengths, &data)
        .expect("Failed to write test cube");
    header
}

/// 8x8 cube: plant on the left half, soil on the right half
pub fn leaf_cube(dir: &Path) -> PathBuf {
    write_cube(dir, "leaf", &LEAF_WAVELENGTHS, |x, _, nm| leaf_reflectance(x, nm))
}

/// Same scene sampled at wavelengths 10 nm away from the NDVI pair
pub fn gapped_cube(dir: &Path) -> PathBuf {
    write_cube(dir, "gapped", &GAPPED_WAVELENGTHS, |x, _, nm| leaf_reflectance(x, nm))
}

/// Creates a 16x16 PNG with a horizontal red gradient
pub fn rgb_png(dir: &Path) -> PathBuf {
    let img = ImageBuffer::from_fn(16, 16, |x, _| Rgb([(x * 16) as u8, 100u8, 50u8]));
    let path = dir.join("photo.png");
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

/// Default configuration writing nothing but the in-memory report
pub fn config_for(image: &Path) -> WorkflowConfig {
    WorkflowConfig::new(image)
}

/// PNG files directly inside `dir`
pub fn png_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("Failed to list directory")
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "png"))
        .collect();
    files.sort();
    files
}
