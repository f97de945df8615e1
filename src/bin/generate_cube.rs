//! Writes a synthetic ENVI reflectance cube: a round leaf over bare soil.
//!
//! ```text
//! cargo run --bin generate_cube -- --out sample/leaf
//! cargo run -- -i sample/leaf.hdr -o out -w -r out/results.json
//! ```

use clap::Parser;
use std::path::PathBuf;

use hyperveg::spectral::envi;

#[derive(Parser)]
#[command(name = "generate_cube")]
#[command(about = "Write a synthetic hyperspectral cube in ENVI format")]
struct Args {
    /// Output path without extension (".hdr" and ".raw" are added)
    #[arg(long, default_value = "sample/leaf")]
    out: PathBuf,

    /// Width and height in pixels
    #[arg(long, default_value_t = 64)]
    size: u32,

    /// First band centre in nm
    #[arg(long, default_value_t = 400.0)]
    start: f32,

    /// Spacing between band centres in nm
    #[arg(long, default_value_t = 10.0)]
    step: f32,

    /// Number of bands
    #[arg(long, default_value_t = 61)]
    bands: usize,
}

/// Green vegetation: chlorophyll absorption in red, high NIR plateau
fn leaf_reflectance(nm: f32) -> f32 {
    let green_peak = 0.12 * (-(nm - 550.0).powi(2) / (2.0 * 30.0f32.powi(2))).exp();
    let red_edge = 0.5 / (1.0 + (-(nm - 715.0) / 15.0).exp());
    0.04 + green_peak + red_edge
}

/// Dry soil: slowly rising, featureless
fn soil_reflectance(nm: f32) -> f32 {
    0.15 + 0.15 * ((nm - 400.0) / 600.0).clamp(0.0, 1.0)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let size = args.size;
    let wavelengths: Vec<f32> = (0..args.bands)
        .map(|b| args.start + args.step * b as f32)
        .collect();

    let centre = size as f32 / 2.0;
    let radius = size as f32 / 3.0;
    let pixels = size as usize * size as usize;
    let mut data = vec![0.0f32; pixels * args.bands];

    for (b, &nm) in wavelengths.iter().enumerate() {
        let leaf = leaf_reflectance(nm);
        let soil = soil_reflectance(nm);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - centre;
                let dy = y as f32 + 0.5 - centre;
                let inside = (dx * dx + dy * dy).sqrt() < radius;
                // Slight left-to-right illumination falloff
                let shade = 1.0 - 0.2 * x as f32 / size as f32;
                let value = if inside { leaf } else { soil };
                data[b * pixels + (y * size + x) as usize] = value * shade;
            }
        }
    }

    let (header, raw) = envi::write(&args.out, size, size, &wavelengths, &data)?;
    println!("Wrote {} and {}", header.display(), raw.display());
    println!(
        "{}x{} pixels, {} bands from {} to {} nm",
        size,
        size,
        args.bands,
        wavelengths.first().copied().unwrap_or_default(),
        wavelengths.last().copied().unwrap_or_default()
    );

    Ok(())
}
