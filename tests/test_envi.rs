//! Loading ENVI cubes and plain raster images.

mod common;

use common::*;
use hyperveg::read_image;
use std::path::Path;

/// Sample value at band `b`, line `l`, sample `s` of the interleave test cube
fn cube_value(b: usize, l: usize, s: usize) -> u16 {
    (b * 100 + l * 10 + s) as u16
}

/// Write a 3x2x4 (samples x lines x bands) big-endian uint16 cube
fn write_interleaved(dir: &Path, name: &str, interleave: &str) -> std::path::PathBuf {
    let (samples, lines, bands) = (3usize, 2usize, 4usize);
    let mut bytes = Vec::new();
    let mut push = |b: usize, l: usize, s: usize| bytes.extend_from_slice(&cube_value(b, l, s).to_be_bytes());

    match interleave {
        "bsq" => {
            for b in 0..bands {
                for l in 0..lines {
                    for s in 0..samples {
                        push(b, l, s);
                    }
                }
            }
        }
        "bil" => {
            for l in 0..lines {
                for b in 0..bands {
                    for s in 0..samples {
                        push(b, l, s);
                    }
                }
            }
        }
        _ => {
            for l in 0..lines {
                for s in 0..samples {
                    for b in 0..bands {
                        push(b, l, s);
                    }
                }
            }
        }
    }

    let header = format!(
        "ENVI\nsamples = {samples}\nlines = {lines}\nbands = {bands}\nheader offset = 0\n\
         data type = 12\ninterleave = {interleave}\nbyte order = 1\n\
         wavelength = {{500, 600,\n 700, 800}}\n"
    );
    let data_path = dir.join(format!("{name}.img"));
    std::fs::write(dir.join(format!("{name}.hdr")), header).unwrap();
    std::fs::write(&data_path, bytes).unwrap();
    data_path
}

#[test]
fn test_read_written_cube() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let header = leaf_cube(dir.path());

    let cube = read_image(&header)?;

    assert_eq!(cube.width, CUBE_SIZE);
    assert_eq!(cube.height, CUBE_SIZE);
    assert_eq!(cube.bands, LEAF_WAVELENGTHS.len());
    assert_eq!(cube.wavelengths, LEAF_WAVELENGTHS.to_vec());
    assert_eq!(cube.data_type, "float32");
    assert_eq!(cube.min_wavelength(), Some(480.0));
    assert_eq!(cube.max_wavelength(), Some(800.0));
    assert_eq!(cube.value_range(), Some((0.1, 0.6)));

    // Band 4 is 800 nm: plant on the left, soil on the right
    let nir = cube.band(4);
    assert_eq!(nir[0], 0.6);
    assert_eq!(nir[CUBE_SIZE as usize - 1], 0.3);

    assert_eq!(cube.pseudo_rgb.dimensions(), (CUBE_SIZE, CUBE_SIZE));

    Ok(())
}

#[test]
fn test_data_file_path_finds_header() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let header = leaf_cube(dir.path());
    let data = header.with_extension("raw");

    let by_header = read_image(&header)?;
    let by_data = read_image(&data)?;

    assert_eq!(by_header.data, by_data.data);
    assert_eq!(by_header.wavelengths, by_data.wavelengths);

    Ok(())
}

#[test]
fn test_interleaves_decode_identically() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;

    let bsq = read_image(&write_interleaved(dir.path(), "a", "bsq"))?;
    let bil = read_image(&write_interleaved(dir.path(), "b", "bil"))?;
    let bip = read_image(&write_interleaved(dir.path(), "c", "bip"))?;

    assert_eq!(bsq.interleave, "bsq");
    assert_eq!(bil.interleave, "bil");
    assert_eq!(bip.interleave, "bip");
    assert_eq!(bsq.data, bil.data);
    assert_eq!(bsq.data, bip.data);

    // Band 2, line 1, sample 2
    assert_eq!(bsq.band(2)[3 + 2], cube_value(2, 1, 2) as f32);
    assert_eq!(bsq.data_type, "uint16");
    assert_eq!(bsq.wavelengths, vec![500.0, 600.0, 700.0, 800.0]);

    Ok(())
}

#[test]
fn test_truncated_data_is_unreadable() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let header = leaf_cube(dir.path());
    let data = header.with_extension("raw");
    let bytes = std::fs::read(&data)?;
    std::fs::write(&data, &bytes[..bytes.len() - 4])?;

    let err = read_image(&header).unwrap_err();
    assert!(matches!(err, Error::UnreadableImage { .. }), "got {err:?}");

    Ok(())
}

#[test]
fn test_oversized_dimensions_are_unreadable() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let header = dir.path().join("huge.hdr");
    std::fs::write(
        &header,
        "ENVI\nsamples = 2147483648\nlines = 2147483648\nbands = 4\ndata type = 4\n",
    )?;
    std::fs::write(dir.path().join("huge.raw"), [0u8; 16])?;

    let err = read_image(&header).unwrap_err();
    assert!(
        matches!(&err, Error::UnreadableImage { reason, .. } if reason.contains("overflow")),
        "got {err:?}"
    );

    Ok(())
}

#[test]
fn test_header_without_data_is_unreadable() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let header = leaf_cube(dir.path());
    std::fs::remove_file(header.with_extension("raw"))?;

    let err = read_image(&header).unwrap_err();
    assert!(matches!(err, Error::UnreadableImage { .. }), "got {err:?}");

    Ok(())
}

#[test]
fn test_missing_and_unknown_files_are_unreadable() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;

    let missing = read_image(&dir.path().join("nothing.hdr")).unwrap_err();
    assert!(matches!(missing, Error::UnreadableImage { .. }));

    let unknown = dir.path().join("notes.xyz");
    std::fs::write(&unknown, "not an image")?;
    let err = read_image(&unknown).unwrap_err();
    assert!(matches!(err, Error::UnreadableImage { .. }));

    let broken = dir.path().join("broken.png");
    std::fs::write(&broken, "not a png either")?;
    let err = read_image(&broken).unwrap_err();
    assert!(matches!(err, Error::UnreadableImage { .. }));

    Ok(())
}

#[test]
fn test_native_raster() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = rgb_png(dir.path());

    let image = read_image(&path)?;

    assert_eq!(image.bands, 3);
    assert!(image.wavelengths.is_empty());
    assert_eq!(image.band(0)[5], 80.0);
    assert_eq!(image.band(1)[5], 100.0);
    assert_eq!(image.band(2)[5], 50.0);
    assert_eq!(image.pseudo_rgb.get_pixel(5, 0).0, [80, 100, 50]);

    Ok(())
}

#[test]
fn test_pseudo_rgb_picks_visible_bands() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    // Only the 640 nm band is bright; it should land in the red channel
    let header = write_cube(dir.path(), "red", &LEAF_WAVELENGTHS, |_, _, nm| {
        if nm == 640.0 { 1.0 } else { 0.0 }
    });

    let cube = read_image(&header)?;
    assert_eq!(cube.pseudo_rgb.get_pixel(0, 0).0, [255, 0, 0]);

    Ok(())
}

#[test]
fn test_pseudo_rgb_honours_default_bands() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let header = dir.path().join("two.hdr");
    std::fs::write(
        &header,
        "ENVI\nsamples = 1\nlines = 1\nbands = 2\ndata type = 1\ninterleave = bsq\n\
         wavelength units = micrometers\nwavelength = {0.5, 0.9}\ndefault bands = {2, 1, 1}\n",
    )?;
    std::fs::write(dir.path().join("two"), [0u8, 200u8])?;

    let cube = read_image(&header)?;

    assert!((cube.wavelengths[0] - 500.0).abs() < 1e-3);
    assert!((cube.wavelengths[1] - 900.0).abs() < 1e-3);
    assert_eq!(cube.data_type, "uint8");
    assert_eq!(cube.pseudo_rgb.get_pixel(0, 0).0, [255, 0, 0]);

    Ok(())
}
