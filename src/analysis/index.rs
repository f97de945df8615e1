use clap::ValueEnum;
use std::fmt;

use crate::error::{Error, Result};
use crate::models::{IndexImage, SpectralDataset};

/// Slack for wavelengths that went through a unit conversion
const WAVELENGTH_EPSILON: f32 = 1e-3;

/// Vegetation indices computable from reflectance bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VegetationIndex {
    Ndvi,
    Gdvi,
    Savi,
    Pri,
    Ari,
    #[value(name = "ci_rededge")]
    CiRededge,
    Cri550,
    Cri700,
    Egi,
    Evi,
    Mari,
    Mcari,
    Mtci,
    Ndre,
    #[value(name = "psnd_chla")]
    PsndChla,
    #[value(name = "psnd_chlb")]
    PsndChlb,
    #[value(name = "psnd_car")]
    PsndCar,
    Psri,
    #[value(name = "pssr_chla")]
    PssrChla,
    #[value(name = "pssr_chlb")]
    PssrChlb,
    #[value(name = "pssr_car")]
    PssrCar,
    Rgri,
    Rvsi,
    Sipi,
    Sr,
    Vari,
    #[value(name = "vi_green")]
    ViGreen,
    Wi,
}

impl VegetationIndex {
    pub fn name(&self) -> &'static str {
        use VegetationIndex::*;
        match self {
            Ndvi => "ndvi",
            Gdvi => "gdvi",
            Savi => "savi",
            Pri => "pri",
            Ari => "ari",
            CiRededge => "ci_rededge",
            Cri550 => "cri550",
            Cri700 => "cri700",
            Egi => "egi",
            Evi => "evi",
            Mari => "mari",
            Mcari => "mcari",
            Mtci => "mtci",
            Ndre => "ndre",
            PsndChla => "psnd_chla",
            PsndChlb => "psnd_chlb",
            PsndCar => "psnd_car",
            Psri => "psri",
            PssrChla => "pssr_chla",
            PssrChlb => "pssr_chlb",
            PssrCar => "pssr_car",
            Rgri => "rgri",
            Rvsi => "rvsi",
            Sipi => "sipi",
            Sr => "sr",
            Vari => "vari",
            ViGreen => "vi_green",
            Wi => "wi",
        }
    }

    /// Wavelengths (nm) the formula reads, in the order `compute` expects them
    pub fn wavelengths(&self) -> &'static [f32] {
        use VegetationIndex::*;
        match self {
            Ndvi | Gdvi | Savi | PsndChla | PssrChla | Sr => &[800.0, 680.0],
            Pri => &[531.0, 570.0],
            Ari => &[550.0, 700.0],
            CiRededge => &[800.0, 700.0],
            Cri550 => &[510.0, 550.0],
            Cri700 => &[510.0, 700.0],
            Egi => &[550.0, 650.0, 480.0],
            Evi => &[800.0, 670.0, 480.0],
            Mari => &[550.0, 700.0, 800.0],
            Mcari => &[700.0, 670.0, 550.0],
            Mtci => &[753.0, 708.0, 681.0],
            Ndre => &[790.0, 720.0],
            PsndChlb | PssrChlb => &[800.0, 635.0],
            PsndCar | PssrCar => &[800.0, 470.0],
            Psri => &[678.0, 500.0, 750.0],
            Rgri => &[670.0, 560.0],
            Rvsi => &[714.0, 752.0, 733.0],
            Sipi => &[800.0, 445.0, 680.0],
            Vari => &[550.0, 670.0, 480.0],
            ViGreen => &[550.0, 670.0],
            Wi => &[900.0, 970.0],
        }
    }

    /// Index value for one pixel; `r` holds reflectances matching `wavelengths()`
    pub fn compute(&self, r: &[f32]) -> f32 {
        use VegetationIndex::*;
        match self {
            Ndvi | PsndChla | PsndChlb | PsndCar | Pri | Ndre | ViGreen => {
                (r[0] - r[1]) / (r[0] + r[1])
            }
            Gdvi => r[0] - r[1],
            Savi => 1.5 * (r[0] - r[1]) / (r[0] + r[1] + 0.5),
            Ari | Cri550 | Cri700 => 1.0 / r[0] - 1.0 / r[1],
            CiRededge => r[0] / r[1] - 1.0,
            Egi => 2.0 * r[0] - r[1] - r[2],
            Evi => 2.5 * (r[0] - r[1]) / (1.0 + r[0] + 6.0 * r[1] - 7.5 * r[2]),
            Mari => (1.0 / r[0] - 1.0 / r[1]) * r[2],
            Mcari => ((r[0] - r[1]) - 0.2 * (r[0] - r[2])) * (r[0] / r[1]),
            Mtci => (r[0] - r[1]) / (r[1] - r[2]),
            Psri => (r[0] - r[1]) / r[2],
            PssrChla | PssrChlb | PssrCar | Sr | Rgri | Wi => r[0] / r[1],
            Rvsi => (r[0] + r[1]) / 2.0 - r[2],
            Sipi => (r[0] - r[1]) / (r[0] - r[2]),
            Vari => (r[0] - r[1]) / (r[0] + r[1] - r[2]),
        }
    }
}

impl fmt::Display for VegetationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute `index` for every pixel of `dataset`
///
/// Each required wavelength is served by the nearest band, which must lie
/// within `distance` nanometres of it.
pub fn extract_index(
    dataset: &SpectralDataset,
    index: VegetationIndex,
    distance: f32,
) -> Result<IndexImage> {
    let unavailable = |reason: String| Error::IndexUnavailable {
        index: index.name().to_string(),
        reason,
    };

    let mut bands = Vec::with_capacity(index.wavelengths().len());
    for &wanted in index.wavelengths() {
        match dataset.nearest_band(wanted) {
            Some((band, found)) if (found - wanted).abs() <= distance + WAVELENGTH_EPSILON => {
                log::debug!("{index}: {wanted} nm served by band {band} ({found} nm)");
                bands.push(dataset.band(band));
            }
            Some((_, found)) => {
                return Err(unavailable(format!(
                    "no band within {distance} nm of {wanted} nm (nearest is {found} nm)"
                )));
            }
            None => return Err(unavailable("image has no wavelength information".to_string())),
        }
    }

    let mut r = vec![0.0f32; bands.len()];
    let values = (0..dataset.pixel_count())
        .map(|i| {
            for (slot, band) in r.iter_mut().zip(&bands) {
                *slot = band[i];
            }
            index.compute(&r)
        })
        .collect();

    Ok(IndexImage::new(index.name(), dataset.width, dataset.height, values))
}
