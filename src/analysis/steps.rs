use image::DynamicImage;
use std::path::PathBuf;

use crate::analysis::index::{VegetationIndex, extract_index};
use crate::analysis::stats::analyze_index;
use crate::analysis::threshold::{ObjectType, binary};
use crate::error::Result;
use crate::pipeline::{PipelineContext, PipelineData, PipelineStep, save_png};

/// Save the dataset's pseudo-RGB rendering when a destination is set
pub struct PseudoRgbStep {
    pub output: Option<PathBuf>,
}

impl PipelineStep for PseudoRgbStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        if let Some(path) = &self.output {
            let preview = DynamicImage::ImageRgb8(data.dataset.pseudo_rgb.clone());
            save_png(&preview, path)?;
            log::info!("Saved pseudo-RGB preview to {}", path.display());
            data.preview = Some(path.clone());
        }
        Ok(data)
    }

    fn name(&self) -> &str {
        "Pseudo-RGB Preview"
    }
}

/// Compute a vegetation index image
pub struct IndexStep {
    pub index: VegetationIndex,
    pub distance: f32,
}

impl PipelineStep for IndexStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let index = extract_index(&data.dataset, self.index, self.distance)?;
        data.image = Some(DynamicImage::ImageLuma8(index.to_gray()));
        data.index = Some(index);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Index Extraction"
    }
}

/// Binarize the index image
pub struct ThresholdStep {
    pub threshold: f32,
    pub max_value: u8,
    pub object_type: ObjectType,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let index = data.require_index(self.name())?;
        let mask = binary(index, self.threshold, self.max_value, self.object_type);
        data.image = Some(DynamicImage::ImageLuma8(mask.clone()));
        data.mask = Some(mask);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Binary Threshold"
    }
}

/// Record index statistics for the masked region
pub struct AnalyzeStep;

impl PipelineStep for AnalyzeStep {
    fn process(&self, mut data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mut outputs = std::mem::take(&mut data.outputs);
        let index = data.require_index(self.name())?;
        let mask = data.require_mask(self.name())?;
        let area = analyze_index(index, mask, &mut outputs);
        log::info!("Masked area: {} pixels", area);
        data.outputs = outputs;
        Ok(data)
    }

    fn name(&self) -> &str {
        "Index Analysis"
    }
}
