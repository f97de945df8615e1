use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::analysis::stats::masked_area;
use crate::analysis::steps::{AnalyzeStep, IndexStep, PseudoRgbStep, ThresholdStep};
use crate::config::WorkflowConfig;
use crate::error::{Error, Result};
use crate::outputs::Outputs;
use crate::pipeline::{Pipeline, PipelineContext, PipelineData, save_png};
use crate::spectral;

/// What a completed run produced
#[derive(Debug)]
pub struct WorkflowReport {
    pub preview: Option<PathBuf>,
    pub mask: GrayImage,
    pub masked_pixels: u64,
    pub outputs: Outputs,
}

/// Where the pseudo-RGB preview goes, when it should be written at all
pub fn preview_path(config: &WorkflowConfig) -> Option<PathBuf> {
    let outdir = config.outdir.as_ref().filter(|_| config.write_images)?;
    let basename = config
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Some(outdir.join(format!("{basename}_pseudo-rgb.png")))
}

/// Build the processing steps for a configuration
pub fn build_pipeline(config: &WorkflowConfig) -> Pipeline {
    Pipeline::new()
        .with_context(PipelineContext::from_config(config))
        .add_step(PseudoRgbStep {
            output: preview_path(config),
        })
        .add_step(IndexStep {
            index: config.index,
            distance: config.distance,
        })
        .add_step(ThresholdStep {
            threshold: config.threshold,
            max_value: config.max_value,
            object_type: config.object_type,
        })
        .add_step(AnalyzeStep)
}

/// Process one image from load to results file
///
/// Steps run strictly in order and the first failure aborts the run.
pub fn run(config: &WorkflowConfig) -> Result<WorkflowReport> {
    log::info!("Loading image: {}", config.image.display());
    let dataset = spectral::read_image(&config.image)?;
    log::info!(
        "Image loaded: {}x{} with {} bands ({})",
        dataset.width,
        dataset.height,
        dataset.bands,
        dataset.data_type
    );

    let data = build_pipeline(config).run(PipelineData::new(dataset, run_metadata(config)))?;

    let mask = data
        .mask
        .ok_or_else(|| Error::MissingInput {
            step: "workflow".to_string(),
            missing: "mask".to_string(),
        })?;

    if let Some(result) = &config.result {
        data.outputs.save_results(result)?;
    }

    if let Some(path) = &config.mask {
        save_mask(&mask, path)?;
    }

    Ok(WorkflowReport {
        preview: data.preview,
        masked_pixels: masked_area(&mask),
        mask,
        outputs: data.outputs,
    })
}

fn save_mask(mask: &GrayImage, path: &Path) -> Result<()> {
    save_png(&DynamicImage::ImageLuma8(mask.clone()), path)?;
    log::info!("Saved mask to {}", path.display());
    Ok(())
}

fn run_metadata(config: &WorkflowConfig) -> Outputs {
    let mut outputs = Outputs::new();
    outputs.add_metadata("image", config.image.display().to_string());
    outputs.add_metadata("index", config.index.name());
    outputs.add_metadata("distance", config.distance);
    outputs.add_metadata("threshold", config.threshold);
    outputs.add_metadata("max_value", config.max_value);

    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    if let Ok(stamp) = now.format(&Rfc3339) {
        outputs.add_metadata("run_date", stamp);
    }
    outputs
}
