use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{DebugMode, WorkflowConfig};
use crate::error::{Error, Result};
use crate::models::{IndexImage, SpectralDataset};
use crate::outputs::Outputs;

/// Widest console rendering in plot mode, in characters
pub const PLOT_COLUMNS: u32 = 64;

/// Dark to bright
const PLOT_RAMP: &[u8] = b" .:-=+*#%@";

/// Data that flows through the pipeline
///
/// Each step fills in the artifact it produces; later steps read what
/// earlier ones left behind.
pub struct PipelineData {
    /// The loaded cube (shared, never mutated)
    pub dataset: Arc<SpectralDataset>,

    /// Where the pseudo-RGB preview was written, if it was
    pub preview: Option<PathBuf>,

    pub index: Option<IndexImage>,

    pub mask: Option<GrayImage>,

    /// Measurements accumulated so far
    pub outputs: Outputs,

    /// Image produced by the latest step, surfaced in debug mode
    pub image: Option<DynamicImage>,
}

impl PipelineData {
    pub fn new(dataset: SpectralDataset, outputs: Outputs) -> Self {
        Self {
            dataset: Arc::new(dataset),
            preview: None,
            index: None,
            mask: None,
            outputs,
            image: None,
        }
    }

    /// Index image, or an error naming the step that needed it
    pub fn require_index(&self, step: &str) -> Result<&IndexImage> {
        self.index.as_ref().ok_or_else(|| Error::MissingInput {
            step: step.to_string(),
            missing: "index image".to_string(),
        })
    }

    pub fn require_mask(&self, step: &str) -> Result<&GrayImage> {
        self.mask.as_ref().ok_or_else(|| Error::MissingInput {
            step: step.to_string(),
            missing: "mask".to_string(),
        })
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug, PartialEq)]
pub enum DebugConfig {
    /// Save intermediate images as PNG files under this directory
    Print { output_dir: PathBuf },
    /// Draw intermediate images on the console
    Plot,
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Derive the debug settings from a run configuration
    ///
    /// Print mode writes next to the other outputs, or into the working
    /// directory when no output directory was given.
    pub fn from_config(config: &WorkflowConfig) -> Self {
        let debug = match config.debug {
            DebugMode::None => None,
            DebugMode::Print => Some(DebugConfig::Print {
                output_dir: config.outdir.clone().unwrap_or_else(|| PathBuf::from(".")),
            }),
            DebugMode::Plot => Some(DebugConfig::Plot),
        };
        Self { debug }
    }

    /// Surface one intermediate image according to the debug mode
    pub fn emit(&self, step_index: usize, step_name: &str, image: &DynamicImage) -> Result<()> {
        match &self.debug {
            None => Ok(()),
            Some(DebugConfig::Print { output_dir }) => {
                let filename = debug_filename(step_index, step_name);
                let path = output_dir.join(&filename);
                save_png(image, &path)?;
                log::debug!("Debug: saved {}", path.display());
                Ok(())
            }
            Some(DebugConfig::Plot) => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                plot_image(&mut out, step_name, image)
                    .map_err(|e| Error::write_failure(Path::new("<stdout>"), e))
            }
        }
    }
}

/// File name for a debug image, e.g. "02_index_extraction.png"
pub fn debug_filename(step_index: usize, step_name: &str) -> String {
    format!(
        "{:02}_{}.png",
        step_index,
        step_name.to_lowercase().replace(' ', "_")
    )
}

/// Save an image as PNG, creating the parent directory when needed
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::write_failure(path, e))?;
    }
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::write_failure(path, e))
}

/// Draw `image` as character art, at most [`PLOT_COLUMNS`] wide
pub fn plot_image<W: Write>(out: &mut W, title: &str, image: &DynamicImage) -> std::io::Result<()> {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    writeln!(out, "== {title} ({width}x{height}) ==")?;
    if width == 0 || height == 0 {
        return Ok(());
    }

    let cols = width.min(PLOT_COLUMNS);
    let cell = width as f32 / cols as f32;
    // Console cells are roughly twice as tall as wide
    let rows = (height as f32 / cell / 2.0).ceil().max(1.0) as u32;
    let small = image::imageops::resize(&gray, cols, rows, FilterType::Triangle);

    let levels = PLOT_RAMP.len() - 1;
    for row in small.rows() {
        let line: String = row
            .map(|p| PLOT_RAMP[(p[0] as usize * levels + 127) / 255] as char)
            .collect();
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep {
    /// Consume the data, add this step's artifact, and hand it on
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name for this step (used in logs and debug file names)
    fn name(&self) -> &str;
}

/// Ordered list of steps run one after another
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    pub fn with_context(mut self, context: PipelineContext) -> Self {
        self.context = context;
        self
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: impl PipelineStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order, emitting intermediate images in debug mode
    pub fn run(&self, input: PipelineData) -> Result<PipelineData> {
        if self.context.debug.is_some() {
            let preview = DynamicImage::ImageRgb8(input.dataset.pseudo_rgb.clone());
            self.context.emit(0, "input", &preview)?;
        }

        let mut data = input;
        for (step_idx, step) in self.steps.iter().enumerate() {
            log::info!("Running step {}: {}", step_idx + 1, step.name());
            data = step.process(data, &self.context)?;

            if let Some(image) = data.image.take() {
                self.context.emit(step_idx + 1, step.name(), &image)?;
            }
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
