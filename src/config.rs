use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::analysis::index::VegetationIndex;
use crate::analysis::threshold::ObjectType;
use crate::error::{Error, Result};

/// How intermediate images are surfaced while the workflow runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DebugMode {
    /// No intermediate output
    #[default]
    None,
    /// Write each intermediate image as a PNG
    Print,
    /// Draw each intermediate image on the console
    Plot,
}

#[derive(Parser, Debug)]
#[command(name = "hyperveg", version)]
#[command(about = "Build a vegetation mask from a hyperspectral image")]
struct Cli {
    /// Input image (ENVI header, ENVI data file or a plain raster)
    #[arg(short, long, value_name = "PATH")]
    image: PathBuf,

    /// Output directory for images
    #[arg(short, long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Results file
    #[arg(short, long, value_name = "PATH")]
    result: Option<PathBuf>,

    /// Write the pseudo-RGB preview to the output directory
    #[arg(short, long = "writeimg")]
    writeimg: bool,

    /// Debug mode
    #[arg(short = 'D', long, value_enum, default_value = "none")]
    debug: DebugMode,

    /// Vegetation index to extract
    #[arg(long, value_enum, default_value = "ndvi")]
    index: VegetationIndex,

    /// Tolerance in nanometres when matching required wavelengths to bands
    #[arg(long, value_name = "NM", default_value_t = 20.0)]
    distance: f32,

    /// Index value separating foreground from background
    #[arg(short, long, default_value_t = 0.5, allow_negative_numbers = true)]
    threshold: f32,

    /// Mask value assigned to foreground pixels
    #[arg(long, default_value_t = 255, value_parser = clap::value_parser!(u8).range(1..))]
    max_value: u8,

    /// Whether foreground is above (light) or below (dark) the threshold
    #[arg(long, value_enum, default_value = "light")]
    object_type: ObjectType,

    /// Save the binary mask as PNG
    #[arg(short, long, value_name = "PATH")]
    mask: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

/// Everything a single workflow run needs, fixed once parsed
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub image: PathBuf,
    pub outdir: Option<PathBuf>,
    pub result: Option<PathBuf>,
    pub write_images: bool,
    pub debug: DebugMode,
    pub index: VegetationIndex,
    pub distance: f32,
    pub threshold: f32,
    pub max_value: u8,
    pub object_type: ObjectType,
    pub mask: Option<PathBuf>,
    pub verbose: bool,
}

impl WorkflowConfig {
    /// Configuration with default settings for the given input image
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            outdir: None,
            result: None,
            write_images: false,
            debug: DebugMode::None,
            index: VegetationIndex::Ndvi,
            distance: 20.0,
            threshold: 0.5,
            max_value: 255,
            object_type: ObjectType::Light,
            mask: None,
            verbose: false,
        }
    }
}

impl From<Cli> for WorkflowConfig {
    fn from(cli: Cli) -> Self {
        Self {
            image: cli.image,
            outdir: cli.outdir,
            result: cli.result,
            write_images: cli.writeimg,
            debug: cli.debug,
            index: cli.index,
            distance: cli.distance,
            threshold: cli.threshold,
            max_value: cli.max_value,
            object_type: cli.object_type,
            mask: cli.mask,
            verbose: cli.verbose,
        }
    }
}

/// Parse command-line tokens (program name first) into a configuration
///
/// Touches nothing outside the token list; a missing `--image` is reported
/// as [`Error::MissingRequiredArgument`].
pub fn parse_args<I, T>(args: I) -> Result<WorkflowConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|err| match err.kind() {
        ErrorKind::MissingRequiredArgument => Error::MissingRequiredArgument {
            flag: missing_flag(&err),
        },
        _ => Error::Usage(err),
    })?;
    Ok(cli.into())
}

fn missing_flag(err: &clap::Error) -> String {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::Strings(flags)) => flags.join(", "),
        Some(ContextValue::String(flag)) => flag.clone(),
        _ => "--image <PATH>".to_string(),
    }
}
