pub mod analysis;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod spectral;
pub mod workflow;

pub use analysis::{ObjectType, VegetationIndex};
pub use config::{DebugMode, WorkflowConfig, parse_args};
pub use error::{Error, Result};
pub use models::{IndexImage, SpectralDataset};
pub use outputs::{Observation, Outputs};
pub use pipeline::{
    DebugConfig, Pipeline, PipelineContext, PipelineData, PipelineStep,
};
pub use spectral::read_image;
pub use workflow::{WorkflowReport, run};
