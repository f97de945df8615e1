#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from hyperveg for tests
pub use hyperveg::{
    DebugMode, Error, IndexImage, ObjectType, Outputs, SpectralDataset, VegetationIndex,
    WorkflowConfig,
};
