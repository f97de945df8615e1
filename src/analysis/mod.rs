pub mod index;
pub mod stats;
pub mod steps;
pub mod threshold;

pub use index::{VegetationIndex, extract_index};
pub use threshold::{ObjectType, binary};
