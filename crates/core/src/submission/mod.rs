//! Submission data types and classification.

mod classifier;
mod types;

pub use classifier::classify;
pub use types::{
    Blob, InputMetadata, InputStatus, InputType, ItemCounts, MultiModalInput, ProcessedContent,
    ProcessedInput,
};
