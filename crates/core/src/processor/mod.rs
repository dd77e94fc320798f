//! Per-modality processors.
//!
//! Each processor turns one raw [`Blob`](crate::submission::Blob) into a
//! structured record, calling external collaborators for optional
//! enrichment. A required step failing fails the whole item; an optional
//! enrichment failing is absorbed into the record's warnings list and the
//! corresponding field is omitted.

mod audio;
mod document;
mod error;
mod formats;
mod image;
pub mod signal;
mod types;

pub use audio::AudioProcessor;
pub use document::DocumentProcessor;
pub use error::ProcessError;
pub use formats::{resolve_format, DocumentFormat};
pub use image::ImageProcessor;
pub use types::{
    AudioFeatures, ProcessedAudio, ProcessedDocument, ProcessedImage, ProcessingOptions,
    ThumbnailSet, DEFAULT_WAVEFORM_BUCKETS,
};
