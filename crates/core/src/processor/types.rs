//! Types for the processor module.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::{BlobRef, DocMetadata, DocumentStructure, ImageFeatures};

use super::formats::DocumentFormat;

/// Default number of amplitude buckets in a waveform summary.
pub const DEFAULT_WAVEFORM_BUCKETS: usize = 100;

/// Per-submission processing switches.
///
/// Each flag gates one optional enrichment path; required steps always run.
/// Processor and collaborator substitution for tests happens at orchestrator
/// construction, not here.
#[derive(Debug, Clone, Default)]
pub struct ProcessingOptions {
    /// Call the vision-analysis and OCR collaborators for each image.
    pub enable_image_analysis: bool,
    /// Call the speech-to-text collaborator for the audio recording.
    pub enable_audio_transcription: bool,
    /// Call the document-parser collaborator for each document.
    pub enable_document_extraction: bool,
    /// Language hint forwarded to the speech-to-text collaborator.
    pub transcription_language: Option<String>,
}

impl ProcessingOptions {
    /// Options with every enrichment enabled.
    pub fn enable_all() -> Self {
        Self {
            enable_image_analysis: true,
            enable_audio_transcription: true,
            enable_document_extraction: true,
            transcription_language: None,
        }
    }

    /// Set the transcription language hint.
    pub fn with_transcription_language(mut self, language: impl Into<String>) -> Self {
        self.transcription_language = Some(language.into());
        self
    }
}

/// References to the three-tier thumbnail set of a processed image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThumbnailSet {
    pub small: BlobRef,
    pub medium: BlobRef,
    pub large: BlobRef,
}

/// One analyzed image.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedImage {
    pub id: Uuid,
    pub byte_size: u64,
    /// Decoded container format (e.g., "png", "jpeg").
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// OCR output, present when requested and the collaborator succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    /// Vision features, present when requested and the collaborator succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<ImageFeatures>,
    /// Always populated on success; generation failure fails the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<ThumbnailSet>,
}

/// Locally computed signal features of an audio recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    /// Fraction of frames above the speech energy threshold.
    pub speech_ratio: f64,
    /// Fraction of frames at or below the speech energy threshold.
    pub silence_ratio: f64,
    /// Mean squared amplitude over the whole recording.
    pub energy: f64,
    /// Fraction of adjacent sample pairs that change sign.
    pub zero_crossing_rate: f64,
    /// Magnitude-weighted mean frequency in Hz.
    pub spectral_centroid: f64,
    /// Frequency in Hz below which 85% of spectral magnitude lies.
    pub spectral_rolloff: f64,
    /// Tempo estimate in BPM, when the energy envelope shows periodicity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    /// Pitch-class estimate ("C" through "B"), when a dominant pitch exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// One analyzed audio recording.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedAudio {
    pub id: Uuid,
    pub byte_size: u64,
    /// Decoded container format (currently always "wav").
    pub format: String,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    /// Transcript, present when requested and the collaborator succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcribed_text: Option<String>,
    pub features: AudioFeatures,
    /// Fixed-length per-bucket peak amplitudes for visualization.
    pub waveform: Vec<f32>,
}

/// One analyzed document.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub id: Uuid,
    pub byte_size: u64,
    /// Canonical format tag, or [`DocumentFormat::Unknown`].
    pub format: DocumentFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Parser output, present when requested and the collaborator succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_metadata: Option<DocMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<DocumentStructure>,
}
