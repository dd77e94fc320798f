//! Core submission data types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::processor::{ProcessedAudio, ProcessedDocument, ProcessedImage};

/// A raw binary payload attached to a submission.
///
/// The declared content type and filename are hints only; format resolution
/// may also sniff magic bytes when neither maps to a known format.
#[derive(Debug, Clone, Default)]
pub struct Blob {
    /// Raw bytes as submitted.
    pub data: Vec<u8>,
    /// Declared MIME type, if the caller provided one.
    pub content_type: Option<String>,
    /// Original filename, if the caller provided one.
    pub filename: Option<String>,
}

impl Blob {
    /// Create a blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            content_type: None,
            filename: None,
        }
    }

    /// Attach a declared MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Attach the original filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Size of the payload in bytes.
    pub fn byte_size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// One user submission: free text, images, an audio recording, and documents,
/// singly or combined. Immutable once handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct MultiModalInput {
    /// Free text, if any.
    pub text: Option<String>,
    /// Attached images.
    pub images: Vec<Blob>,
    /// Attached audio recording.
    pub audio: Option<Blob>,
    /// Attached documents.
    pub documents: Vec<Blob>,
    /// When the caller created this submission.
    pub submitted_at: DateTime<Utc>,
}

impl MultiModalInput {
    /// Create an empty submission stamped with the current time.
    pub fn new() -> Self {
        Self {
            text: None,
            images: Vec::new(),
            audio: None,
            documents: Vec::new(),
            submitted_at: Utc::now(),
        }
    }

    /// Convenience constructor for a text-only submission.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_text(text)
    }

    /// Set the free-text part.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append an image.
    pub fn with_image(mut self, image: Blob) -> Self {
        self.images.push(image);
        self
    }

    /// Set the audio recording.
    pub fn with_audio(mut self, audio: Blob) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Append a document.
    pub fn with_document(mut self, document: Blob) -> Self {
        self.documents.push(document);
        self
    }

    /// Whether the free-text part is present and non-empty.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Whether no modality carries any content.
    pub fn is_empty(&self) -> bool {
        !self.has_text() && self.images.is_empty() && self.audio.is_none() && self.documents.is_empty()
    }

    /// Total byte size of all binary payloads. Text contributes zero.
    pub fn binary_size(&self) -> u64 {
        let images: u64 = self.images.iter().map(Blob::byte_size).sum();
        let audio = self.audio.as_ref().map(Blob::byte_size).unwrap_or(0);
        let documents: u64 = self.documents.iter().map(Blob::byte_size).sum();
        images + audio + documents
    }
}

impl Default for MultiModalInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Dominant modality of a submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Image,
    Audio,
    Document,
    Mixed,
}

impl InputType {
    /// Stable lowercase name, used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Image => "image",
            InputType::Audio => "audio",
            InputType::Document => "document",
            InputType::Mixed => "mixed",
        }
    }
}

/// Lifecycle state of a processed submission.
///
/// The only legal paths are `Pending -> Processing -> {Completed | Error}`
/// and `Pending -> Error` (validation failure or pre-dispatch cancellation).
/// Terminal states are frozen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl InputStatus {
    /// Stable lowercase name, used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputStatus::Pending => "pending",
            InputStatus::Processing => "processing",
            InputStatus::Completed => "completed",
            InputStatus::Error => "error",
        }
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InputStatus::Completed | InputStatus::Error)
    }

    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: InputStatus) -> bool {
        match (self, next) {
            (InputStatus::Pending, InputStatus::Processing) => true,
            (InputStatus::Pending, InputStatus::Error) => true,
            (InputStatus::Processing, InputStatus::Completed) => true,
            (InputStatus::Processing, InputStatus::Error) => true,
            _ => false,
        }
    }
}

/// Per-modality item counts of the originating submission.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemCounts {
    pub text: usize,
    pub images: usize,
    pub audio: usize,
    pub documents: usize,
}

impl ItemCounts {
    /// Counts mirroring presence in the given submission.
    pub fn of(input: &MultiModalInput) -> Self {
        Self {
            text: usize::from(input.has_text()),
            images: input.images.len(),
            audio: usize::from(input.audio.is_some()),
            documents: input.documents.len(),
        }
    }
}

/// Aggregate metadata computed over a completed submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InputMetadata {
    /// Sum of byte sizes of all submitted binary blobs. Text contributes zero.
    pub total_size: u64,
    /// Per-modality item counts, mirroring the source submission.
    pub item_count: ItemCounts,
    /// Wall-clock processing time from dispatch to aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    /// Rough token estimate for downstream AI consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_estimate: Option<u64>,
    /// Detected language tag ("zh-CN", "en-US", or "unknown").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Enrichment confidence in `[0.5, 1.0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Structured per-modality results of a submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessedContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ProcessedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<ProcessedAudio>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<ProcessedDocument>,
}

/// The unit of work representing one submission and its aggregated results.
///
/// Owned exclusively by the orchestrator; callers and listeners only ever see
/// clones taken at transition time.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedInput {
    /// Unique for the lifetime of the orchestrator instance.
    pub id: Uuid,
    /// Dominant modality, assigned at submission time.
    #[serde(rename = "type")]
    pub input_type: InputType,
    /// The originating submission, immutable once submitted.
    #[serde(skip)]
    pub source: Arc<MultiModalInput>,
    /// Per-modality results. Partial on error records.
    pub content: ProcessedContent,
    /// Aggregate metadata.
    pub metadata: InputMetadata,
    /// Lifecycle state.
    pub status: InputStatus,
    /// Captured failure message for error records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Absorbed collaborator failures. Never affects `status`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Taken from the originating submission.
    pub submitted_at: DateTime<Utc>,
}

impl ProcessedInput {
    /// Create a fresh pending record for a registered submission.
    pub fn new(id: Uuid, input_type: InputType, source: Arc<MultiModalInput>) -> Self {
        let metadata = InputMetadata {
            total_size: source.binary_size(),
            item_count: ItemCounts::of(&source),
            ..InputMetadata::default()
        };
        let submitted_at = source.submitted_at;

        Self {
            id,
            input_type,
            source,
            content: ProcessedContent::default(),
            metadata,
            status: InputStatus::Pending,
            error: None,
            warnings: Vec::new(),
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use InputStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Error));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Error));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Error));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Error.can_transition_to(Completed));
        assert!(!Error.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!InputStatus::Pending.is_terminal());
        assert!(!InputStatus::Processing.is_terminal());
        assert!(InputStatus::Completed.is_terminal());
        assert!(InputStatus::Error.is_terminal());
    }

    #[test]
    fn test_item_counts_mirror_source() {
        let input = MultiModalInput::text("hello")
            .with_image(Blob::new(vec![1, 2, 3]))
            .with_image(Blob::new(vec![4, 5]))
            .with_document(Blob::new(vec![6]));

        let counts = ItemCounts::of(&input);
        assert_eq!(counts.text, 1);
        assert_eq!(counts.images, 2);
        assert_eq!(counts.audio, 0);
        assert_eq!(counts.documents, 1);
    }

    #[test]
    fn test_binary_size_ignores_text() {
        let input = MultiModalInput::text("some long text that should not count")
            .with_image(Blob::new(vec![0u8; 10]))
            .with_audio(Blob::new(vec![0u8; 20]))
            .with_document(Blob::new(vec![0u8; 30]));

        assert_eq!(input.binary_size(), 60);
    }

    #[test]
    fn test_empty_submission() {
        assert!(MultiModalInput::new().is_empty());
        assert!(MultiModalInput::text("").is_empty());
        assert!(!MultiModalInput::text("x").is_empty());
        assert!(!MultiModalInput::new().with_audio(Blob::new(vec![0])).is_empty());
    }

    #[test]
    fn test_new_record_is_pending() {
        let source = Arc::new(MultiModalInput::text("hi"));
        let record = ProcessedInput::new(Uuid::new_v4(), InputType::Text, source);

        assert_eq!(record.status, InputStatus::Pending);
        assert!(record.error.is_none());
        assert!(record.warnings.is_empty());
        assert_eq!(record.metadata.item_count.text, 1);
        assert_eq!(record.metadata.total_size, 0);
    }
}
