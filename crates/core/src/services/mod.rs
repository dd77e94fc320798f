//! External collaborator contracts and their production clients.
//!
//! Each collaborator is modeled as a trait with a typed error enum, a
//! networked `reqwest`-backed implementation for production, and a
//! deterministic mock in [`crate::testing`] for unit and integration tests.
//! The two are never conflated.

mod blob_store;
mod document_parser;
mod ocr;
mod speech;
mod vision;

pub use blob_store::{BlobRef, BlobStore, BlobStoreError, InMemoryBlobStore};
pub use document_parser::{
    DocMetadata, DocumentExtraction, DocumentParser, DocumentParserError, DocumentStructure,
    HttpDocumentParser,
};
pub use ocr::{HttpOcrService, OcrError, OcrService};
pub use speech::{
    HttpSpeechToText, SpeechError, SpeechToText, TranscriptionRequest, MAX_AUDIO_BYTES,
};
pub use vision::{HttpVisionAnalysis, ImageFeatures, VisionAnalysis, VisionError};

use serde::{Deserialize, Serialize};

/// Endpoint configuration shared by all HTTP-backed collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Base URL of the service (e.g., "http://localhost:7010").
    pub url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ServiceEndpoint {
    /// Create an endpoint with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoint = ServiceEndpoint::new("http://localhost:7010/");
        assert_eq!(endpoint.timeout_secs, 30);
        assert_eq!(endpoint.base_url(), "http://localhost:7010");
    }
}
