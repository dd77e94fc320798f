//! Mock document parser for testing.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::services::{DocumentExtraction, DocumentParser, DocumentParserError};

use super::fixtures;

/// Mock implementation of the [`DocumentParser`] trait.
///
/// Provides controllable behavior for testing:
/// - Canned extraction output
/// - One-shot error injection
/// - Optional artificial delay
/// - Recorded MIME types for assertions
pub struct MockDocumentParser {
    extraction: RwLock<DocumentExtraction>,
    next_error: RwLock<Option<DocumentParserError>>,
    delay: RwLock<Option<Duration>>,
    mime_types: RwLock<Vec<String>>,
}

impl Default for MockDocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDocumentParser {
    /// Create a mock returning a canned fixture extraction.
    pub fn new() -> Self {
        Self {
            extraction: RwLock::new(fixtures::document_extraction("mock document body")),
            next_error: RwLock::new(None),
            delay: RwLock::new(None),
            mime_types: RwLock::new(Vec::new()),
        }
    }

    /// Replace the canned extraction.
    pub async fn set_extraction(&self, extraction: DocumentExtraction) {
        *self.extraction.write().await = extraction;
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: DocumentParserError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every call by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.mime_types.read().await.len()
    }

    /// MIME types recorded so far, in call order.
    pub async fn recorded_mime_types(&self) -> Vec<String> {
        self.mime_types.read().await.clone()
    }
}

#[async_trait]
impl DocumentParser for MockDocumentParser {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(
        &self,
        _document: &[u8],
        mime_type: &str,
    ) -> Result<DocumentExtraction, DocumentParserError> {
        self.mime_types.write().await.push(mime_type.to_string());

        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.extraction.read().await.clone())
    }
}
