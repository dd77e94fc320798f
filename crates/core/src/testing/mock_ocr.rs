//! Mock OCR service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::services::{OcrError, OcrService};

/// Mock implementation of the [`OcrService`] trait.
///
/// Provides controllable behavior for testing:
/// - Canned text, globally or keyed by payload length
/// - One-shot error injection, or per-payload-length errors for targeting a
///   specific item inside a fan-out
/// - Optional artificial delay
/// - Recorded call payload sizes for assertions
pub struct MockOcrService {
    text: RwLock<String>,
    text_by_len: RwLock<HashMap<usize, String>>,
    next_error: RwLock<Option<OcrError>>,
    error_by_len: RwLock<HashMap<usize, OcrError>>,
    delay: RwLock<Option<Duration>>,
    calls: RwLock<Vec<usize>>,
}

impl Default for MockOcrService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOcrService {
    /// Create a mock returning a fixed line of text.
    pub fn new() -> Self {
        Self {
            text: RwLock::new("mock extracted text".to_string()),
            text_by_len: RwLock::new(HashMap::new()),
            next_error: RwLock::new(None),
            error_by_len: RwLock::new(HashMap::new()),
            delay: RwLock::new(None),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Replace the canned text.
    pub async fn set_text(&self, text: impl Into<String>) {
        *self.text.write().await = text.into();
    }

    /// Return specific text for payloads of the given length.
    pub async fn set_text_for_len(&self, len: usize, text: impl Into<String>) {
        self.text_by_len.write().await.insert(len, text.into());
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: OcrError) {
        *self.next_error.write().await = Some(error);
    }

    /// Fail every call whose payload has the given length.
    pub async fn set_error_for_len(&self, len: usize, error: OcrError) {
        self.error_by_len.write().await.insert(len, error);
    }

    /// Delay every call by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl OcrService for MockOcrService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        self.calls.write().await.push(image.len());

        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if let Some(error) = self.error_by_len.write().await.remove(&image.len()) {
            return Err(error);
        }
        if let Some(text) = self.text_by_len.read().await.get(&image.len()) {
            return Ok(text.clone());
        }

        Ok(self.text.read().await.clone())
    }
}
