//! Mock speech-to-text service for testing.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::services::{SpeechError, SpeechToText, TranscriptionRequest, MAX_AUDIO_BYTES};

/// Mock implementation of the [`SpeechToText`] trait.
///
/// Provides controllable behavior for testing:
/// - Canned transcript
/// - One-shot error injection
/// - The same 25 MiB payload limit as the real service
/// - Optional artificial delay
/// - Recorded requests for assertions
pub struct MockSpeechToText {
    transcript: RwLock<String>,
    next_error: RwLock<Option<SpeechError>>,
    delay: RwLock<Option<Duration>>,
    requests: RwLock<Vec<TranscriptionRequest>>,
}

impl Default for MockSpeechToText {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSpeechToText {
    /// Create a mock returning a fixed transcript.
    pub fn new() -> Self {
        Self {
            transcript: RwLock::new("mock transcript".to_string()),
            next_error: RwLock::new(None),
            delay: RwLock::new(None),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Replace the canned transcript.
    pub async fn set_transcript(&self, transcript: impl Into<String>) {
        *self.transcript.write().await = transcript.into();
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: SpeechError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay every call by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Number of calls made so far.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Requests recorded so far, in call order.
    pub async fn recorded_requests(&self) -> Vec<TranscriptionRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        request: &TranscriptionRequest,
    ) -> Result<String, SpeechError> {
        self.requests.write().await.push(request.clone());

        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }

        if audio.len() as u64 > MAX_AUDIO_BYTES {
            return Err(SpeechError::AudioTooLarge {
                size_bytes: audio.len() as u64,
                limit_bytes: MAX_AUDIO_BYTES,
            });
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.transcript.read().await.clone())
    }
}
