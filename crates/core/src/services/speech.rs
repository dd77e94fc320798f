//! Speech-to-text collaborator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::metrics;

use super::ServiceEndpoint;

/// Hard upper bound on audio payload size accepted by the service (25 MiB).
pub const MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;

/// Parameters for one transcription request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranscriptionRequest {
    /// Expected language hint (e.g., "en-US"); the service auto-detects when
    /// absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Number of alternative transcripts to consider server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_alternatives: Option<u32>,
}

/// Errors from the speech-to-text service.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The service could not be reached or returned a failure.
    #[error("Speech service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The audio payload exceeds the service limit.
    #[error("Audio too large: {size_bytes} bytes exceeds {limit_bytes} byte limit")]
    AudioTooLarge { size_bytes: u64, limit_bytes: u64 },

    /// The recording is longer than the service accepts.
    #[error("Audio duration exceeds service limit")]
    DurationExceeded,
}

/// A service that transcribes recorded speech.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Returns the name of this implementation.
    fn name(&self) -> &str;

    /// Transcribe one audio recording.
    async fn transcribe(
        &self,
        audio: &[u8],
        request: &TranscriptionRequest,
    ) -> Result<String, SpeechError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    transcript: String,
}

/// Networked speech-to-text client.
pub struct HttpSpeechToText {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl HttpSpeechToText {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoint }
    }
}

#[async_trait]
impl SpeechToText for HttpSpeechToText {
    fn name(&self) -> &str {
        "http"
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        request: &TranscriptionRequest,
    ) -> Result<String, SpeechError> {
        // Reject oversized payloads before putting them on the wire.
        if audio.len() as u64 > MAX_AUDIO_BYTES {
            return Err(SpeechError::AudioTooLarge {
                size_bytes: audio.len() as u64,
                limit_bytes: MAX_AUDIO_BYTES,
            });
        }

        let mut url = format!("{}/v1/transcribe", self.endpoint.base_url());
        let mut params = Vec::new();
        if let Some(ref language) = request.language {
            params.push(format!("language={}", language));
        }
        if let Some(max_alternatives) = request.max_alternatives {
            params.push(format!("max_alternatives={}", max_alternatives));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        debug!(bytes = audio.len(), "Requesting transcription");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/octet-stream")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| {
                metrics::COLLABORATOR_REQUESTS
                    .with_label_values(&["speech", "error"])
                    .inc();
                SpeechError::ServiceUnavailable(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::PAYLOAD_TOO_LARGE {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["speech", "error"])
                .inc();
            return Err(SpeechError::DurationExceeded);
        }

        if !status.is_success() {
            metrics::COLLABORATOR_REQUESTS
                .with_label_values(&["speech", "error"])
                .inc();
            return Err(SpeechError::ServiceUnavailable(format!("HTTP {}", status)));
        }

        let body = response
            .json::<TranscriptResponse>()
            .await
            .map_err(|e| SpeechError::ServiceUnavailable(format!("Invalid response: {}", e)))?;

        metrics::COLLABORATOR_REQUESTS
            .with_label_values(&["speech", "success"])
            .inc();

        Ok(body.transcript)
    }
}
